/// TMDB (The Movie Database) catalog provider
///
/// Wraps the TMDB v3 REST API. The API key travels in the `api_key` query
/// parameter on every request.
///
/// API Flow:
/// 1. Listings: /trending/movie/week, /discover/movie, /movie/upcoming,
///    /movie/top_rated, /search/movie
/// 2. Detail: /movie/{id} → includes `imdb_id` for the ratings lookup
/// 3. Extras: /movie/{id}/credits, /movie/{id}/videos
use crate::{
    error::AppResult,
    models::{CastMember, Category, Movie, MovieDetails, MovieId, Video},
    services::providers::{check_status, CatalogProvider},
};
use reqwest::Client as HttpClient;
use serde::{de::DeserializeOwned, Deserialize};

const PROVIDER: &str = "tmdb";

#[derive(Debug, Deserialize)]
struct PagedResponse<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct CreditsResponse {
    #[serde(default)]
    cast: Vec<CastMember>,
}

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    result_limit: usize,
}

impl TmdbProvider {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String, result_limit: usize) -> Self {
        Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            result_limit,
        }
    }

    /// Path and extra query parameters for a listing category
    fn listing_request(category: &Category) -> (&'static str, Vec<(&'static str, String)>) {
        match category {
            Category::Trending => ("/trending/movie/week", Vec::new()),
            Category::Region { country, language } => {
                let mut params = vec![("with_origin_country", country.clone())];
                if let Some(language) = language {
                    params.push(("with_original_language", language.clone()));
                }
                params.push(("sort_by", "popularity.desc".to_string()));
                params.push(("page", "1".to_string()));
                ("/discover/movie", params)
            }
            Category::Upcoming => ("/movie/upcoming", Vec::new()),
            Category::TopRated => ("/movie/top_rated", Vec::new()),
            Category::Search { query } => (
                "/search/movie",
                vec![("query", query.clone()), ("page", "1".to_string())],
            ),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);
        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let response = check_status("TMDB", response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn list_movies(&self, category: &Category) -> AppResult<Vec<Movie>> {
        let (path, params) = Self::listing_request(category);
        let page: PagedResponse<Movie> = self.get_json(path, &params).await?;

        let movies: Vec<Movie> = page.results.into_iter().take(self.result_limit).collect();

        tracing::info!(
            category = %category,
            results = movies.len(),
            provider = PROVIDER,
            "Movie listing fetched"
        );

        Ok(movies)
    }

    async fn movie_details(&self, id: MovieId) -> AppResult<MovieDetails> {
        let details: MovieDetails = self.get_json(&format!("/movie/{}", id), &[]).await?;

        tracing::debug!(
            movie_id = id,
            imdb_id = ?details.imdb_id,
            provider = PROVIDER,
            "Movie details fetched"
        );

        Ok(details)
    }

    async fn movie_credits(&self, id: MovieId) -> AppResult<Vec<CastMember>> {
        let credits: CreditsResponse = self
            .get_json(&format!("/movie/{}/credits", id), &[])
            .await?;
        Ok(credits.cast)
    }

    async fn movie_videos(&self, id: MovieId) -> AppResult<Vec<Video>> {
        let videos: PagedResponse<Video> = self
            .get_json(&format!("/movie/{}/videos", id), &[])
            .await?;
        Ok(videos.results)
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
