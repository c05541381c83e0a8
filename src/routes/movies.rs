use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{CastMember, CategoryListing, EnrichedMovie, MovieDetail, MovieId},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct MoviesQuery {
    #[serde(default)]
    q: Option<String>,
}

/// Movie card as rendered in a listing
#[derive(Debug, Serialize)]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
    pub overview: Option<String>,
    pub release_year: Option<i32>,
    pub poster_url: Option<String>,
    pub imdb_rating: Option<String>,
    /// Rating on a 0-5 scale; absent when the rating is missing or not numeric
    pub star_rating: Option<f64>,
}

impl MovieSummary {
    fn from_enriched(movie: &EnrichedMovie, image_base: &str) -> Self {
        Self {
            id: movie.movie.id,
            title: movie.movie.title.clone(),
            overview: movie.movie.overview.clone(),
            release_year: movie.movie.release_year(),
            poster_url: movie.movie.poster_url(image_base),
            imdb_rating: movie.imdb_rating.clone(),
            star_rating: movie.star_rating(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SectionResponse {
    pub key: String,
    pub title: String,
    pub movies: Vec<MovieSummary>,
}

impl SectionResponse {
    fn new(key: &str, title: String, movies: &[EnrichedMovie], image_base: &str) -> Self {
        Self {
            key: key.to_string(),
            title,
            movies: movies
                .iter()
                .map(|movie| MovieSummary::from_enriched(movie, image_base))
                .collect(),
        }
    }

    fn from_listing(listing: &CategoryListing, image_base: &str) -> Self {
        Self::new(&listing.key, listing.title.clone(), &listing.movies, image_base)
    }
}

#[derive(Debug, Serialize)]
pub struct MoviesResponse {
    /// Active search query; `None` for the landing page
    pub query: Option<String>,
    pub sections: Vec<SectionResponse>,
}

/// Landing page, or search results when `q` is non-blank
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<MoviesQuery>,
) -> Json<MoviesResponse> {
    let query = params
        .q
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty());

    let sections = match &query {
        Some(query) => {
            let movies = state.catalog.search(query).await;
            vec![search_section(query, &movies, &state.image_base)]
        }
        None => state
            .catalog
            .home(&state.home_sections)
            .await
            .iter()
            .map(|listing| SectionResponse::from_listing(listing, &state.image_base))
            .collect(),
    };

    Json(MoviesResponse { query, sections })
}

/// Search results as a flat list
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<MoviesQuery>,
) -> AppResult<Json<Vec<MovieSummary>>> {
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Query parameter 'q' is required".to_string(),
        ));
    }

    let movies = state.catalog.search(&query).await;
    Ok(Json(
        movies
            .iter()
            .map(|movie| MovieSummary::from_enriched(movie, &state.image_base))
            .collect(),
    ))
}

fn search_section(query: &str, movies: &[EnrichedMovie], image_base: &str) -> SectionResponse {
    SectionResponse::new(
        "search",
        format!("Search Results for \"{}\"", query),
        movies,
        image_base,
    )
}

#[derive(Debug, Serialize)]
pub struct CastResponse {
    pub name: String,
    pub character: Option<String>,
    pub profile_url: Option<String>,
}

impl CastResponse {
    fn from_member(member: &CastMember, image_base: &str) -> Self {
        Self {
            name: member.name.clone(),
            character: member.character.clone(),
            profile_url: member.profile_url(image_base),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieDetailResponse {
    pub id: MovieId,
    pub title: String,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub release_year: Option<i32>,
    pub poster_url: Option<String>,
    pub vote_average: f64,
    pub revenue: Option<u64>,
    pub imdb_id: Option<String>,
    pub imdb_rating: Option<String>,
    pub star_rating: Option<f64>,
    pub cast: Vec<CastResponse>,
    pub trailer_url: Option<String>,
}

impl MovieDetailResponse {
    fn from_detail(detail: MovieDetail, image_base: &str) -> Self {
        let movie = &detail.details.movie;
        let rated = EnrichedMovie::new(movie.clone(), detail.imdb_rating.clone());

        Self {
            id: movie.id,
            title: movie.title.clone(),
            overview: movie.overview.clone(),
            release_date: movie.release_date.clone(),
            release_year: movie.release_year(),
            poster_url: movie.poster_url(image_base),
            vote_average: movie.vote_average,
            revenue: detail.details.revenue,
            imdb_id: detail.details.cross_reference_id().map(str::to_string),
            imdb_rating: rated.imdb_rating.clone(),
            star_rating: rated.star_rating(),
            cast: detail
                .cast
                .iter()
                .map(|member| CastResponse::from_member(member, image_base))
                .collect(),
            trailer_url: detail.trailer_url,
        }
    }
}

/// Detail page for one movie
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<MovieId>,
) -> AppResult<Json<MovieDetailResponse>> {
    let detail = state.catalog.movie_detail(id).await?;
    Ok(Json(MovieDetailResponse::from_detail(detail, &state.image_base)))
}
