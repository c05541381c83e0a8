/// OMDb ratings provider
///
/// Single lookup-by-IMDb-id endpoint. The rating is returned as the string OMDb
/// sends (e.g. "8.8" or "N/A"); no parsing happens here.
use crate::{
    error::AppResult,
    services::providers::{check_status, RatingProvider},
};
use reqwest::Client as HttpClient;
use serde::Deserialize;

const PROVIDER: &str = "omdb";

#[derive(Debug, Deserialize)]
struct OmdbTitle {
    #[serde(rename = "imdbRating", default)]
    imdb_rating: Option<String>,
}

#[derive(Clone)]
pub struct OmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl OmdbProvider {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl RatingProvider for OmdbProvider {
    async fn rating(&self, imdb_id: &str) -> AppResult<Option<String>> {
        let url = format!("{}/", self.api_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[("i", imdb_id), ("apikey", self.api_key.as_str())])
            .send()
            .await?;

        let response = check_status("OMDb", response).await?;
        let title: OmdbTitle = response.json().await?;
        let rating = title.imdb_rating.filter(|rating| !rating.is_empty());

        tracing::debug!(
            imdb_id = %imdb_id,
            rating = ?rating,
            provider = PROVIDER,
            "Rating fetched"
        );

        Ok(rating)
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
