/// Movie data provider abstraction
///
/// Two independent remote services feed the listings: a catalog (listings, detail,
/// credits, videos) and a ratings provider keyed by IMDb id. Both sit behind
/// traits so adapters receive explicit client handles and tests can swap in fakes.
use crate::{
    error::AppResult,
    models::{CastMember, Category, Movie, MovieDetails, MovieId, Video},
};

pub mod omdb;
pub mod tmdb;

pub use omdb::OmdbProvider;
pub use tmdb::TmdbProvider;

/// Trait for movie catalog providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// List movies for a category, in the provider's ranking order
    async fn list_movies(&self, category: &Category) -> AppResult<Vec<Movie>>;

    /// Fetch extended detail, including the IMDb cross-reference id
    async fn movie_details(&self, id: MovieId) -> AppResult<MovieDetails>;

    /// Fetch the billed cast
    async fn movie_credits(&self, id: MovieId) -> AppResult<Vec<CastMember>>;

    /// Fetch associated videos
    async fn movie_videos(&self, id: MovieId) -> AppResult<Vec<Video>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Trait for rating providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RatingProvider: Send + Sync {
    /// Look up the rating for an IMDb id.
    ///
    /// Returns the rating string as received, or `None` when the provider has none.
    async fn rating(&self, imdb_id: &str) -> AppResult<Option<String>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Turns a non-success response into an `ExternalApi` error
pub(crate) async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> AppResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(crate::error::AppError::ExternalApi(format!(
        "{} API returned status {}: {}",
        provider, status, body
    )))
}
