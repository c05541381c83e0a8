use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{EnrichedMovie, Movie, MovieId},
    services::{
        providers::{CatalogProvider, RatingProvider},
        task_group,
    },
};

/// Attaches external ratings to catalog movies.
///
/// Each movie goes through a two-hop lookup: catalog detail for the IMDb id,
/// then the ratings provider. Lookups are best effort: any failure leaves the
/// rating unset for that movie only.
#[derive(Clone)]
pub struct RatingEnricher {
    catalog: Arc<dyn CatalogProvider>,
    ratings: Arc<dyn RatingProvider>,
}

impl RatingEnricher {
    pub fn new(catalog: Arc<dyn CatalogProvider>, ratings: Arc<dyn RatingProvider>) -> Self {
        Self { catalog, ratings }
    }

    /// Enriches every movie concurrently.
    ///
    /// The output has the same length and order as the input.
    pub async fn enrich(&self, movies: Vec<Movie>) -> Vec<EnrichedMovie> {
        if movies.is_empty() {
            return Vec::new();
        }

        let lookups: Vec<_> = movies
            .iter()
            .map(|movie| {
                let enricher = self.clone();
                let movie_id = movie.id;
                async move { enricher.lookup_rating(movie_id).await }
            })
            .collect();

        let ratings = task_group::join_ordered(lookups).await;

        let enriched: Vec<EnrichedMovie> = movies
            .into_iter()
            .zip(ratings)
            .map(|(movie, rating)| EnrichedMovie::new(movie, rating.flatten()))
            .collect();

        tracing::debug!(
            movies = enriched.len(),
            rated = enriched.iter().filter(|m| m.imdb_rating.is_some()).count(),
            provider = self.ratings.name(),
            "Enrichment completed"
        );

        enriched
    }

    /// Best-effort rating for one movie. Never fails.
    pub async fn lookup_rating(&self, movie_id: MovieId) -> Option<String> {
        match self.try_lookup_rating(movie_id).await {
            Ok(rating) => rating,
            Err(e) => {
                tracing::debug!(movie_id, error = %e, "Rating lookup failed");
                None
            }
        }
    }

    async fn try_lookup_rating(&self, movie_id: MovieId) -> AppResult<Option<String>> {
        let details = self.catalog.movie_details(movie_id).await?;
        match details.cross_reference_id() {
            Some(imdb_id) => self.ratings.rating(imdb_id).await,
            None => Ok(None),
        }
    }

    /// Rating for an already known IMDb id, swallowing failures
    pub async fn rating_for(&self, imdb_id: Option<&str>) -> Option<String> {
        let imdb_id = imdb_id?;
        match self.ratings.rating(imdb_id).await {
            Ok(rating) => rating.filter(|r| !r.is_empty()),
            Err(e) => {
                tracing::debug!(imdb_id = %imdb_id, error = %e, "Rating lookup failed");
                None
            }
        }
    }
}
