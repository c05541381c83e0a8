use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{
        trailer_embed_url, Category, CategoryListing, EnrichedMovie, HomeSection, MovieDetail,
        MovieId,
    },
    services::{enrichment::RatingEnricher, providers::CatalogProvider, task_group},
};

/// Number of cast entries shown on a detail page
const TOP_CAST: usize = 8;

/// Loads enriched listings and detail pages from the catalog
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogProvider>,
    enricher: RatingEnricher,
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn CatalogProvider>, enricher: RatingEnricher) -> Self {
        Self { catalog, enricher }
    }

    /// Fetches and enriches one category.
    ///
    /// A catalog failure yields an empty list; it is logged, never returned.
    pub async fn fetch_category(&self, category: &Category) -> Vec<EnrichedMovie> {
        match self.catalog.list_movies(category).await {
            Ok(movies) => self.enricher.enrich(movies).await,
            Err(e) => {
                tracing::warn!(
                    category = %category,
                    provider = self.catalog.name(),
                    error = %e,
                    "Category fetch failed"
                );
                Vec::new()
            }
        }
    }

    /// Loads every section concurrently. Sections fail independently.
    pub async fn home(&self, sections: &[HomeSection]) -> Vec<CategoryListing> {
        let loads: Vec<_> = sections
            .iter()
            .map(|section| {
                let service = self.clone();
                let category = section.category.clone();
                async move { service.fetch_category(&category).await }
            })
            .collect();

        let results = task_group::join_ordered(loads).await;

        let listings: Vec<CategoryListing> = sections
            .iter()
            .zip(results)
            .map(|(section, movies)| CategoryListing::new(section, movies.unwrap_or_default()))
            .collect();

        tracing::info!(
            sections = listings.len(),
            empty = listings.iter().filter(|l| l.movies.is_empty()).count(),
            "Home listings loaded"
        );

        listings
    }

    /// Enriched search results. A blank query returns nothing without a request.
    pub async fn search(&self, query: &str) -> Vec<EnrichedMovie> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        self.fetch_category(&Category::Search {
            query: query.to_string(),
        })
        .await
    }

    /// Assembles a detail page.
    ///
    /// Only the detail lookup itself is required. Rating, cast and trailer are
    /// fetched concurrently and each degrades to empty on failure.
    pub async fn movie_detail(&self, id: MovieId) -> AppResult<MovieDetail> {
        let details = self.catalog.movie_details(id).await.map_err(|e| {
            tracing::warn!(movie_id = id, error = %e, "Movie detail fetch failed");
            AppError::NotFound("Movie not found".to_string())
        })?;

        let (imdb_rating, credits, videos) = tokio::join!(
            self.enricher.rating_for(details.cross_reference_id()),
            self.catalog.movie_credits(id),
            self.catalog.movie_videos(id),
        );

        let cast = match credits {
            Ok(mut cast) => {
                cast.truncate(TOP_CAST);
                cast
            }
            Err(e) => {
                tracing::warn!(movie_id = id, error = %e, "Credits fetch failed");
                Vec::new()
            }
        };

        let trailer_url = match videos {
            Ok(videos) => trailer_embed_url(&videos),
            Err(e) => {
                tracing::warn!(movie_id = id, error = %e, "Videos fetch failed");
                None
            }
        };

        Ok(MovieDetail {
            details,
            imdb_rating,
            cast,
            trailer_url,
        })
    }
}
