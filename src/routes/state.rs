use std::sync::Arc;
use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::{
    config::Config,
    models::{home_sections, HomeSection},
    services::{
        identity::{firebase::FirebaseIdentityProvider, IdentityProvider},
        providers::{omdb::OmdbProvider, tmdb::TmdbProvider, CatalogProvider, RatingProvider},
        store::{firestore::FirestoreCommentStore, memory::MemoryCommentStore, CommentStore},
        AuthService, CatalogService, CommentService, RatingEnricher, SessionRegistry,
    },
};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub comments: CommentService,
    pub auth: AuthService,
    pub sessions: SessionRegistry,
    /// Image CDN base used to build poster and profile URLs
    pub image_base: Arc<str>,
    pub home_sections: Arc<[HomeSection]>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        ratings: Arc<dyn RatingProvider>,
        store: Arc<dyn CommentStore>,
        identity: Arc<dyn IdentityProvider>,
        image_base: &str,
        poll_interval: Duration,
    ) -> Self {
        let enricher = RatingEnricher::new(catalog.clone(), ratings);
        Self {
            catalog: CatalogService::new(catalog, enricher),
            comments: CommentService::new(store, poll_interval),
            auth: AuthService::new(identity),
            sessions: SessionRegistry::new(),
            image_base: Arc::from(image_base.trim_end_matches('/')),
            home_sections: home_sections().into(),
        }
    }

    /// Wires the live providers from configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http_client = HttpClient::builder().timeout(HTTP_TIMEOUT).build()?;

        let catalog = Arc::new(TmdbProvider::new(
            http_client.clone(),
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            config.result_limit,
        ));
        let ratings = Arc::new(OmdbProvider::new(
            http_client.clone(),
            config.omdb_api_key.clone(),
            config.omdb_api_url.clone(),
        ));
        let identity = Arc::new(FirebaseIdentityProvider::new(
            http_client.clone(),
            config.firebase_api_key.clone(),
            config.identity_api_url.clone(),
            config.token_api_url.clone(),
        ));

        let store: Arc<dyn CommentStore> = match &config.firebase_project_id {
            Some(project_id) if !project_id.trim().is_empty() => {
                Arc::new(FirestoreCommentStore::new(
                    http_client,
                    config.firebase_api_key.clone(),
                    config.firestore_api_url.clone(),
                    project_id.trim().to_string(),
                ))
            }
            _ => {
                tracing::warn!("FIREBASE_PROJECT_ID not set, comments are kept in memory");
                Arc::new(MemoryCommentStore::new())
            }
        };

        tracing::info!(
            catalog = catalog.name(),
            ratings = ratings.name(),
            identity = identity.name(),
            comments = store.name(),
            "Providers configured"
        );

        let mut state = Self::new(
            catalog,
            ratings,
            store,
            identity,
            &config.tmdb_image_url,
            config.comment_poll_interval(),
        );
        state.sessions = SessionRegistry::with_idle_ttl(config.session_idle_ttl());

        Ok(state)
    }
}
