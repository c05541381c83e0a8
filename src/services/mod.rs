pub mod auth;
pub mod catalog;
pub mod comments;
pub mod enrichment;
pub mod identity;
pub mod providers;
pub mod session;
pub mod store;
pub mod task_group;

pub use auth::{AuthErrorCode, AuthFailure, AuthService};
pub use catalog::CatalogService;
pub use comments::{CommentService, CommentSubscription};
pub use enrichment::RatingEnricher;
pub use session::{AuthSession, SessionId, SessionRegistry};
