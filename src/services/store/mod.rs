/// Comment document store abstraction
///
/// The hosted document store owns comment persistence and timestamps. Adapters
/// implement a single collection with an optional movie-id equality filter and
/// newest-first ordering.
use tokio::sync::broadcast;

use crate::{
    error::AppResult,
    models::{Comment, NewComment},
};

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreCommentStore;
pub use memory::MemoryCommentStore;

/// Collection holding comment documents
pub const COMMENTS_COLLECTION: &str = "comments";

#[async_trait::async_trait]
pub trait CommentStore: Send + Sync {
    /// Writes a comment with a store-assigned timestamp.
    ///
    /// `id_token` is the author's identity-provider token, forwarded to stores
    /// that enforce access rules.
    async fn insert(&self, comment: NewComment, id_token: &str) -> AppResult<Comment>;

    /// Comments matching the filter, newest first
    async fn query(&self, movie_id: Option<&str>) -> AppResult<Vec<Comment>>;

    /// Notifies after every write made through this store handle
    fn changes(&self) -> broadcast::Receiver<()>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}
