use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{comment::sort_newest_first, Comment, NewComment},
    services::store::CommentStore,
};

/// In-process comment store.
///
/// Used when no hosted project is configured. Comments live until the process
/// exits.
pub struct MemoryCommentStore {
    comments: RwLock<Vec<Comment>>,
    changes_tx: broadcast::Sender<()>,
}

impl Default for MemoryCommentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCommentStore {
    pub fn new() -> Self {
        let (changes_tx, _) = broadcast::channel(64);
        Self {
            comments: RwLock::new(Vec::new()),
            changes_tx,
        }
    }
}

#[async_trait::async_trait]
impl CommentStore for MemoryCommentStore {
    async fn insert(&self, comment: NewComment, _id_token: &str) -> AppResult<Comment> {
        let stored = Comment {
            id: Uuid::new_v4().to_string(),
            text: comment.text,
            user: comment.user,
            user_id: comment.user_id,
            movie_id: comment.movie_id,
            created_at: Some(Utc::now()),
        };

        // Newest at the front so equal timestamps still sort newest first
        self.comments.write().await.insert(0, stored.clone());
        let _ = self.changes_tx.send(());

        Ok(stored)
    }

    async fn query(&self, movie_id: Option<&str>) -> AppResult<Vec<Comment>> {
        let comments = self.comments.read().await;
        let mut matching: Vec<Comment> = comments
            .iter()
            .filter(|c| match movie_id {
                Some(id) => c.movie_id.as_deref() == Some(id),
                None => true,
            })
            .cloned()
            .collect();

        sort_newest_first(&mut matching);
        Ok(matching)
    }

    fn changes(&self) -> broadcast::Receiver<()> {
        self.changes_tx.subscribe()
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
