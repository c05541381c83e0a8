use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::{
    error::{AppError, AppResult},
    models::{Comment, NewComment, Session},
    services::store::CommentStore,
};

/// Buffered snapshots per subscription before the poller waits on the consumer
const SNAPSHOT_BUFFER: usize = 4;

/// Comment feed on top of a hosted document store
#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn CommentStore>,
    poll_interval: Duration,
}

impl CommentService {
    pub fn new(store: Arc<dyn CommentStore>, poll_interval: Duration) -> Self {
        Self {
            store,
            poll_interval,
        }
    }

    /// Posts a comment as the session's user.
    ///
    /// Requires a session and non-blank text; both are checked before any
    /// store call. Store failures collapse into [`AppError::CommentWrite`].
    pub async fn create(
        &self,
        session: Option<&Session>,
        text: &str,
        movie_id: Option<String>,
    ) -> AppResult<Comment> {
        let session = session.ok_or_else(|| {
            AppError::Unauthorized("Please sign in to post comments".to_string())
        })?;

        if text.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Comment text cannot be empty".to_string(),
            ));
        }

        let comment = NewComment {
            text: text.to_string(),
            user: session.user.author_name(),
            user_id: session.user.uid.clone(),
            movie_id: movie_id.filter(|id| !id.is_empty()),
        };

        self.store
            .insert(comment, &session.id_token)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    user_id = %session.user.uid,
                    store = self.store.name(),
                    "Comment write failed"
                );
                AppError::CommentWrite
            })
    }

    /// Current comments for the filter, newest first
    pub async fn list(&self, movie_id: Option<&str>) -> AppResult<Vec<Comment>> {
        self.store.query(movie_id).await
    }

    /// Opens a live query.
    ///
    /// The first snapshot is delivered as soon as the store answers. Later
    /// snapshots follow writes through this store and a periodic re-query, and
    /// are only sent when the result changed.
    pub fn subscribe(&self, movie_id: Option<String>) -> CommentSubscription {
        let (snapshots_tx, snapshots_rx) = mpsc::channel(SNAPSHOT_BUFFER);
        let (close_tx, close_rx) = oneshot::channel();

        let task = tokio::spawn(run_live_query(
            self.store.clone(),
            movie_id.clone(),
            self.poll_interval,
            snapshots_tx,
            close_rx,
        ));

        tracing::debug!(movie_id = ?movie_id, "Comment subscription opened");

        CommentSubscription {
            movie_id,
            snapshots: snapshots_rx,
            close_tx: Some(close_tx),
            task: Some(task),
        }
    }
}

async fn run_live_query(
    store: Arc<dyn CommentStore>,
    movie_id: Option<String>,
    poll_interval: Duration,
    snapshots_tx: mpsc::Sender<Vec<Comment>>,
    mut close_rx: oneshot::Receiver<()>,
) {
    let mut changes = Some(store.changes());
    let mut ticker = interval_at(Instant::now() + poll_interval, poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last: Option<Vec<Comment>> = None;

    loop {
        match store.query(movie_id.as_deref()).await {
            Ok(comments) => {
                if last.as_ref() != Some(&comments) {
                    if snapshots_tx.send(comments.clone()).await.is_err() {
                        break;
                    }
                    last = Some(comments);
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    movie_id = ?movie_id,
                    store = store.name(),
                    "Live comment query failed"
                );
            }
        }

        tokio::select! {
            _ = &mut close_rx => break,
            _ = next_change(&mut changes) => {}
            _ = ticker.tick() => {}
        }
    }

    tracing::debug!(movie_id = ?movie_id, "Comment subscription released");
}

/// Waits for the next write notification. A closed channel parks forever and
/// leaves the poll interval as the only trigger.
async fn next_change(changes: &mut Option<broadcast::Receiver<()>>) {
    let received = match changes.as_mut() {
        Some(rx) => rx.recv().await,
        None => return std::future::pending().await,
    };

    if let Err(broadcast::error::RecvError::Closed) = received {
        *changes = None;
        std::future::pending::<()>().await;
    }
}

/// Handle to a live comment query.
///
/// Call [`close`](Self::close) when done; dropping the handle closes it too.
/// Release happens exactly once either way.
pub struct CommentSubscription {
    movie_id: Option<String>,
    snapshots: mpsc::Receiver<Vec<Comment>>,
    close_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl CommentSubscription {
    /// Next snapshot, or `None` once the subscription has ended
    pub async fn next(&mut self) -> Option<Vec<Comment>> {
        if self.close_tx.is_none() {
            return None;
        }
        self.snapshots.recv().await
    }

    pub fn movie_id(&self) -> Option<&str> {
        self.movie_id.as_deref()
    }

    /// Releases the live query and waits for the poller to stop
    pub async fn close(mut self) {
        self.release();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Comment subscription task failed");
            }
        }
    }

    fn release(&mut self) {
        if let Some(close_tx) = self.close_tx.take() {
            let _ = close_tx.send(());
            self.snapshots.close();
        }
    }
}

impl Drop for CommentSubscription {
    fn drop(&mut self) {
        self.release();
    }
}
