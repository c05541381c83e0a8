use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{stream, Stream};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::CurrentSession,
    models::Comment,
    routes::AppState,
    services::CommentSubscription,
};

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
pub struct CommentsQuery {
    #[serde(default)]
    movie_id: Option<String>,
}

impl CommentsQuery {
    fn movie_id(self) -> Option<String> {
        self.movie_id.filter(|id| !id.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
    #[serde(default)]
    pub movie_id: Option<String>,
}

/// Comments for a movie, or all comments, newest first
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<CommentsQuery>,
) -> AppResult<Json<Vec<Comment>>> {
    let movie_id = params.movie_id();
    let comments = state.comments.list(movie_id.as_deref()).await?;
    Ok(Json(comments))
}

/// Posts a comment as the signed-in user
pub async fn create(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(payload): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let session = current.session().await;
    let comment = state
        .comments
        .create(session.as_ref(), &payload.text, payload.movie_id)
        .await?;

    tracing::info!(
        comment_id = %comment.id,
        movie_id = ?comment.movie_id,
        "Comment posted"
    );

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Live comment feed.
///
/// Each `comments` event carries the full current list. The subscription is
/// released when the client disconnects and the stream is dropped.
pub async fn stream(
    State(state): State<AppState>,
    Query(params): Query<CommentsQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.comments.subscribe(params.movie_id());
    tracing::debug!(movie_id = ?subscription.movie_id(), "Comment stream opened");

    Sse::new(snapshot_events(subscription)).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("ping"),
    )
}

fn snapshot_events(
    subscription: CommentSubscription,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(subscription, |mut subscription| async move {
        let snapshot = subscription.next().await?;
        let event = match Event::default().event("comments").json_data(&snapshot) {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode comment snapshot");
                Event::default().event("error").data("encoding failed")
            }
        };
        Some((Ok(event), subscription))
    })
}
