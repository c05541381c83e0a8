use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{
    stream::{self, BoxStream},
    StreamExt,
};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::{
    error::AppResult,
    middleware::CurrentSession,
    models::{AuthState, User},
    routes::AppState,
    services::{AuthFailure, AuthSession},
};

const DEFAULT_IDP: &str = "google.com";

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct FederatedRequest {
    #[serde(default = "default_idp")]
    pub provider_id: String,
    /// Provider ID token obtained by the client's popup flow
    #[serde(alias = "id_token")]
    pub credential: String,
}

fn default_idp() -> String {
    DEFAULT_IDP.to_string()
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    #[serde(flatten)]
    pub user: User,
    /// Name shown in the header
    pub label: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let label = user.display_label();
        Self { user, label }
    }
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    /// Bearer token for subsequent requests
    pub session_id: String,
    pub user: UserResponse,
}

pub async fn sign_in(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(payload): Json<CredentialsRequest>,
) -> AppResult<Json<SignInResponse>> {
    establish(&state, current, |session| async move {
        session
            .sign_in_with_password(&payload.email, &payload.password)
            .await
    })
    .await
}

pub async fn sign_up(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(payload): Json<CredentialsRequest>,
) -> AppResult<Json<SignInResponse>> {
    establish(&state, current, |session| async move {
        session.sign_up(&payload.email, &payload.password).await
    })
    .await
}

pub async fn sign_in_federated(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(payload): Json<FederatedRequest>,
) -> AppResult<Json<SignInResponse>> {
    establish(&state, current, |session| async move {
        session
            .sign_in_federated(&payload.provider_id, &payload.credential)
            .await
    })
    .await
}

/// Runs a sign-in against the caller's session, or a fresh one.
///
/// A fresh session is only registered once the sign-in succeeds.
async fn establish<F, Fut>(
    state: &AppState,
    current: CurrentSession,
    operation: F,
) -> AppResult<Json<SignInResponse>>
where
    F: FnOnce(Arc<AuthSession>) -> Fut,
    Fut: Future<Output = Result<User, AuthFailure>>,
{
    let (existing_id, auth_session) = match current.0 {
        Some((id, auth_session)) => (Some(id), auth_session),
        None => (None, Arc::new(AuthSession::new(state.auth.clone()))),
    };

    let user = operation(auth_session.clone()).await?;

    let session_id = match existing_id {
        Some(id) => id,
        None => state.sessions.insert(auth_session).await,
    };

    tracing::info!(uid = %user.uid, session = %session_id, "Session established");

    Ok(Json(SignInResponse {
        session_id: session_id.to_string(),
        user: user.into(),
    }))
}

pub async fn sign_out(State(state): State<AppState>, current: CurrentSession) -> StatusCode {
    if let Some(id) = current.id() {
        state.sessions.sign_out(&id).await;
    }
    StatusCode::NO_CONTENT
}

/// Current user state for the bearer session; signed out without one
pub async fn me(current: CurrentSession) -> Json<AuthState> {
    let state = current
        .auth_session()
        .map(|auth_session| auth_session.state())
        .unwrap_or(AuthState::SignedOut);
    Json(state)
}

/// User state transitions as server-sent events.
///
/// Emits the current state first, then every change until the session is gone.
pub async fn stream(current: CurrentSession) -> Sse<BoxStream<'static, Result<Event, Infallible>>> {
    let events = match current.auth_session() {
        Some(auth_session) => state_events(auth_session.subscribe()),
        None => stream::once(async { Ok(state_event(&AuthState::SignedOut)) }).boxed(),
    };

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn state_events(
    receiver: watch::Receiver<AuthState>,
) -> BoxStream<'static, Result<Event, Infallible>> {
    stream::unfold((receiver, true), |(mut receiver, first)| async move {
        if !first && receiver.changed().await.is_err() {
            return None;
        }
        let event = state_event(&receiver.borrow_and_update());
        Some((Ok(event), (receiver, false)))
    })
    .boxed()
}

fn state_event(state: &AuthState) -> Event {
    Event::default()
        .event("auth")
        .json_data(state)
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to encode auth state");
            Event::default().event("error").data("encoding failed")
        })
}
