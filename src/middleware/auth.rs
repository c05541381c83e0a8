use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::{
    models::Session,
    routes::AppState,
    services::{AuthSession, SessionId},
};

/// Session id from an `Authorization: Bearer <id>` header
pub fn bearer_session_id(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .and_then(|(_, token)| SessionId::parse(token))
}

/// The caller's signed-in session, if the bearer token names a live one.
///
/// Unknown or malformed tokens resolve to `None` rather than rejecting, so
/// handlers decide whether a session is required.
pub struct CurrentSession(pub Option<(SessionId, Arc<AuthSession>)>);

impl CurrentSession {
    pub fn id(&self) -> Option<SessionId> {
        self.0.as_ref().map(|(id, _)| *id)
    }

    pub fn auth_session(&self) -> Option<&Arc<AuthSession>> {
        self.0.as_ref().map(|(_, session)| session)
    }

    /// Credentials of the signed-in user with a usable ID token, if any
    pub async fn session(&self) -> Option<Session> {
        match self.auth_session() {
            Some(auth_session) => auth_session.fresh_session().await,
            None => None,
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(id) = bearer_session_id(&parts.headers) else {
            return Ok(Self(None));
        };

        match state.sessions.get(&id).await {
            Some(auth_session) => Ok(Self(Some((id, auth_session)))),
            None => {
                tracing::debug!(session = %id, "Unknown session token");
                Ok(Self(None))
            }
        }
    }
}
