use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    models::{AuthState, Session, User},
    services::auth::{AuthFailure, AuthService},
};

/// Idle lifetime of a registered session unless configured otherwise
const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Current-user state for one client.
///
/// The state starts as [`AuthState::Loading`] and is published through a
/// `watch` channel so any number of observers see each transition.
pub struct AuthSession {
    auth: AuthService,
    state: watch::Sender<AuthState>,
    session: RwLock<Option<Session>>,
}

impl AuthSession {
    pub fn new(auth: AuthService) -> Self {
        let (state, _) = watch::channel(AuthState::Loading);
        Self {
            auth,
            state,
            session: RwLock::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Credentials with an ID token that is still accepted.
    ///
    /// An expiring token is renewed first. If renewal fails the user is signed
    /// out and `None` is returned.
    pub async fn fresh_session(&self) -> Option<Session> {
        let mut current = self.session.write().await;
        let session = current.as_ref()?;
        if !session.needs_refresh(Utc::now()) {
            return Some(session.clone());
        }

        let uid = session.user.uid.clone();
        match self.auth.refresh(session).await {
            Ok(renewed) => {
                tracing::debug!(uid = %uid, "Session token renewed");
                *current = Some(renewed.clone());
                Some(renewed)
            }
            Err(failure) => {
                tracing::warn!(uid = %uid, code = ?failure.code, "Token refresh failed, signing out");
                *current = None;
                self.state.send_replace(AuthState::SignedOut);
                None
            }
        }
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AuthFailure> {
        let result = self.auth.sign_in_with_password(email, password).await;
        self.settle(result).await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthFailure> {
        let result = self.auth.sign_up(email, password).await;
        self.settle(result).await
    }

    pub async fn sign_in_federated(
        &self,
        provider_id: &str,
        credential: &str,
    ) -> Result<User, AuthFailure> {
        let result = self.auth.sign_in_federated(provider_id, credential).await;
        self.settle(result).await
    }

    pub async fn sign_out(&self) {
        let previous = self.session.write().await.take();
        self.state.send_replace(AuthState::SignedOut);

        if let Some(previous) = previous {
            tracing::info!(uid = %previous.user.uid, "Signed out");
        }
    }

    /// Applies a sign-in outcome. A failure keeps an existing session.
    async fn settle(&self, result: Result<Session, AuthFailure>) -> Result<User, AuthFailure> {
        let mut current = self.session.write().await;
        match result {
            Ok(session) => {
                let user = session.user.clone();
                *current = Some(session);
                self.state.send_replace(AuthState::SignedIn(user.clone()));
                Ok(user)
            }
            Err(failure) => {
                if current.is_none() {
                    self.state.send_replace(AuthState::SignedOut);
                }
                tracing::info!(
                    code = ?failure.code,
                    provider = self.auth.provider_name(),
                    "Sign-in failed"
                );
                Err(failure)
            }
        }
    }
}

/// Opaque identifier handed to clients as their bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct RegistryEntry {
    session: Arc<AuthSession>,
    last_seen: Instant,
}

impl RegistryEntry {
    fn is_live(&self, now: Instant, idle_ttl: Duration) -> bool {
        now.duration_since(self.last_seen) < idle_ttl
            && self.session.state() != AuthState::SignedOut
    }
}

/// Signed-in sessions held by the server.
///
/// Entries are dropped once signed out or unused for the idle TTL. Stale
/// entries are swept on every insert and skipped on lookup.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, RegistryEntry>>>,
    idle_ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_ttl(DEFAULT_IDLE_TTL)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    pub async fn insert(&self, session: Arc<AuthSession>) -> SessionId {
        let id = SessionId::new();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, entry| entry.is_live(now, self.idle_ttl));
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, active = sessions.len(), "Evicted stale sessions");
        }

        sessions.insert(
            id,
            RegistryEntry {
                session,
                last_seen: now,
            },
        );
        id
    }

    /// Live session for the id. A lookup counts as activity.
    pub async fn get(&self, id: &SessionId) -> Option<Arc<AuthSession>> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        let entry = sessions.get_mut(id)?;
        if entry.is_live(now, self.idle_ttl) {
            entry.last_seen = now;
            return Some(entry.session.clone());
        }

        sessions.remove(id);
        None
    }

    /// Signs the session out and forgets it
    pub async fn sign_out(&self, id: &SessionId) -> bool {
        let removed = self.sessions.write().await.remove(id);
        match removed {
            Some(entry) => {
                entry.session.sign_out().await;
                true
            }
            None => false,
        }
    }
}
