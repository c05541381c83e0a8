/// Hosted identity provider abstraction
///
/// Credential checks and account creation are delegated entirely to the
/// provider. This crate only reads back the resulting session.
use crate::models::{Session, TokenGrant};

pub mod firebase;

pub use firebase::FirebaseIdentityProvider;

/// Failure reported by an identity provider
#[derive(thiserror::Error, Debug)]
pub enum IdentityError {
    /// The provider refused the request with an error code (e.g. `EMAIL_EXISTS`)
    #[error("identity provider rejected the request: {0}")]
    Rejected(String),

    #[error("identity provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected identity provider response: {0}")]
    Response(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, IdentityError>;

    /// Exchanges a federated credential (e.g. a Google ID token obtained by the
    /// client's popup flow) for a session
    async fn sign_in_with_idp(
        &self,
        provider_id: &str,
        credential: &str,
    ) -> Result<Session, IdentityError>;

    /// Exchanges a refresh token for a new ID token
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, IdentityError>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
