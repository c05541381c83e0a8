use std::sync::Arc;

use serde::Serialize;

use crate::{
    models::Session,
    services::identity::{IdentityError, IdentityProvider},
};

/// Known identity failures, each with a stable user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorCode {
    UserNotFound,
    WrongCredential,
    EmailInUse,
    WeakPassword,
    InvalidEmail,
    Unknown,
}

impl AuthErrorCode {
    /// Maps a provider error code.
    ///
    /// Accepts both REST codes (`EMAIL_NOT_FOUND`, optionally followed by
    /// `" : detail"`) and SDK-style codes (`auth/user-not-found`).
    pub fn from_provider_code(code: &str) -> Self {
        let code = code.split(" : ").next().unwrap_or_default().trim();
        match code {
            "EMAIL_NOT_FOUND" | "auth/user-not-found" => AuthErrorCode::UserNotFound,
            "INVALID_PASSWORD"
            | "INVALID_LOGIN_CREDENTIALS"
            | "auth/wrong-password"
            | "auth/invalid-credential" => AuthErrorCode::WrongCredential,
            "EMAIL_EXISTS" | "auth/email-already-in-use" => AuthErrorCode::EmailInUse,
            "WEAK_PASSWORD" | "auth/weak-password" => AuthErrorCode::WeakPassword,
            "INVALID_EMAIL" | "MISSING_EMAIL" | "auth/invalid-email" => AuthErrorCode::InvalidEmail,
            _ => AuthErrorCode::Unknown,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            AuthErrorCode::UserNotFound => "No account found with this email.",
            AuthErrorCode::WrongCredential => "Incorrect password. Please try again.",
            AuthErrorCode::EmailInUse => "This email is already in use.",
            AuthErrorCode::WeakPassword => "Password should be at least 6 characters.",
            AuthErrorCode::InvalidEmail => "Please enter a valid email address.",
            AuthErrorCode::Unknown => "Something went wrong. Please try again.",
        }
    }
}

/// Authentication failure with a message safe to show to the user
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AuthFailure {
    pub code: AuthErrorCode,
    pub message: String,
}

impl AuthFailure {
    pub fn from_code(code: AuthErrorCode) -> Self {
        Self {
            code,
            message: code.message().to_string(),
        }
    }
}

impl From<IdentityError> for AuthFailure {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::Rejected(code) => {
                let mapped = AuthErrorCode::from_provider_code(&code);
                if mapped == AuthErrorCode::Unknown {
                    tracing::warn!(code = %code, "Unrecognized identity error code");
                }
                AuthFailure::from_code(mapped)
            }
            other => {
                tracing::error!(error = %other, "Identity provider request failed");
                AuthFailure::from_code(AuthErrorCode::Unknown)
            }
        }
    }
}

/// Credential operations against the identity provider
#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
}

impl AuthService {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthFailure> {
        let email = validate_email(email)?;
        Ok(self.provider.sign_in_with_password(email, password).await?)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthFailure> {
        let email = validate_email(email)?;
        Ok(self.provider.sign_up(email, password).await?)
    }

    pub async fn sign_in_federated(
        &self,
        provider_id: &str,
        credential: &str,
    ) -> Result<Session, AuthFailure> {
        if credential.trim().is_empty() {
            return Err(AuthFailure::from_code(AuthErrorCode::WrongCredential));
        }
        Ok(self.provider.sign_in_with_idp(provider_id, credential).await?)
    }

    /// Renews the session's ID token with its refresh token
    pub async fn refresh(&self, session: &Session) -> Result<Session, AuthFailure> {
        let refresh_token = session
            .refresh_token
            .as_deref()
            .ok_or_else(|| AuthFailure::from_code(AuthErrorCode::Unknown))?;

        let grant = self.provider.refresh_token(refresh_token).await?;
        Ok(session.renewed(grant))
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

fn validate_email(email: &str) -> Result<&str, AuthFailure> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthFailure::from_code(AuthErrorCode::InvalidEmail));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::services::identity::MockIdentityProvider;

    fn session() -> Session {
        Session {
            user: User {
                uid: "uid-1".to_string(),
                display_name: None,
                email: Some("ada@example.com".to_string()),
                photo_url: None,
            },
            id_token: "token".to_string(),
            refresh_token: None,
            expires_at: None,
        }
    }

    #[test]
    fn test_provider_codes_map_to_distinct_messages() {
        let not_found = AuthErrorCode::from_provider_code("EMAIL_NOT_FOUND");
        let in_use = AuthErrorCode::from_provider_code("EMAIL_EXISTS");

        assert_eq!(not_found, AuthErrorCode::UserNotFound);
        assert_eq!(in_use, AuthErrorCode::EmailInUse);
        assert_eq!(not_found.message(), "No account found with this email.");
        assert_eq!(in_use.message(), "This email is already in use.");
        assert_ne!(not_found.message(), in_use.message());
    }

    #[test]
    fn test_provider_code_with_detail_suffix() {
        assert_eq!(
            AuthErrorCode::from_provider_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthErrorCode::WeakPassword
        );
    }

    #[test]
    fn test_sdk_style_codes() {
        assert_eq!(
            AuthErrorCode::from_provider_code("auth/user-not-found"),
            AuthErrorCode::UserNotFound
        );
        assert_eq!(
            AuthErrorCode::from_provider_code("auth/wrong-password"),
            AuthErrorCode::WrongCredential
        );
    }

    #[test]
    fn test_unknown_code_gets_generic_message() {
        let failure = AuthFailure::from(IdentityError::Rejected("TOO_MANY_ATTEMPTS_TRY_LATER".to_string()));
        assert_eq!(failure.code, AuthErrorCode::Unknown);
        assert_eq!(failure.message, "Something went wrong. Please try again.");
    }

    #[tokio::test]
    async fn test_sign_in_unregistered_email() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_sign_in_with_password()
            .returning(|_, _| Err(IdentityError::Rejected("EMAIL_NOT_FOUND".to_string())));

        let auth = AuthService::new(Arc::new(provider));
        let failure = auth
            .sign_in_with_password("nobody@example.com", "anything")
            .await
            .unwrap_err();

        assert_eq!(failure.code, AuthErrorCode::UserNotFound);
        assert_eq!(failure.to_string(), "No account found with this email.");
    }

    #[tokio::test]
    async fn test_sign_up_existing_email() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_sign_up()
            .returning(|_, _| Err(IdentityError::Rejected("EMAIL_EXISTS".to_string())));

        let auth = AuthService::new(Arc::new(provider));
        let failure = auth
            .sign_up("ada@example.com", "secret123")
            .await
            .unwrap_err();

        assert_eq!(failure.message, "This email is already in use.");
    }

    #[tokio::test]
    async fn test_invalid_email_rejected_locally() {
        let mut provider = MockIdentityProvider::new();
        provider.expect_sign_in_with_password().never();

        let auth = AuthService::new(Arc::new(provider));
        let failure = auth.sign_in_with_password("  ", "secret").await.unwrap_err();
        assert_eq!(failure.code, AuthErrorCode::InvalidEmail);
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_fails() {
        let mut provider = MockIdentityProvider::new();
        provider.expect_refresh_token().never();

        let auth = AuthService::new(Arc::new(provider));
        let failure = auth.refresh(&session()).await.unwrap_err();
        assert_eq!(failure.code, AuthErrorCode::Unknown);
    }

    #[tokio::test]
    async fn test_email_trimmed_before_provider_call() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_sign_in_with_password()
            .withf(|email, _| email == "ada@example.com")
            .returning(|_, _| Ok(session()));

        let auth = AuthService::new(Arc::new(provider));
        let session = auth
            .sign_in_with_password(" ada@example.com ", "secret")
            .await
            .unwrap();
        assert_eq!(session.user.uid, "uid-1");
    }
}
