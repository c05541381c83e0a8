/// Firebase Authentication provider
///
/// Talks to the Identity Toolkit REST API with the project's web API key:
/// - `accounts:signInWithPassword`
/// - `accounts:signUp`
/// - `accounts:signInWithIdp` (federated credential from the client's popup)
///
/// ID tokens live for an hour; they are renewed through the Secure Token API
/// (`token` with `grant_type=refresh_token`).
///
/// Errors come back as `{"error": {"message": "EMAIL_NOT_FOUND"}}`; the
/// message is passed up unchanged as the rejection code.
use crate::{
    models::{expiry_after, Session, TokenGrant, User},
    services::identity::{IdentityError, IdentityProvider},
};
use chrono::Utc;
use reqwest::{Client as HttpClient, Response, Url};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};

const PROVIDER: &str = "firebase";

/// Redirect URI reported for federated sign-in; the credential is already in hand
const IDP_REQUEST_URI: &str = "http://localhost";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    profile_picture: Option<String>,
    /// Token lifetime in seconds, as a string
    #[serde(default)]
    expires_in: Option<String>,
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        Session {
            user: User {
                uid: response.local_id,
                display_name: response.display_name.filter(|n| !n.is_empty()),
                email: response.email,
                photo_url: response.photo_url.or(response.profile_picture),
            },
            expires_at: expiry_after(response.expires_in.as_deref(), Utc::now()),
            id_token: response.id_token,
            refresh_token: response.refresh_token,
        }
    }
}

/// Secure Token API response; unlike Identity Toolkit it uses snake_case
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

impl From<RefreshResponse> for TokenGrant {
    fn from(response: RefreshResponse) -> Self {
        TokenGrant {
            expires_at: expiry_after(response.expires_in.as_deref(), Utc::now()),
            id_token: response.id_token,
            refresh_token: response.refresh_token,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct FirebaseIdentityProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    token_api_url: String,
}

impl FirebaseIdentityProvider {
    pub fn new(
        http_client: HttpClient,
        api_key: String,
        api_url: String,
        token_api_url: String,
    ) -> Self {
        Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            token_api_url: token_api_url.trim_end_matches('/').to_string(),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T, IdentityError> {
        let url = format!("{}/accounts:{}", self.api_url, method);
        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        Self::read_response(response).await
    }

    /// Decodes a success body, or the `{"error": {"message": ..}}` rejection
    async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T, IdentityError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(error) => IdentityError::Rejected(error.error.message),
                Err(_) => IdentityError::Response(format!("status {}: {}", status, body)),
            });
        }

        response
            .json()
            .await
            .map_err(|e| IdentityError::Response(e.to_string()))
    }

    /// Form-encoded `postBody` for `signInWithIdp`
    fn idp_post_body(provider_id: &str, credential: &str) -> Result<String, IdentityError> {
        let url = Url::parse_with_params(
            IDP_REQUEST_URI,
            &[("id_token", credential), ("providerId", provider_id)],
        )
        .map_err(|e| IdentityError::Response(e.to_string()))?;

        Ok(url.query().unwrap_or_default().to_string())
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        let response: AuthResponse = self
            .call(
                "signInWithPassword",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;

        tracing::info!(uid = %response.local_id, provider = PROVIDER, "Password sign-in succeeded");
        Ok(response.into())
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let response: AuthResponse = self
            .call(
                "signUp",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;

        tracing::info!(uid = %response.local_id, provider = PROVIDER, "Account created");
        Ok(response.into())
    }

    async fn sign_in_with_idp(
        &self,
        provider_id: &str,
        credential: &str,
    ) -> Result<Session, IdentityError> {
        let post_body = Self::idp_post_body(provider_id, credential)?;
        let response: AuthResponse = self
            .call(
                "signInWithIdp",
                json!({
                    "postBody": post_body,
                    "requestUri": IDP_REQUEST_URI,
                    "returnSecureToken": true,
                    "returnIdpCredential": true
                }),
            )
            .await?;

        tracing::info!(
            uid = %response.local_id,
            idp = %provider_id,
            provider = PROVIDER,
            "Federated sign-in succeeded"
        );
        Ok(response.into())
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, IdentityError> {
        let url = format!("{}/token", self.token_api_url);
        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .send()
            .await?;

        let refreshed: RefreshResponse = Self::read_response(response).await?;

        tracing::debug!(
            uid = ?refreshed.user_id,
            expires_in = ?refreshed.expires_in,
            provider = PROVIDER,
            "ID token refreshed"
        );
        Ok(refreshed.into())
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
