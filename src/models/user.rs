use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Tokens are renewed this long before they actually expire
const REFRESH_MARGIN_SECS: i64 = 60;

/// Signed-in identity as reported by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

impl User {
    /// Name shown to other users: display name, else the email's local part
    pub fn display_label(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
            .unwrap_or("Anonymous")
            .to_string()
    }

    /// Author name attached to comments: display name, else the full email
    pub fn author_name(&self) -> String {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.email.as_deref())
            .unwrap_or("Anonymous")
            .to_string()
    }
}

/// An authenticated session issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub id_token: String,
    pub refresh_token: Option<String>,
    /// When `id_token` stops being accepted; `None` for tokens without a lifetime
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// True once `id_token` is expired or about to be
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - Duration::seconds(REFRESH_MARGIN_SECS) <= now,
            None => false,
        }
    }

    /// Same user with renewed tokens. The old refresh token is kept when the
    /// grant does not rotate it.
    pub fn renewed(&self, grant: TokenGrant) -> Self {
        Self {
            user: self.user.clone(),
            id_token: grant.id_token,
            refresh_token: grant.refresh_token.or_else(|| self.refresh_token.clone()),
            expires_at: grant.expires_at,
        }
    }
}

/// Tokens issued by exchanging a refresh token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub id_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Expiry instant for a provider `expires_in` value in seconds
pub fn expiry_after(expires_in: Option<&str>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    expires_in
        .and_then(|secs| secs.trim().parse::<i64>().ok())
        .map(|secs| now + Duration::seconds(secs))
}

/// Current-user state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "user", rename_all = "snake_case")]
pub enum AuthState {
    /// Session not resolved yet
    Loading,
    SignedOut,
    SignedIn(User),
}
