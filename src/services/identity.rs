//! External identity provider
//!
//! Third-party login hands the client a short-lived session id. The backend
//! exchanges it with the provider for the user's profile and a session token.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Profile returned by a successful exchange
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalIdentity {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    pub session_token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The provider did not accept the session id
    #[error("Session exchange rejected")]
    Rejected,

    /// The provider could not be reached or answered garbage
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Exchanges an external session id for an identity
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn exchange(&self, session_id: &str) -> Result<ExternalIdentity, IdentityError>;
}

/// HTTP provider: `GET {url}` with the session id in `X-Session-ID`
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpIdentityProvider {
    pub fn new(url: impl Into<String>) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("rentmoldova/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| IdentityError::Unavailable(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn exchange(&self, session_id: &str) -> Result<ExternalIdentity, IdentityError> {
        let response = self
            .client
            .get(&self.url)
            .header("X-Session-ID", session_id)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            tracing::warn!("Identity provider rejected session: {}", response.status());
            return Err(IdentityError::Rejected);
        }

        response
            .json::<ExternalIdentity>()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("Invalid identity response: {}", e)))
    }
}
