//! HTTP client for the external identity provider.
//!
//! After a user signs in with the provider, the browser comes back with a
//! one-time session id. Exchanging that id yields the user's profile and a
//! session token that this server then honours.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use super::error::AuthError;
use crate::config::IdentityConfig;

/// Header carrying the one-time session id, both inbound and upstream.
pub const SESSION_ID_HEADER: &str = "X-Session-ID";

/// Profile and session data returned by the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionData {
    /// The provider's own user id
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    pub session_token: String,
}

pub struct IdentityClient {
    client: Client,
    session_data_url: Url,
}

impl IdentityClient {
    /// Creates a client for the provider described by `config`.
    pub fn new(config: &IdentityConfig) -> Result<Self, AuthError> {
        let session_data_url =
            Url::parse(&config.session_data_url).map_err(|e| AuthError::Identity {
                message: format!("Invalid session data URL {}: {e}", config.session_data_url),
            })?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AuthError::Identity {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            session_data_url,
        })
    }

    /// Exchanges a one-time session id for the user's session data.
    ///
    /// # Returns
    /// * `Ok(SessionData)` - The provider accepted the id
    /// * `Err(AuthError::IdentityRejected)` - The provider answered with a non-success status
    /// * `Err(AuthError::Identity)` - The provider was unreachable or the body was malformed
    pub async fn exchange(&self, session_id: &str) -> Result<SessionData, AuthError> {
        info!("Exchanging session id with identity provider ({})", self.session_data_url);

        let response = self
            .client
            .get(self.session_data_url.clone())
            .header(SESSION_ID_HEADER, session_id)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Identity provider rejected session id with status {status}");
            return Err(AuthError::IdentityRejected {
                status: status.as_u16(),
            });
        }

        let data: SessionData = response.json().await.map_err(|e| AuthError::Identity {
            message: format!("Malformed session data: {e}"),
        })?;

        info!("Identity provider returned session data for user {}", data.id);
        Ok(data)
    }
}
