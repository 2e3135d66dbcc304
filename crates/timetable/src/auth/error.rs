//! Error types for the session layer.

use thiserror::Error;

/// Errors that can occur while authenticating a request or opening a session.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No session token in the cookie or the Authorization header
    #[error("Not authenticated")]
    Unauthenticated,

    /// The token does not name a stored session
    #[error("Invalid session")]
    InvalidSession,

    /// The session exists but its expiry has passed
    #[error("Session expired")]
    SessionExpired,

    /// The session belongs to a user that no longer exists
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: String },

    /// The identity exchange was attempted without a session id
    #[error("Missing X-Session-ID header")]
    MissingSessionId,

    /// The identity provider refused the session id
    #[error("Identity provider rejected the session id with status {status}")]
    IdentityRejected { status: u16 },

    /// The identity provider could not be reached or answered garbage
    #[error("Identity provider error: {message}")]
    Identity { message: String },

    /// The session store failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl AuthError {
    /// Returns true if the caller should sign in again.
    pub fn needs_reauth(&self) -> bool {
        matches!(
            self,
            AuthError::Unauthenticated
                | AuthError::InvalidSession
                | AuthError::SessionExpired
                | AuthError::IdentityRejected { .. }
        )
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Identity {
            message: err.to_string(),
        }
    }
}
