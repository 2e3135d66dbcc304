//! Session tokens and the cookie that carries them.

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;
use chrono::Duration;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Name of the cookie holding the session token.
pub const SESSION_COOKIE: &str = "session_token";

/// An opaque session token as presented by a client.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw token value.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Generates a fresh token such as `session_<32 hex chars>`.
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::thread_rng().gen();
        Self(format!("session_{}", hex::encode(bytes)))
    }

    /// Reads the token from the session cookie, falling back to a bearer
    /// `Authorization` header.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        Self::from_cookie(headers).or_else(|| Self::from_bearer(headers))
    }

    fn from_cookie(headers: &HeaderMap) -> Option<Self> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
            .map(|(_, value)| Self::new(value))
    }

    fn from_bearer(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(Self::new)
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// SHA-256 digest of the token, hex encoded. This is what the session
    /// store keys on, so raw tokens never reach the database.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only show the first 8 chars of the digest in logs
        let digest = self.digest();
        write!(f, "{}...", &digest[..8])
    }
}

/// Builds the `Set-Cookie` value that stores `token` for `ttl`.
pub fn session_cookie(token: &SessionToken, ttl: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        token.as_str(),
        ttl.num_seconds()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Builds the `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}
