use chrono::Duration;

use crate::auth::IdentityClient;
use crate::config::Config;
use crate::db::TimetableDb;

/// State shared by every request handler.
pub struct AppState {
    /// The timetable collections, users and sessions
    pub db: TimetableDb,
    /// Client used to exchange identity provider session ids
    pub identity: IdentityClient,
    /// How long newly opened sessions stay valid
    pub session_ttl: Duration,
    /// Whether the session cookie carries the `Secure` attribute
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(config: &Config, db: TimetableDb, identity: IdentityClient) -> Self {
        Self {
            db,
            identity,
            session_ttl: config.session_ttl(),
            cookie_secure: config.cookie_secure,
        }
    }
}
