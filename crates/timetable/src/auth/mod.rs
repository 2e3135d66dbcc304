//! Session authentication.
//!
//! A request is authenticated by a session token (cookie or bearer header)
//! that names a stored, unexpired session owned by an existing user.

mod error;
mod identity;
mod token;

pub use error::AuthError;
pub use identity::{IdentityClient, SessionData, SESSION_ID_HEADER};
pub use token::{clear_session_cookie, session_cookie, SessionToken};

#[cfg(test)]
pub(crate) use identity::tests::spawn_provider;

use chrono::{Duration, Utc};
use tracing::{debug, warn};

use crate::db::{TimetableDb, User, UserProfile};

/// Resolves the user behind a session token.
///
/// The checks short-circuit in order: a token must be present, must name a
/// stored session, that session must not have expired, and its owner must
/// still exist.
///
/// # Arguments
/// * `db` - The session and user store
/// * `token` - The token presented by the client, if any
///
/// # Returns
/// * `Ok(User)` - The authenticated user
/// * `Err` - The first check that failed
pub fn authenticate(db: &TimetableDb, token: Option<&SessionToken>) -> Result<User, AuthError> {
    let token = token.ok_or(AuthError::Unauthenticated)?;

    let session = db
        .find_session(&token.digest())?
        .ok_or(AuthError::InvalidSession)?;

    if session.expires_at < Utc::now() {
        debug!("Session {} expired at {}", token, session.expires_at);
        return Err(AuthError::SessionExpired);
    }

    match db.get_user(&session.user_id)? {
        Some(user) => {
            debug!(
                "Session {} (opened {}) belongs to {}",
                token, session.created_at, user.user_id
            );
            Ok(user)
        }
        None => {
            warn!("Session {} points at missing user {}", token, session.user_id);
            Err(AuthError::UserNotFound {
                user_id: session.user_id,
            })
        }
    }
}

/// Finds or creates the user described by `profile` and opens a session
/// for it under `token`, valid for `ttl`.
pub fn start_session(
    db: &TimetableDb,
    profile: &UserProfile,
    token: &SessionToken,
    ttl: Duration,
) -> Result<User, AuthError> {
    let user = db.upsert_user(profile)?;
    db.create_session(&token.digest(), &user.user_id, Utc::now() + ttl)?;
    debug!("Opened session {} for {}", token, user.user_id);
    Ok(user)
}

/// Ends the session named by `token`. Unknown tokens are ignored.
pub fn end_session(db: &TimetableDb, token: &SessionToken) -> Result<(), AuthError> {
    if db.delete_session(&token.digest())? {
        debug!("Closed session {}", token);
    }
    Ok(())
}
