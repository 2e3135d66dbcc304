//! Users and login sessions.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Result, Row};

use super::{generate_id, DbSession, TimetableDb, User};

/// Profile data used to find or create a user at login.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
    /// Replaces the stored picture when present; `None` leaves it untouched.
    pub picture: Option<String>,
}

impl TimetableDb {
    /// Finds the user with the given email, refreshing its name (and picture,
    /// if one is supplied), or creates a new user.
    pub fn upsert_user(&self, profile: &UserProfile) -> Result<User> {
        let db = self.conn();

        let existing = db
            .query_row(
                "SELECT user_id, email, name, picture, created_at
                 FROM users WHERE email = ?1 ORDER BY rowid LIMIT 1",
                [&profile.email],
                row_to_user,
            )
            .optional()?;

        match existing {
            Some(mut user) => {
                db.execute(
                    "UPDATE users SET name = ?1, picture = COALESCE(?2, picture) WHERE user_id = ?3",
                    params![profile.name, profile.picture, user.user_id],
                )?;
                user.name = profile.name.clone();
                if profile.picture.is_some() {
                    user.picture = profile.picture.clone();
                }
                Ok(user)
            }
            None => {
                let user = User {
                    user_id: generate_id("user"),
                    email: profile.email.clone(),
                    name: profile.name.clone(),
                    picture: profile.picture.clone(),
                    created_at: Utc::now(),
                };
                db.execute(
                    "INSERT INTO users (user_id, email, name, picture, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![user.user_id, user.email, user.name, user.picture, user.created_at],
                )?;
                Ok(user)
            }
        }
    }

    /// Gets a user by id.
    pub fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        self.conn()
            .query_row(
                "SELECT user_id, email, name, picture, created_at FROM users WHERE user_id = ?1",
                [user_id],
                row_to_user,
            )
            .optional()
    }

    /// Stores a session under the digest of its token.
    pub fn create_session(
        &self,
        token_digest: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<DbSession> {
        let session = DbSession {
            user_id: user_id.to_string(),
            expires_at,
            created_at: Utc::now(),
        };

        // Identity providers may hand back a token we have already seen
        self.conn().execute(
            "INSERT OR REPLACE INTO user_sessions (token_digest, user_id, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                token_digest,
                session.user_id,
                session.expires_at,
                session.created_at
            ],
        )?;

        Ok(session)
    }

    /// Gets a session by the digest of its token.
    pub fn find_session(&self, token_digest: &str) -> Result<Option<DbSession>> {
        self.conn()
            .query_row(
                "SELECT user_id, expires_at, created_at
                 FROM user_sessions WHERE token_digest = ?1",
                [token_digest],
                |row| {
                    Ok(DbSession {
                        user_id: row.get(0)?,
                        expires_at: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()
    }

    /// Deletes a session. Returns whether a session was removed.
    pub fn delete_session(&self, token_digest: &str) -> Result<bool> {
        let removed = self.conn().execute(
            "DELETE FROM user_sessions WHERE token_digest = ?1",
            [token_digest],
        )?;
        Ok(removed > 0)
    }

    /// Deletes every session that expired before `now`, returning how many went.
    ///
    /// Expiry times are stored as UTC text of one fixed format, so they
    /// compare correctly as strings.
    pub fn prune_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
        self.conn()
            .execute("DELETE FROM user_sessions WHERE expires_at < ?1", [now])
    }
}

fn row_to_user(row: &Row<'_>) -> Result<User> {
    Ok(User {
        user_id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        picture: row.get(3)?,
        created_at: row.get(4)?,
    })
}
