/// Database module holding every timetable collection in SQLite

mod accounts;
mod catalog;
mod slots;
mod timetable;
mod types;

pub use accounts::UserProfile;
pub use types::*;

use rand::Rng;
use rusqlite::types::Value;
use rusqlite::{Connection, Result};
use std::sync::{Mutex, MutexGuard};

const SCHEMA_SQL: &str = include_str!("../../sql/init_timetable.sql");

/// Maximum number of rows returned by a collection listing.
pub const LIST_LIMIT: i64 = 1000;

/// Maximum number of time slots returned by a listing.
pub const SLOT_LIST_LIMIT: i64 = 100;

pub struct TimetableDb {
    db: Mutex<Connection>,
}

impl TimetableDb {
    /// Opens (or creates) the database at `db_path` and applies the schema.
    ///
    /// `":memory:"` gives a private in-memory database.
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch(SCHEMA_SQL)?;

        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// Locks the connection. A poisoned lock still holds a usable connection.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Generates an identifier such as `dept_1a2b3c4d5e6f`.
pub fn generate_id(prefix: &str) -> String {
    let bytes: [u8; 6] = rand::thread_rng().gen();
    format!("{prefix}_{}", hex::encode(bytes))
}

/// Builds a ` WHERE a = ?1 AND b = ?2` clause and its bound values.
fn where_clause(predicates: Vec<(&'static str, Value)>) -> (String, Vec<Value>) {
    if predicates.is_empty() {
        return (String::new(), Vec::new());
    }

    let mut clauses = Vec::with_capacity(predicates.len());
    let mut values = Vec::with_capacity(predicates.len());
    for (i, (column, value)) in predicates.into_iter().enumerate() {
        clauses.push(format!("{column} = ?{}", i + 1));
        values.push(value);
    }

    (format!(" WHERE {}", clauses.join(" AND ")), values)
}
