//! Complaint store bootstrap: connection setup and schema versioning.
//!
//! # Responsibility
//! - Hand out connections whose schema matches what the repositories expect.
//! - Report which migration step failed when a schema upgrade breaks.
//!
//! # Invariants
//! - `PRAGMA user_version` equals the last applied migration.
//! - Repositories never see a connection that skipped [`open_db`] or
//!   [`open_db_in_memory`] unless they verify the schema themselves.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or upgrading the complaint store.
#[derive(Debug)]
pub enum DbError {
    /// Connection-level SQLite failure.
    Sqlite(rusqlite::Error),
    /// A single migration step could not be applied.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// The file was written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "migration {version} ({name}) failed: {source}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "complaint store schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
