//! Identity directory contract and SQLite implementation.
//!
//! # Responsibility
//! - Resolve reporters by email for "my complaints" lookups.
//! - Materialize fallback reporters through an idempotent upsert.
//!
//! # Invariants
//! - Emails are stored normalized (trimmed, lowercase) and unique.
//! - `get_or_create` never creates a second row for the same email, even
//!   when two callers race.

use crate::model::complaint::{now_epoch_ms, ComplaintValidationError};
use crate::model::user::{normalize_email, User};
use crate::repo::complaint_repo::{RepoError, RepoResult};
use crate::repo::schema::ensure_table_ready;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const USER_COLUMNS: &[&str] = &["id", "email", "display_name", "created_at"];

/// Identity collaborator used by the lifecycle engine.
pub trait UserDirectory {
    /// Looks up a user by email; a miss is `Ok(None)`.
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// Creates a user. Fails with a storage error if the email is taken.
    fn create_user(&self, email: &str, display_name: &str) -> RepoResult<User>;
    /// Returns the user for `email`, creating it first when absent.
    fn get_or_create(&self, email: &str, display_name: &str) -> RepoResult<User>;
}

/// SQLite-backed identity directory.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "users", USER_COLUMNS)?;
        Ok(Self { conn })
    }

    fn load_by_normalized_email(&self, email: &str) -> RepoResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, email, display_name, created_at
                 FROM users
                 WHERE email = ?1;",
                [email],
                |row| Ok(read_user_columns(row)),
            )
            .optional()?;
        row.transpose()
    }
}

impl UserDirectory for SqliteUserRepository<'_> {
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        match normalize_email(email) {
            Some(normalized) => self.load_by_normalized_email(&normalized),
            None => Ok(None),
        }
    }

    fn create_user(&self, email: &str, display_name: &str) -> RepoResult<User> {
        let email = normalize_email(email).ok_or(ComplaintValidationError::BlankField("email"))?;
        let user = User {
            id: Uuid::new_v4(),
            email,
            display_name: display_name.trim().to_string(),
            created_at: now_epoch_ms(),
        };
        self.conn.execute(
            "INSERT INTO users (id, email, display_name, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                user.id.to_string(),
                user.email.as_str(),
                user.display_name.as_str(),
                user.created_at,
            ],
        )?;
        Ok(user)
    }

    fn get_or_create(&self, email: &str, display_name: &str) -> RepoResult<User> {
        let email = normalize_email(email).ok_or(ComplaintValidationError::BlankField("email"))?;
        self.conn.execute(
            "INSERT INTO users (id, email, display_name, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(email) DO NOTHING;",
            params![
                Uuid::new_v4().to_string(),
                email.as_str(),
                display_name.trim(),
                now_epoch_ms(),
            ],
        )?;
        self.load_by_normalized_email(&email)?.ok_or_else(|| {
            RepoError::InvalidData(format!("user `{email}` missing after upsert"))
        })
    }
}

fn read_user_columns(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get(0)?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in users.id"))
    })?;
    Ok(User {
        id,
        email: row.get(1)?,
        display_name: row.get(2)?,
        created_at: row.get(3)?,
    })
}
