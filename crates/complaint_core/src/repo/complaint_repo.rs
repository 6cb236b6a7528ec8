//! Complaint store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide keyed storage of complaint records with simple secondary lookups.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Complaint::validate()` before SQL mutations.
//! - `save` is a full-overwrite upsert: last write wins, no version check.
//! - Upvotes are incremented inside SQL, never by read-modify-write.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::complaint::{
    now_epoch_ms, Complaint, ComplaintId, ComplaintPriority, ComplaintStatus,
    ComplaintValidationError,
};
use crate::model::user::UserId;
use crate::repo::schema::ensure_table_ready;
use rusqlite::{params, Connection, Params, Row};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const COMPLAINT_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    category,
    location,
    status,
    priority,
    upvotes,
    photo_url,
    owner_id,
    owner_email,
    created_at,
    updated_at
FROM complaints";

const COMPLAINT_LIST_ORDER: &str = "ORDER BY created_at DESC, id ASC";

const COMPLAINT_COLUMNS: &[&str] = &[
    "id",
    "title",
    "description",
    "category",
    "location",
    "status",
    "priority",
    "upvotes",
    "photo_url",
    "owner_id",
    "owner_email",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for complaint and identity persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed domain validation before reaching SQL.
    Validation(ComplaintValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target complaint does not exist.
    NotFound(ComplaintId),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "complaint not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ComplaintValidationError> for RepoError {
    fn from(value: ComplaintValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for complaint records.
///
/// Each operation is atomic on a single record; no cross-record transactions.
pub trait ComplaintStore {
    /// Inserts or fully overwrites one record and returns it as stored.
    fn save(&self, complaint: &Complaint) -> RepoResult<Complaint>;
    /// Loads one record; a miss is `Ok(None)`, never an error.
    fn find_by_id(&self, id: ComplaintId) -> RepoResult<Option<Complaint>>;
    /// Loads every record. Callers must not rely on the order.
    fn find_all(&self) -> RepoResult<Vec<Complaint>>;
    /// Loads records whose weak owner reference equals `owner_id`.
    fn find_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<Complaint>>;
    /// Equality filter on status.
    fn find_by_status(&self, status: ComplaintStatus) -> RepoResult<Vec<Complaint>>;
    /// Exact, case-sensitive equality filter on category.
    fn find_by_category(&self, category: &str) -> RepoResult<Vec<Complaint>>;
    /// Adds exactly one upvote in storage and returns the updated record.
    fn increment_upvotes(&self, id: ComplaintId, updated_at: i64) -> RepoResult<Complaint>;
    /// Rewrites only `status` and `updated_at`; other columns keep their
    /// stored values.
    fn set_status(
        &self,
        id: ComplaintId,
        status: ComplaintStatus,
        updated_at: i64,
    ) -> RepoResult<Complaint>;
    /// Counts records per status; statuses with no records are reported as 0.
    fn count_by_status(&self) -> RepoResult<BTreeMap<ComplaintStatus, u64>>;
}

/// SQLite-backed complaint store.
pub struct SqliteComplaintRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteComplaintRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "complaints", COMPLAINT_COLUMNS)?;
        Ok(Self { conn })
    }

    fn query_list<P: Params>(&self, filter: &str, params: P) -> RepoResult<Vec<Complaint>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COMPLAINT_SELECT_SQL} {filter} {COMPLAINT_LIST_ORDER};"
        ))?;
        let mut rows = stmt.query(params)?;
        let mut complaints = Vec::new();
        while let Some(row) = rows.next()? {
            complaints.push(parse_complaint_row(row)?);
        }
        Ok(complaints)
    }
}

impl ComplaintStore for SqliteComplaintRepository<'_> {
    fn save(&self, complaint: &Complaint) -> RepoResult<Complaint> {
        complaint.validate()?;

        let mut stored = complaint.clone();
        let now = now_epoch_ms();
        if stored.created_at == 0 {
            stored.created_at = now;
        }
        if stored.updated_at == 0 {
            stored.updated_at = stored.created_at;
        }

        let upvotes = i64::try_from(stored.upvotes).map_err(|_| {
            RepoError::InvalidData(format!("upvotes value {} exceeds storage range", stored.upvotes))
        })?;

        self.conn.execute(
            "INSERT INTO complaints (
                id,
                title,
                description,
                category,
                location,
                status,
                priority,
                upvotes,
                photo_url,
                owner_id,
                owner_email,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                category = excluded.category,
                location = excluded.location,
                status = excluded.status,
                priority = excluded.priority,
                upvotes = excluded.upvotes,
                photo_url = excluded.photo_url,
                owner_id = excluded.owner_id,
                owner_email = excluded.owner_email,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at;",
            params![
                stored.id.to_string(),
                stored.title.as_str(),
                stored.description.as_str(),
                stored.category.as_str(),
                stored.location.as_str(),
                stored.status.as_str(),
                stored.priority.as_str(),
                upvotes,
                stored.photo_url.as_deref(),
                stored.owner_id.map(|id| id.to_string()),
                stored.owner_email.as_str(),
                stored.created_at,
                stored.updated_at,
            ],
        )?;

        Ok(stored)
    }

    fn find_by_id(&self, id: ComplaintId) -> RepoResult<Option<Complaint>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMPLAINT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_complaint_row(row)?));
        }
        Ok(None)
    }

    fn find_all(&self) -> RepoResult<Vec<Complaint>> {
        self.query_list("", params![])
    }

    fn find_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<Complaint>> {
        self.query_list("WHERE owner_id = ?1", [owner_id.to_string()])
    }

    fn find_by_status(&self, status: ComplaintStatus) -> RepoResult<Vec<Complaint>> {
        self.query_list("WHERE status = ?1", [status.as_str()])
    }

    fn find_by_category(&self, category: &str) -> RepoResult<Vec<Complaint>> {
        self.query_list("WHERE category = ?1", [category])
    }

    fn increment_upvotes(&self, id: ComplaintId, updated_at: i64) -> RepoResult<Complaint> {
        let changed = self.conn.execute(
            "UPDATE complaints
             SET
                upvotes = upvotes + 1,
                updated_at = ?2
             WHERE id = ?1;",
            params![id.to_string(), updated_at],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.find_by_id(id)?.ok_or(RepoError::NotFound(id))
    }

    fn set_status(
        &self,
        id: ComplaintId,
        status: ComplaintStatus,
        updated_at: i64,
    ) -> RepoResult<Complaint> {
        let changed = self.conn.execute(
            "UPDATE complaints
             SET
                status = ?2,
                updated_at = ?3
             WHERE id = ?1;",
            params![id.to_string(), status.as_str(), updated_at],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.find_by_id(id)?.ok_or(RepoError::NotFound(id))
    }

    fn count_by_status(&self) -> RepoResult<BTreeMap<ComplaintStatus, u64>> {
        let mut counts: BTreeMap<ComplaintStatus, u64> = ComplaintStatus::ALL
            .into_iter()
            .map(|status| (status, 0))
            .collect();

        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM complaints GROUP BY status;")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let status_text: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            let status = ComplaintStatus::parse(&status_text).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid status `{status_text}` in complaints.status"
                ))
            })?;
            counts.insert(status, count.max(0) as u64);
        }

        Ok(counts)
    }
}

fn parse_complaint_row(row: &Row<'_>) -> RepoResult<Complaint> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in complaints.id"))
    })?;

    let status_text: String = row.get("status")?;
    let status = ComplaintStatus::parse(&status_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in complaints.status"
        ))
    })?;

    let priority_text: String = row.get("priority")?;
    let priority = ComplaintPriority::parse(&priority_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in complaints.priority"
        ))
    })?;

    let upvotes_raw: i64 = row.get("upvotes")?;
    let upvotes = u64::try_from(upvotes_raw).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid upvotes value `{upvotes_raw}` in complaints.upvotes"
        ))
    })?;

    let owner_id = match row.get::<_, Option<String>>("owner_id")? {
        Some(value) => Some(Uuid::parse_str(&value).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid uuid value `{value}` in complaints.owner_id"
            ))
        })?),
        None => None,
    };

    let complaint = Complaint {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        category: row.get("category")?,
        location: row.get("location")?,
        status,
        priority,
        upvotes,
        photo_url: row.get("photo_url")?,
        owner_id,
        owner_email: row.get("owner_email")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    complaint.validate()?;
    Ok(complaint)
}
