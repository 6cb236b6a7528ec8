//! Complaint domain model.
//!
//! # Responsibility
//! - Define the canonical complaint record tracked through its lifecycle.
//! - Own the closed status/priority vocabularies and their text parsing.
//!
//! # Invariants
//! - `id` is stable and never reused for another complaint.
//! - `status` and `priority` are always one of their enumerated values.
//! - `upvotes` never decreases.
//! - Every complaint carries a non-blank `owner_email`, even when the weak
//!   `owner_id` reference is absent.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::model::user::UserId;

/// Stable identifier for every complaint record.
pub type ComplaintId = Uuid;

/// Lifecycle state of a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    /// Filed, not yet picked up by staff.
    Pending,
    /// Staff is working on it.
    InProgress,
    /// Fixed.
    Resolved,
    /// Closed without action.
    Rejected,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 4] = [
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
        ComplaintStatus::Rejected,
    ];

    /// Returns the canonical wire/storage token.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Parses a status token case-insensitively, ignoring surrounding space.
    pub fn parse(value: &str) -> Result<Self, ComplaintValidationError> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ComplaintValidationError::UnknownStatus(value.to_string()))
    }
}

impl Display for ComplaintStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Triage priority supplied by the reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl ComplaintPriority {
    pub const ALL: [ComplaintPriority; 3] = [
        ComplaintPriority::Low,
        ComplaintPriority::Medium,
        ComplaintPriority::High,
    ];

    /// Returns the canonical wire/storage token.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    /// Parses a priority token case-insensitively, ignoring surrounding space.
    pub fn parse(value: &str) -> Result<Self, ComplaintValidationError> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str() == normalized)
            .ok_or_else(|| ComplaintValidationError::UnknownPriority(value.to_string()))
    }

    /// Resolves optional caller input; absent or blank input means `Medium`.
    pub fn resolve(value: Option<&str>) -> Result<Self, ComplaintValidationError> {
        match value {
            Some(text) if !text.trim().is_empty() => Self::parse(text),
            _ => Ok(Self::default()),
        }
    }
}

impl Display for ComplaintPriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for complaint input and persisted records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplaintValidationError {
    /// A required text field is empty or whitespace only.
    BlankField(&'static str),
    /// Priority text matches none of `LOW|MEDIUM|HIGH`.
    UnknownPriority(String),
    /// Status text matches none of the lifecycle states.
    UnknownStatus(String),
}

impl Display for ComplaintValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::UnknownPriority(value) => write!(
                f,
                "no enum constant ComplaintPriority for `{value}`; expected LOW|MEDIUM|HIGH"
            ),
            Self::UnknownStatus(value) => write!(
                f,
                "no enum constant ComplaintStatus for `{value}`; expected PENDING|IN_PROGRESS|RESOLVED|REJECTED"
            ),
        }
    }
}

impl Error for ComplaintValidationError {}

/// Canonical complaint record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: ComplaintId,
    pub title: String,
    pub description: String,
    /// Free-form; only non-blank is enforced.
    pub category: String,
    pub location: String,
    pub status: ComplaintStatus,
    pub priority: ComplaintPriority,
    pub upvotes: u64,
    /// Reference returned by the photo store, if a photo was attached.
    pub photo_url: Option<String>,
    /// Weak reference to the reporting user. Cleared if the user goes away.
    pub owner_id: Option<UserId>,
    /// Snapshot of the reporter email, kept independently of `owner_id`.
    pub owner_email: String,
    /// Unix epoch milliseconds. Zero means "not yet stamped by storage".
    pub created_at: i64,
    /// Unix epoch milliseconds. Bumped on every mutation.
    pub updated_at: i64,
}

impl Complaint {
    /// Creates a pending complaint with a generated stable ID.
    ///
    /// # Invariants
    /// - `status` starts as `Pending` and `upvotes` as `0`.
    /// - Timestamps are left at `0` for the store to stamp.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        location: impl Into<String>,
        owner_email: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            category: category.into(),
            location: location.into(),
            status: ComplaintStatus::Pending,
            priority: ComplaintPriority::default(),
            upvotes: 0,
            photo_url: None,
            owner_id: None,
            owner_email: owner_email.into(),
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Checks record-level invariants that the type system cannot express.
    pub fn validate(&self) -> Result<(), ComplaintValidationError> {
        for (field, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("category", &self.category),
            ("location", &self.location),
            ("owner_email", &self.owner_email),
        ] {
            if value.trim().is_empty() {
                return Err(ComplaintValidationError::BlankField(field));
            }
        }
        Ok(())
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{Complaint, ComplaintPriority, ComplaintStatus, ComplaintValidationError};

    #[test]
    fn priority_parse_is_case_insensitive() {
        for raw in ["high", "HIGH", "High", "  hIgH "] {
            assert_eq!(ComplaintPriority::parse(raw).unwrap(), ComplaintPriority::High);
        }
    }

    #[test]
    fn priority_resolve_defaults_to_medium() {
        assert_eq!(
            ComplaintPriority::resolve(None).unwrap(),
            ComplaintPriority::Medium
        );
        assert_eq!(
            ComplaintPriority::resolve(Some("   ")).unwrap(),
            ComplaintPriority::Medium
        );
    }

    #[test]
    fn unknown_priority_reports_no_enum_constant() {
        let err = ComplaintPriority::parse("URGENT").unwrap_err();
        assert_eq!(
            err,
            ComplaintValidationError::UnknownPriority("URGENT".to_string())
        );
        assert!(err.to_string().contains("no enum constant"));
    }

    #[test]
    fn status_parse_accepts_snake_tokens_only() {
        assert_eq!(
            ComplaintStatus::parse("in_progress").unwrap(),
            ComplaintStatus::InProgress
        );
        assert!(ComplaintStatus::parse("in progress").is_err());
        assert!(ComplaintStatus::parse("closed").is_err());
    }

    #[test]
    fn new_complaint_starts_pending_with_zero_upvotes() {
        let complaint = Complaint::new("t", "d", "roads", "Main St", "a@example.com");
        assert_eq!(complaint.status, ComplaintStatus::Pending);
        assert_eq!(complaint.priority, ComplaintPriority::Medium);
        assert_eq!(complaint.upvotes, 0);
        assert!(complaint.photo_url.is_none());
    }

    #[test]
    fn validate_rejects_blank_fields() {
        let complaint = Complaint::new("t", "d", " ", "Main St", "a@example.com");
        assert_eq!(
            complaint.validate().unwrap_err(),
            ComplaintValidationError::BlankField("category")
        );
    }

    #[test]
    fn status_serializes_as_screaming_token() {
        let json = serde_json::to_string(&ComplaintStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
    }
}
