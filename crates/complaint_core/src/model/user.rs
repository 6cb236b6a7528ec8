//! Reporter identity model.
//!
//! Complaints only hold a weak `UserId` reference plus an email snapshot;
//! user lifecycle is owned by the identity directory.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a reporting user.
pub type UserId = Uuid;

/// Email of the process-wide fallback reporter.
pub const DEFAULT_OWNER_EMAIL: &str = "default@example.com";
/// Display name used when the fallback reporter is materialized.
pub const DEFAULT_OWNER_NAME: &str = "Default User";

/// Identity record as seen by the complaint core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Lowercased, trimmed. Unique across the directory.
    pub email: String,
    pub display_name: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Normalizes an email for lookup and uniqueness checks.
///
/// Returns `None` for blank input.
pub fn normalize_email(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_ascii_lowercase())
}
