//! Response representations handed to transport layers.

use complaint_core::{Complaint, ComplaintServiceError, ErrorKind, PhotoStoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serialized complaint shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    /// `PENDING|IN_PROGRESS|RESOLVED|REJECTED`.
    pub status: String,
    /// `LOW|MEDIUM|HIGH`.
    pub priority: String,
    pub upvotes: u64,
    pub photo_url: Option<String>,
    pub owner_email: String,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl From<Complaint> for ComplaintView {
    fn from(value: Complaint) -> Self {
        Self {
            id: value.id.to_string(),
            title: value.title,
            description: value.description,
            category: value.category,
            location: value.location,
            status: value.status.as_str().to_string(),
            priority: value.priority.as_str().to_string(),
            upvotes: value.upvotes,
            photo_url: value.photo_url,
            owner_email: value.owner_email,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Count of complaints per status token.
pub type StatusSummary = BTreeMap<String, u64>;

/// Machine-readable error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// `validation_error|not_found|storage_error`.
    pub code: String,
    /// Human-readable description.
    pub message: String,
    /// HTTP status class a transport should answer with.
    pub status: u16,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Validation, message)
    }

    pub fn with_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        let (code, status) = match kind {
            ErrorKind::Validation => ("validation_error", 400),
            ErrorKind::NotFound => ("not_found", 404),
            ErrorKind::Storage => ("storage_error", 500),
        };
        Self {
            code: code.to_string(),
            message: message.into(),
            status,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

impl From<ComplaintServiceError> for ApiError {
    fn from(value: ComplaintServiceError) -> Self {
        Self::with_kind(value.kind(), value.to_string())
    }
}

impl From<PhotoStoreError> for ApiError {
    fn from(value: PhotoStoreError) -> Self {
        match value {
            PhotoStoreError::EmptyUpload => Self::validation(value.to_string()),
            PhotoStoreError::Io(_) => Self::with_kind(ErrorKind::Storage, value.to_string()),
        }
    }
}

/// Envelope returned by every API call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: ApiError) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

impl<T> From<Result<T, ApiError>> for ApiResponse<T> {
    fn from(value: Result<T, ApiError>) -> Self {
        match value {
            Ok(data) => Self::success(data),
            Err(error) => Self::failure(error),
        }
    }
}
