//! Core domain logic for civic complaint tracking.
//! This crate is the single source of truth for complaint lifecycle rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod media;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use media::{DirectoryPhotoStore, PhotoStore, PhotoStoreError};
pub use model::complaint::{
    now_epoch_ms, Complaint, ComplaintId, ComplaintPriority, ComplaintStatus,
    ComplaintValidationError,
};
pub use model::user::{User, UserId, DEFAULT_OWNER_EMAIL};
pub use repo::complaint_repo::{ComplaintStore, RepoError, RepoResult, SqliteComplaintRepository};
pub use repo::user_repo::{SqliteUserRepository, UserDirectory};
pub use service::complaint_service::{
    ComplaintService, ComplaintServiceError, ErrorKind, NewComplaint, ServiceResult,
};
pub use service::transition::StatusTransitionPolicy;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
