//! Transport-neutral API over the complaint core.
//!
//! Every call returns an [`ApiResponse`] envelope and never panics, so HTTP,
//! CLI, or desktop shells can forward results without their own error mapping.

mod api;
pub mod view;

pub use api::{ApiConfig, ComplaintApi, CreateComplaintRequest, PhotoUpload};
pub use view::{ApiError, ApiResponse, ComplaintView, StatusSummary};

use complaint_core::{core_version as core_version_inner, init_logging as init_logging_inner};

/// Expose core crate version to transport layers.
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// Returns an empty string on success and the error message on failure.
/// Repeating a call with the same arguments is a no-op.
pub fn init_logging(level: &str, log_dir: &str) -> String {
    match init_logging_inner(level, log_dir) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}
