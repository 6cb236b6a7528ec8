//! Runtime configuration for complaint core consumers.
//!
//! Values start from built-in defaults and may be overridden by `CIVIC_*`
//! environment variables. Blank variables are ignored.

use crate::logging::default_log_level;
use crate::model::user::DEFAULT_OWNER_EMAIL;
use crate::service::transition::StatusTransitionPolicy;
use log::warn;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "CIVIC_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "CIVIC_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CIVIC_LOG_DIR";
pub const ENV_DEFAULT_OWNER_EMAIL: &str = "CIVIC_DEFAULT_OWNER_EMAIL";
pub const ENV_STATUS_POLICY: &str = "CIVIC_STATUS_POLICY";
pub const ENV_PHOTO_DIR: &str = "CIVIC_PHOTO_DIR";

const DB_FILE_NAME: &str = "civic_complaints.sqlite3";
const PHOTO_DIR_NAME: &str = "civic_complaints_uploads";
/// Prefix of references returned for stored photos.
pub const PHOTO_PUBLIC_PREFIX: &str = "/uploads";

/// Effective settings for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Logging stays disabled when unset.
    pub log_dir: Option<PathBuf>,
    pub default_owner_email: String,
    pub status_policy: StatusTransitionPolicy,
    pub photo_dir: PathBuf,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let temp = std::env::temp_dir();
        Self {
            db_path: temp.join(DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            default_owner_email: DEFAULT_OWNER_EMAIL.to_string(),
            status_policy: StatusTransitionPolicy::default(),
            photo_dir: temp.join(PHOTO_DIR_NAME),
        }
    }
}

impl CoreConfig {
    /// Builds configuration from defaults plus process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from defaults plus an arbitrary key lookup.
    ///
    /// An unrecognized policy value keeps the default and logs a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = value(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = value(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = value(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(email) = value(ENV_DEFAULT_OWNER_EMAIL) {
            config.default_owner_email = email.to_ascii_lowercase();
        }
        if let Some(raw) = value(ENV_STATUS_POLICY) {
            match StatusTransitionPolicy::parse(&raw) {
                Some(policy) => config.status_policy = policy,
                None => warn!(
                    "event=config_load module=config status=ignored key={ENV_STATUS_POLICY} value={raw}"
                ),
            }
        }
        if let Some(dir) = value(ENV_PHOTO_DIR) {
            config.photo_dir = PathBuf::from(dir);
        }
        config
    }
}
