//! Use-case API consumed by transport layers.
//!
//! # Responsibility
//! - Expose stable, use-case-level calls over the complaint lifecycle.
//! - Translate core errors into machine-readable envelopes.
//!
//! # Invariants
//! - Calls never panic; every failure becomes an `ApiResponse` error.
//! - Each call opens its own connection; no state is shared between calls
//!   apart from configuration.
//! - Photo bytes are stored before the lifecycle engine runs, so the engine
//!   only ever sees a reference.

use crate::view::{ApiError, ApiResponse, ComplaintView, StatusSummary};
use complaint_core::config::PHOTO_PUBLIC_PREFIX;
use complaint_core::db::open_db;
use complaint_core::{
    Complaint, ComplaintId, ComplaintService, CoreConfig, DirectoryPhotoStore, ErrorKind, NewComplaint,
    PhotoStore, RepoError, ServiceResult, SqliteComplaintRepository, SqliteUserRepository,
    StatusTransitionPolicy,
};
use log::error;
use std::path::PathBuf;
use uuid::Uuid;

type SqliteComplaintService<'conn> =
    ComplaintService<SqliteComplaintRepository<'conn>, SqliteUserRepository<'conn>>;

/// Settings the API needs from the process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub db_path: PathBuf,
    pub default_owner_email: String,
    pub status_policy: StatusTransitionPolicy,
    pub photo_dir: PathBuf,
}

impl From<&CoreConfig> for ApiConfig {
    fn from(value: &CoreConfig) -> Self {
        Self {
            db_path: value.db_path.clone(),
            default_owner_email: value.default_owner_email.clone(),
            status_policy: value.status_policy,
            photo_dir: value.photo_dir.clone(),
        }
    }
}

/// Uploaded photo as received by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Raw create request fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateComplaintRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub priority: Option<String>,
    pub owner_email: Option<String>,
    pub photo: Option<PhotoUpload>,
}

/// Complaint API bound to one database and photo directory.
pub struct ComplaintApi {
    config: ApiConfig,
    photos: Box<dyn PhotoStore + Send + Sync>,
}

impl ComplaintApi {
    /// Builds an API that stores photos under `config.photo_dir`.
    pub fn new(config: ApiConfig) -> Self {
        let photos = DirectoryPhotoStore::new(config.photo_dir.clone(), PHOTO_PUBLIC_PREFIX);
        Self::with_photo_store(config, photos)
    }

    /// Builds an API with a caller-provided photo store.
    pub fn with_photo_store(
        config: ApiConfig,
        photos: impl PhotoStore + Send + Sync + 'static,
    ) -> Self {
        Self {
            config,
            photos: Box::new(photos),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Files a complaint, storing an attached photo first.
    pub fn create(&self, request: CreateComplaintRequest) -> ApiResponse<ComplaintView> {
        self.create_complaint(request)
            .map(ComplaintView::from)
            .into()
    }

    /// Fetches one complaint; an unknown id is a `not_found` error.
    pub fn get(&self, id: &str) -> ApiResponse<ComplaintView> {
        let result = parse_complaint_id(id).and_then(|id| {
            self.with_service("complaint_get", |service| service.get(id))?
                .ok_or_else(|| {
                    ApiError::with_kind(ErrorKind::NotFound, format!("complaint not found: {id}"))
                })
        });
        result.map(ComplaintView::from).into()
    }

    pub fn list_all(&self) -> ApiResponse<Vec<ComplaintView>> {
        into_views(self.with_service("complaint_list", |service| service.list_all()))
    }

    /// Lists complaints of `owner_email`, or of the default owner.
    pub fn list_mine(&self, owner_email: Option<&str>) -> ApiResponse<Vec<ComplaintView>> {
        into_views(self.with_service("complaint_list_mine", |service| {
            service.list_for_owner_email(owner_email)
        }))
    }

    pub fn list_by_status(&self, status: &str) -> ApiResponse<Vec<ComplaintView>> {
        into_views(self.with_service("complaint_list_status", |service| {
            service.list_by_status(status)
        }))
    }

    pub fn list_by_category(&self, category: &str) -> ApiResponse<Vec<ComplaintView>> {
        into_views(self.with_service("complaint_list_category", |service| {
            service.list_by_category(category)
        }))
    }

    pub fn update_status(&self, id: &str, status: &str) -> ApiResponse<ComplaintView> {
        let result = parse_complaint_id(id).and_then(|id| {
            self.with_service("complaint_status", |service| service.update_status(id, status))
        });
        result.map(ComplaintView::from).into()
    }

    pub fn upvote(&self, id: &str) -> ApiResponse<ComplaintView> {
        let result = parse_complaint_id(id)
            .and_then(|id| self.with_service("complaint_upvote", |service| service.upvote(id)));
        result.map(ComplaintView::from).into()
    }

    /// Complaint counts keyed by status token.
    pub fn status_summary(&self) -> ApiResponse<StatusSummary> {
        self.with_service("complaint_summary", |service| service.status_summary())
            .map(|counts| {
                counts
                    .into_iter()
                    .map(|(status, count)| (status.as_str().to_string(), count))
                    .collect::<StatusSummary>()
            })
            .into()
    }

    fn create_complaint(&self, request: CreateComplaintRequest) -> Result<Complaint, ApiError> {
        let photo_url = match request.photo {
            Some(upload) => Some(
                self.photos
                    .store_photo(upload.file_name.as_deref(), &upload.bytes)?,
            ),
            None => None,
        };
        let input = NewComplaint {
            title: request.title,
            description: request.description,
            category: request.category,
            location: request.location,
            priority: request.priority,
            photo_url,
            owner_email: request.owner_email,
        };
        self.with_service("complaint_create", |service| service.create(input))
    }

    fn with_service<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&SqliteComplaintService<'_>) -> ServiceResult<T>,
    ) -> Result<T, ApiError> {
        let conn = open_db(&self.config.db_path).map_err(|err| {
            error!("event={operation} module=api status=error error_code=db_open_failed error={err}");
            ApiError::with_kind(ErrorKind::Storage, format!("database open failed: {err}"))
        })?;
        let store = SqliteComplaintRepository::try_new(&conn).map_err(storage_error)?;
        let users = SqliteUserRepository::try_new(&conn).map_err(storage_error)?;
        let service = ComplaintService::new(store, users)
            .with_policy(self.config.status_policy)
            .with_default_owner(&self.config.default_owner_email);

        f(&service).map_err(|err| {
            if err.kind() == ErrorKind::Storage {
                error!("event={operation} module=api status=error error_code=storage error={err}");
            }
            ApiError::from(err)
        })
    }
}

fn parse_complaint_id(raw: &str) -> Result<ComplaintId, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::validation(format!("invalid complaint id `{}`", raw.trim())))
}

fn storage_error(err: RepoError) -> ApiError {
    ApiError::with_kind(ErrorKind::Storage, format!("repository init failed: {err}"))
}

fn into_views(result: Result<Vec<Complaint>, ApiError>) -> ApiResponse<Vec<ComplaintView>> {
    result
        .map(|items| items.into_iter().map(ComplaintView::from).collect::<Vec<_>>())
        .into()
}
