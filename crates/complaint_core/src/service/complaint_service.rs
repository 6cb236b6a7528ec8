//! Complaint lifecycle engine.
//!
//! # Responsibility
//! - Validate and normalize raw caller input into complaint records.
//! - Gate every mutation (status change, upvote) before it reaches the store.
//! - Resolve reporters through the identity directory.
//!
//! # Invariants
//! - Validation always completes before any store mutation; a rejected call
//!   leaves storage untouched.
//! - New complaints start `PENDING` with `0` upvotes.
//! - An upvote adds exactly one, atomically in storage.
//! - Log events carry ids and vocabulary tokens only, never free text.

use crate::model::complaint::{
    now_epoch_ms, Complaint, ComplaintId, ComplaintPriority, ComplaintStatus,
    ComplaintValidationError,
};
use crate::model::user::{normalize_email, User, DEFAULT_OWNER_EMAIL, DEFAULT_OWNER_NAME};
use crate::repo::complaint_repo::{ComplaintStore, RepoError};
use crate::repo::user_repo::UserDirectory;
use crate::service::transition::StatusTransitionPolicy;
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Coarse error class used by transport layers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-fixable input problem.
    Validation,
    /// Target record does not exist.
    NotFound,
    /// Persistence failure.
    Storage,
}

/// Service error for complaint use-cases.
#[derive(Debug)]
pub enum ComplaintServiceError {
    /// Blank field or unrecognized vocabulary token.
    Validation(ComplaintValidationError),
    /// Target complaint does not exist.
    NotFound(ComplaintId),
    /// Status move refused by the active transition policy.
    TransitionRejected {
        from: ComplaintStatus,
        to: ComplaintStatus,
    },
    /// Persistence-layer failure.
    Storage(RepoError),
}

impl ComplaintServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::TransitionRejected { .. } => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl Display for ComplaintServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "complaint not found: {id}"),
            Self::TransitionRejected { from, to } => {
                write!(f, "status transition {from} -> {to} is not allowed")
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ComplaintServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ComplaintValidationError> for ComplaintServiceError {
    fn from(value: ComplaintValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ComplaintServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Storage(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ComplaintServiceError>;

/// Raw creation input as received from a transport layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    /// Case-insensitive `LOW|MEDIUM|HIGH`; absent means `MEDIUM`.
    pub priority: Option<String>,
    /// Reference already produced by the photo store.
    pub photo_url: Option<String>,
    /// Reporter email; absent or blank falls back to the default owner.
    pub owner_email: Option<String>,
}

/// Lifecycle engine over a complaint store and an identity directory.
pub struct ComplaintService<S: ComplaintStore, U: UserDirectory> {
    store: S,
    users: U,
    policy: StatusTransitionPolicy,
    default_owner_email: String,
}

impl<S: ComplaintStore, U: UserDirectory> ComplaintService<S, U> {
    /// Creates a service with the unrestricted transition policy and the
    /// built-in default owner.
    pub fn new(store: S, users: U) -> Self {
        Self {
            store,
            users,
            policy: StatusTransitionPolicy::default(),
            default_owner_email: DEFAULT_OWNER_EMAIL.to_string(),
        }
    }

    pub fn with_policy(mut self, policy: StatusTransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Overrides the fallback reporter; blank input keeps the current one.
    pub fn with_default_owner(mut self, email: &str) -> Self {
        if let Some(email) = normalize_email(email) {
            self.default_owner_email = email;
        }
        self
    }

    pub fn policy(&self) -> StatusTransitionPolicy {
        self.policy
    }

    /// Validates input and files a new complaint.
    ///
    /// # Contract
    /// - Rejects blank `title|description|category|location`.
    /// - Rejects unknown priority tokens; absent priority means `MEDIUM`.
    /// - Resolves the reporter only after field validation succeeds.
    /// - Returns the stored record with `PENDING` status and `0` upvotes.
    pub fn create(&self, request: NewComplaint) -> ServiceResult<Complaint> {
        let validated = validate_new_complaint(&request).inspect_err(|err| {
            warn!("event=complaint_create module=service status=rejected error={err}");
        })?;

        let owner = self.resolve_owner(request.owner_email.as_deref())?;

        let mut complaint = Complaint::new(
            validated.title,
            validated.description,
            validated.category,
            validated.location,
            owner.email,
        );
        complaint.priority = validated.priority;
        complaint.photo_url = validated.photo_url;
        complaint.owner_id = Some(owner.id);
        let now = now_epoch_ms();
        complaint.created_at = now;
        complaint.updated_at = now;

        let saved = self.store.save(&complaint)?;
        info!(
            "event=complaint_create module=service status=ok complaint_id={} priority={} has_photo={}",
            saved.id,
            saved.priority,
            saved.photo_url.is_some()
        );
        Ok(saved)
    }

    /// Relabels a complaint's status.
    ///
    /// # Contract
    /// - Unknown status tokens fail with a validation error before lookup.
    /// - Missing `id` fails with `NotFound`.
    /// - The active policy decides whether `current -> target` is allowed.
    pub fn update_status(&self, id: ComplaintId, status_text: &str) -> ServiceResult<Complaint> {
        let target = ComplaintStatus::parse(status_text)?;
        let complaint = self
            .store
            .find_by_id(id)?
            .ok_or(ComplaintServiceError::NotFound(id))?;

        let current = complaint.status;
        if !self.policy.allows(current, target) {
            warn!(
                "event=complaint_status module=service status=rejected complaint_id={id} from={current} to={target} policy={}",
                self.policy
            );
            return Err(ComplaintServiceError::TransitionRejected {
                from: current,
                to: target,
            });
        }

        let saved = self.store.set_status(id, target, now_epoch_ms())?;
        info!(
            "event=complaint_status module=service status=ok complaint_id={id} from={current} to={target}"
        );
        Ok(saved)
    }

    /// Adds one upvote. Repeat upvotes from the same caller are accepted.
    pub fn upvote(&self, id: ComplaintId) -> ServiceResult<Complaint> {
        let updated = self.store.increment_upvotes(id, now_epoch_ms())?;
        info!(
            "event=complaint_upvote module=service status=ok complaint_id={id} upvotes={}",
            updated.upvotes
        );
        Ok(updated)
    }

    /// Gets one complaint by stable ID.
    pub fn get(&self, id: ComplaintId) -> ServiceResult<Option<Complaint>> {
        Ok(self.store.find_by_id(id)?)
    }

    /// Lists every complaint. Order is not part of the contract.
    pub fn list_all(&self) -> ServiceResult<Vec<Complaint>> {
        Ok(self.store.find_all()?)
    }

    /// Lists complaints filed by `owner_email`, or by the default owner when
    /// no email is given. Unknown reporters have no complaints.
    pub fn list_for_owner_email(&self, owner_email: Option<&str>) -> ServiceResult<Vec<Complaint>> {
        let email = owner_email
            .and_then(normalize_email)
            .unwrap_or_else(|| self.default_owner_email.clone());
        match self.users.find_by_email(&email)? {
            Some(user) => Ok(self.store.find_by_owner(user.id)?),
            None => Ok(Vec::new()),
        }
    }

    /// Lists complaints in one status; the token is parsed case-insensitively.
    pub fn list_by_status(&self, status_text: &str) -> ServiceResult<Vec<Complaint>> {
        let status = ComplaintStatus::parse(status_text)?;
        Ok(self.store.find_by_status(status)?)
    }

    /// Lists complaints with an exactly matching category.
    pub fn list_by_category(&self, category: &str) -> ServiceResult<Vec<Complaint>> {
        let category = required_text("category", category)?;
        Ok(self.store.find_by_category(&category)?)
    }

    /// Counts complaints per status for dashboard summaries.
    pub fn status_summary(&self) -> ServiceResult<BTreeMap<ComplaintStatus, u64>> {
        Ok(self.store.count_by_status()?)
    }

    fn resolve_owner(&self, owner_email: Option<&str>) -> ServiceResult<User> {
        match owner_email.and_then(normalize_email) {
            Some(email) => {
                let display_name = email.split('@').next().unwrap_or("User").to_string();
                Ok(self.users.get_or_create(&email, &display_name)?)
            }
            None => Ok(self
                .users
                .get_or_create(&self.default_owner_email, DEFAULT_OWNER_NAME)?),
        }
    }
}

struct ValidatedComplaint {
    title: String,
    description: String,
    category: String,
    location: String,
    priority: ComplaintPriority,
    photo_url: Option<String>,
}

fn validate_new_complaint(
    request: &NewComplaint,
) -> Result<ValidatedComplaint, ComplaintValidationError> {
    Ok(ValidatedComplaint {
        title: required_text("title", &request.title)?,
        description: required_text("description", &request.description)?,
        category: required_text("category", &request.category)?,
        location: required_text("location", &request.location)?,
        priority: ComplaintPriority::resolve(request.priority.as_deref())?,
        photo_url: request
            .photo_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string),
    })
}

fn required_text(field: &'static str, value: &str) -> Result<String, ComplaintValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ComplaintValidationError::BlankField(field));
    }
    Ok(trimmed.to_string())
}
