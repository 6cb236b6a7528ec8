//! Photo storage collaborator.
//!
//! # Responsibility
//! - Turn raw uploaded bytes into a retrievable reference string.
//!
//! # Invariants
//! - File contents are never inspected or validated.
//! - Stored file names are generated; caller-supplied names only contribute
//!   a sanitized extension.

use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const MAX_EXTENSION_CHARS: usize = 8;

/// Failure while persisting an uploaded photo.
#[derive(Debug)]
pub enum PhotoStoreError {
    /// Upload carried no bytes.
    EmptyUpload,
    /// Filesystem failure.
    Io(std::io::Error),
}

impl Display for PhotoStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUpload => write!(f, "photo upload is empty"),
            Self::Io(err) => write!(f, "photo storage failed: {err}"),
        }
    }
}

impl Error for PhotoStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyUpload => None,
            Self::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for PhotoStoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Contract for the photo storage provider.
pub trait PhotoStore {
    /// Stores `bytes` and returns the reference to attach as `photo_url`.
    fn store_photo(&self, original_name: Option<&str>, bytes: &[u8])
        -> Result<String, PhotoStoreError>;
}

/// Stores photos as files under one directory.
#[derive(Debug, Clone)]
pub struct DirectoryPhotoStore {
    root: PathBuf,
    public_prefix: String,
}

impl DirectoryPhotoStore {
    /// `public_prefix` is prepended to the generated file name, e.g. `/uploads`.
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl PhotoStore for DirectoryPhotoStore {
    fn store_photo(
        &self,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<String, PhotoStoreError> {
        if bytes.is_empty() {
            return Err(PhotoStoreError::EmptyUpload);
        }

        let file_name = match original_name.and_then(sanitized_extension) {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };

        let write_result = std::fs::create_dir_all(&self.root)
            .and_then(|()| std::fs::write(self.root.join(&file_name), bytes));
        if let Err(err) = write_result {
            error!(
                "event=photo_store module=media status=error error_code=photo_write_failed error={err}"
            );
            return Err(err.into());
        }

        info!(
            "event=photo_store module=media status=ok size_bytes={}",
            bytes.len()
        );
        Ok(format!("{}/{file_name}", self.public_prefix))
    }
}

fn sanitized_extension(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    if ext.is_empty()
        || ext.chars().count() > MAX_EXTENSION_CHARS
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
