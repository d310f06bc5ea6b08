//! Filesystem storage for scanned documents attached to a clinic visit.
//!
//! Every upload lands in a folder named after the visit date and the
//! patient's full name. The key is recomputed with [`folder_key`] at upload,
//! listing, and download time, so the round trip always resolves to the same
//! folder. Keys and file names from callers are joined through a
//! [`strict_path::PathBoundary`], so a crafted segment can never resolve
//! outside the attachment root.

use std::path::Path;

use chrono::NaiveDate;
use strict_path::{PathBoundary, StrictPath, StrictPathError};
use thiserror::Error;

/// Most files accepted in a single upload request.
pub const MAX_UPLOAD_FILES: usize = 5;

#[derive(Error, Debug)]
pub enum AttachmentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("path rejected: {0}")]
    PathRejected(#[from] StrictPathError),

    #[error("attachment not found: {0}")]
    NotFound(String),

    #[error("too many files in one upload: {0} (limit {MAX_UPLOAD_FILES})")]
    TooManyFiles(usize),
}

/// A named file in an upload request.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// One file fetched back out of a folder.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Deterministic folder key for a visit: the visit date shifted forward one
/// day, formatted `YYYY-MM-DD`, then the patient's full name, no separator.
///
/// The +1-day shift matches the folder names already on disk; changing it
/// would orphan every existing folder.
pub fn folder_key(full_name: &str, visit_date: NaiveDate) -> String {
    let shifted = visit_date.succ_opt().unwrap_or(NaiveDate::MAX);
    format!("{}{}", shifted.format("%Y-%m-%d"), full_name)
}

pub struct AttachmentStore {
    root: PathBoundary,
}

impl AttachmentStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, AttachmentError> {
        let root = PathBoundary::try_new_create(root)?;
        Ok(Self { root })
    }

    fn folder(&self, key: &str) -> Result<StrictPath, AttachmentError> {
        Ok(self.root.strict_join(key)?)
    }

    /// Create-if-absent in one primitive: concurrent first uploads for the
    /// same key may race, and `create_dir_all` answers both with the same
    /// folder.
    pub fn ensure_folder(&self, key: &str) -> Result<StrictPath, AttachmentError> {
        let dir = self.folder(key)?;
        dir.create_dir_all()?;
        Ok(dir)
    }

    /// Store each file under its original name inside the key's folder.
    /// A same-name re-upload overwrites; callers depend on that.
    pub fn upload(&self, key: &str, files: &[UploadFile]) -> Result<(), AttachmentError> {
        if files.len() > MAX_UPLOAD_FILES {
            return Err(AttachmentError::TooManyFiles(files.len()));
        }

        let dir = self.ensure_folder(key)?;
        for file in files {
            let dest = dir.strict_join(&file.name)?;
            dest.write(&file.bytes)?;
        }
        Ok(())
    }

    /// File names currently stored under the key.
    pub fn list(&self, key: &str) -> Result<Vec<String>, AttachmentError> {
        let dir = self.folder(key)?;
        if !dir.is_dir() {
            return Err(AttachmentError::NotFound(key.to_owned()));
        }

        let mut names = Vec::new();
        for entry in dir.read_dir()? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }

    /// Read one stored file back, with a content type guessed from its name.
    pub fn fetch(&self, key: &str, file_name: &str) -> Result<Attachment, AttachmentError> {
        let dir = self.folder(key)?;
        let file = dir.strict_join(file_name)?;
        if !file.is_file() {
            return Err(AttachmentError::NotFound(format!("{key}/{file_name}")));
        }

        let bytes = file.read()?;
        let content_type = mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .to_string();

        Ok(Attachment {
            name: file_name.to_owned(),
            content_type,
            bytes,
        })
    }
}
