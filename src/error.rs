use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, InstallerError>;

#[derive(Error, Debug)]
pub enum InstallerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Manifest unavailable: {reason}")]
    ManifestUnavailable { reason: String },

    #[error("Manifest malformed: {reason}")]
    ManifestMalformed { reason: String },

    #[error("No archive found for '{base_url}' (tried .zip and .rar)")]
    FormatUnavailable { base_url: String },

    #[error("Download failed: {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Extraction failed: {path}: {reason}")]
    ExtractionFailed { path: PathBuf, reason: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Invalid selection: {input}")]
    InvalidSelection { input: String },

    #[error("Operation cancelled")]
    Cancelled,
}

impl InstallerError {
    /// Process exit code for the stage that failed.
    pub fn exit_code(&self) -> i32 {
        match self {
            InstallerError::ManifestUnavailable { .. }
            | InstallerError::ManifestMalformed { .. } => 1,
            InstallerError::FormatUnavailable { .. } => 2,
            InstallerError::DownloadFailed { .. } => 3,
            InstallerError::ExtractionFailed { .. } => 4,
            _ => 1,
        }
    }

    pub fn manifest_unavailable<S: Into<String>>(reason: S) -> Self {
        InstallerError::ManifestUnavailable {
            reason: reason.into(),
        }
    }

    pub fn manifest_malformed<S: Into<String>>(reason: S) -> Self {
        InstallerError::ManifestMalformed {
            reason: reason.into(),
        }
    }

    pub fn download_failed<S: Into<String>, R: Into<String>>(url: S, reason: R) -> Self {
        InstallerError::DownloadFailed {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn extraction_failed<R: Into<String>>(path: &std::path::Path, reason: R) -> Self {
        InstallerError::ExtractionFailed {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
