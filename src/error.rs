use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures surfaced by [`Installer::install`](crate::Installer::install).
///
/// A project without an `Assets` directory is not an error for the query
/// side, it only becomes [`InstallError::InvalidProject`] when `install`
/// is called on it anyway.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("project missing assets directory: {project:?}")]
    InvalidProject { project: PathBuf },

    #[error("bundled resource not found: {key}")]
    MissingResource { key: String },

    #[error("file already exists: {path:?}")]
    FileConflict { path: PathBuf },

    #[error("invalid layout file {path:?}: {source}")]
    InvalidLayout {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("layout {field} entry {value:?} must be a single file or directory name")]
    UnsafeLayoutEntry { field: &'static str, value: String },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InstallError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        InstallError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Caller contract violations, bad layouts and packaging defects.
    /// Retrying will not help.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            InstallError::InvalidProject { .. }
                | InstallError::MissingResource { .. }
                | InstallError::InvalidLayout { .. }
                | InstallError::UnsafeLayoutEntry { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, InstallError>;
