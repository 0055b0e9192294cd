use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors that don't map onto a more specific variant.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The path does not exist.
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The path exists but is not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The path exists but cannot be read.
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// The directory has no entries. Only ever turned into a sentinel line.
    #[error("Directory is empty: {}", .0.display())]
    EmptyDirectory(PathBuf),

    /// The external viewer could not be launched or exited unsuccessfully.
    #[error("External viewer failed: {0}")]
    ExternalProcess(String),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Configuration could not be applied.
    #[error("Config error: {0}")]
    Config(String),

    /// The log file or logger could not be set up.
    #[error("Logging error: {0}")]
    Logging(String),
}

/// Sentinel shown in place of a listing or file that can't be read.
pub const PERMISSION_DENIED_LINE: &str = "PERMISSION DENIED";
/// Sentinel shown in place of an empty directory listing.
pub const EMPTY_DIRECTORY_LINE: &str = "DIRECTORY IS EMPTY";

impl AppError {
    /// Classify an OS error raised while touching `path`.
    pub fn from_io(err: std::io::Error, path: &Path) -> Self {
        match err.kind() {
            ErrorKind::NotFound => AppError::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => AppError::PermissionDenied(path.to_path_buf()),
            ErrorKind::NotADirectory => AppError::NotADirectory(path.to_path_buf()),
            _ => AppError::Io(err),
        }
    }

    /// The display line standing in for this error in the preview pane, if
    /// the error is a benign consequence of browsing.
    pub fn sentinel(&self) -> Option<&'static str> {
        match self {
            AppError::PermissionDenied(_) => Some(PERMISSION_DENIED_LINE),
            AppError::EmptyDirectory(_) => Some(EMPTY_DIRECTORY_LINE),
            _ => None,
        }
    }

    /// Whether a user-initiated move that failed with this error should be
    /// reported and skipped instead of aborting.
    pub fn is_rejected_move(&self) -> bool {
        matches!(
            self,
            AppError::NotFound(_) | AppError::NotADirectory(_) | AppError::PermissionDenied(_)
        )
    }
}
