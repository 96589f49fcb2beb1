//! Error types shared by filesystem, clipboard and prompt operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by filesystem and clipboard operations.
#[derive(Debug, Error)]
pub enum FsError {
    /// Path does not exist.
    #[error("Not found: {path}")]
    NotFound { path: PathBuf },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Destination already exists.
    #[error("Already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// Caller supplied an unusable value (empty name, bad separator, ...).
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// User aborted the operation from a prompt.
    #[error("Cancelled")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

/// Fieldless discriminant of [`FsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    AlreadyExists,
    InvalidInput,
    Cancelled,
    Other,
}

impl FsError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create an invalid input error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an uncategorised error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// The taxonomy bucket this error falls into.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Io { .. } | Self::Other { .. } => ErrorKind::Other,
        }
    }
}

/// Result alias for filesystem operations.
pub type FsResult<T> = Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mapping() {
        let err = FsError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, FsError::PermissionDenied { .. }));

        let err = FsError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::AlreadyExists, "exists"),
        );
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        let err = FsError::io("/test/path", std::io::Error::other("boom"));
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(err.to_string().contains("/test/path"));
    }

    #[test]
    fn test_invalid_input_message() {
        let err = FsError::invalid("Name cannot be empty");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "Invalid input: Name cannot be empty");
    }
}
