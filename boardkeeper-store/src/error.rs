//! Error types for the persistence engine

use crate::frontmatter::FrontmatterError;
use boardkeeper_common::{ErrorSeverity, Severity};
use boardkeeper_config::ConfigError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in store operations
///
/// Validation variants are raised before anything is written, so a failed
/// call leaves the files on disk exactly as they were.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Task identifier is empty or not filesystem-safe
    #[error("invalid task id '{id}'")]
    InvalidId { id: String },

    /// Task title is empty or whitespace
    #[error("task title must not be empty")]
    InvalidTitle,

    /// Priority outside 1..=3
    #[error("invalid priority {value}: expected 1-3 (0 for default)")]
    InvalidPriority { value: u8 },

    /// Malformed dependency id or a dependency cycle
    #[error("invalid dependency for {id}: {reason}")]
    InvalidDependency { id: String, reason: String },

    /// Task not found
    #[error("task not found: {id}")]
    TaskNotFound { id: String },

    /// A task with this id already occupies the destination
    #[error("task already exists: {id}")]
    TaskExists { id: String },

    /// Board not found in the registry
    #[error("board not found: {id}")]
    BoardNotFound { id: String },

    /// Board identifier is empty or not filesystem-safe
    #[error("invalid board id '{id}'")]
    InvalidBoardId { id: String },

    /// Board display name is empty
    #[error("board name must not be empty")]
    InvalidBoardName,

    /// Deleting would leave the registry without boards
    #[error("cannot delete board '{id}': it is the last board")]
    BoardDeleteForbidden { id: String },

    /// Expected directory does not exist
    #[error("store not initialized at {path}")]
    StoreNotInitialized { path: PathBuf },

    /// A derived path resolved outside its owning directory
    #[error("path {path} escapes {root}")]
    InvalidPath { path: PathBuf, root: PathBuf },

    /// Registry file decoded but violates its invariants
    #[error("invalid board registry at {path}: {reason}")]
    InvalidRegistry { path: PathBuf, reason: String },

    /// Legacy migration would overwrite existing multi-board data
    #[error("legacy migration refused: {path} already exists")]
    MigrationConflict { path: PathBuf },

    /// Record file could not be split or decoded
    #[error("{path}: {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: FrontmatterError,
    },

    /// YAML document (registry or board config) could not be read or written
    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// Filesystem failure with the operation and path it happened on
    #[error("failed to {op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Engine configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Cooperative cancellation
    #[error("operation canceled")]
    Canceled,
}

impl StoreError {
    /// Build a `map_err` adapter that wraps an I/O error with context
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { op, path, source }
    }

    /// Build a `map_err` adapter that wraps a YAML error with its file
    pub(crate) fn yaml(path: impl Into<PathBuf>) -> impl FnOnce(serde_yaml_ng::Error) -> Self {
        let path = path.into();
        move |source| Self::Yaml { path, source }
    }

    pub(crate) fn invalid_dependency(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDependency {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Whether this is a cooperative abort rather than a failure
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    /// Whether the requested task or board does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TaskNotFound { .. } | Self::BoardNotFound { .. })
    }
}

impl Severity for StoreError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Canceled => ErrorSeverity::Warning,
            Self::InvalidPath { .. }
            | Self::InvalidRegistry { .. }
            | Self::MigrationConflict { .. } => ErrorSeverity::Critical,
            Self::Config(e) => e.severity(),
            _ => ErrorSeverity::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::TaskNotFound {
            id: "T-000001".into(),
        };
        assert_eq!(err.to_string(), "task not found: T-000001");

        let err = StoreError::BoardDeleteForbidden {
            id: "default".into(),
        };
        assert!(err.to_string().contains("last board"));
    }

    #[test]
    fn test_io_context() {
        let err = StoreError::io("read task", "/tmp/x.md")(io::Error::from(io::ErrorKind::NotFound));
        let message = err.to_string();
        assert!(message.starts_with("failed to read task /tmp/x.md"));
    }

    #[test]
    fn test_canceled_is_not_fatal() {
        assert!(StoreError::Canceled.is_canceled());
        assert_eq!(StoreError::Canceled.severity(), ErrorSeverity::Warning);
        assert!(!StoreError::Canceled.severity().is_fatal());
        assert!(StoreError::InvalidTitle.severity().is_fatal());
    }

    #[test]
    fn test_integrity_errors_are_critical() {
        let err = StoreError::InvalidPath {
            path: "/a/../b".into(),
            root: "/a".into(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_not_found_predicate() {
        assert!(StoreError::BoardNotFound { id: "x".into() }.is_not_found());
        assert!(!StoreError::InvalidTitle.is_not_found());
    }
}
