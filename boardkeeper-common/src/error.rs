//! Severity classification shared by Boardkeeper error types
//!
//! Each crate defines its own `thiserror` enum; this module only supplies the
//! common vocabulary callers use to decide how loudly to report a failure.

/// Severity levels for error classification
///
/// - **Warning**: expected or benign. Callers may suppress it (an aborted
///   refresh, for example).
/// - **Error**: the requested operation failed; the store is intact and other
///   operations can proceed.
/// - **Critical**: the store itself looks damaged or inconsistent and needs
///   attention before further writes.
///
/// # Examples
///
/// ```rust
/// use boardkeeper_common::ErrorSeverity;
///
/// let canceled = ErrorSeverity::Warning;
/// assert!(canceled < ErrorSeverity::Critical);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Potential issue but nothing was lost
    Warning,
    /// Operation failed but the system can continue
    Error,
    /// Store integrity is in question
    Critical,
}

impl ErrorSeverity {
    /// Whether a caller should surface this to the user as a failure
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Warning)
    }
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Trait for error types that have severity levels
///
/// ```rust
/// use boardkeeper_common::{ErrorSeverity, Severity};
///
/// #[derive(Debug)]
/// enum MyError {
///     Corrupted,
///     Missing,
///     Aborted,
/// }
///
/// impl Severity for MyError {
///     fn severity(&self) -> ErrorSeverity {
///         match self {
///             MyError::Corrupted => ErrorSeverity::Critical,
///             MyError::Missing => ErrorSeverity::Error,
///             MyError::Aborted => ErrorSeverity::Warning,
///         }
///     }
/// }
///
/// assert_eq!(MyError::Aborted.severity(), ErrorSeverity::Warning);
/// ```
pub trait Severity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
    }

    #[test]
    fn test_is_fatal() {
        assert!(!ErrorSeverity::Warning.is_fatal());
        assert!(ErrorSeverity::Error.is_fatal());
        assert!(ErrorSeverity::Critical.is_fatal());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorSeverity::Critical.to_string(), "critical");
    }
}
