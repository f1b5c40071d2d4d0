//! # Boardkeeper Common
//!
//! Foundational pieces shared by the Boardkeeper crates.
//!
//! ## Modules
//!
//! - [`error`] - Severity classification implemented by every crate's error type
//! - [`logging`] - Tracing subscriber setup and the [`Pretty`] log formatter
//! - [`fs`] - Atomic writes and path containment checks
//! - [`slug`] - Filesystem-safe slug derivation

pub mod error;
pub mod fs;
pub mod logging;
pub mod slug;

pub use error::{ErrorSeverity, Severity};
pub use fs::{atomic_write, is_within, normalize_lexically};
pub use logging::{init_tracing, Pretty, DEFAULT_LOG_FILTER};
pub use slug::slugify;
