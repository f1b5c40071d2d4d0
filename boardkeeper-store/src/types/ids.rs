//! Identifier syntax checks
//!
//! Task and board identifiers become file and directory names, so anything
//! that could address another location is rejected up front.

use crate::error::{Result, StoreError};

/// Whether `id` can be used verbatim as a single path component
fn is_safe_component(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && !id
            .chars()
            .any(|c| c == '/' || c == '\\' || c == ':' || c.is_whitespace() || c.is_control())
}

/// Validate a task identifier (`T-000001`, or any caller-chosen safe token)
pub fn validate_task_id(id: &str) -> Result<()> {
    if is_safe_component(id) {
        Ok(())
    } else {
        Err(StoreError::InvalidId { id: id.to_string() })
    }
}

/// Validate a board identifier
pub fn validate_board_id(id: &str) -> Result<()> {
    if is_safe_component(id) {
        Ok(())
    } else {
        Err(StoreError::InvalidBoardId { id: id.to_string() })
    }
}

/// Generate a fresh UID for a task
pub fn new_uid() -> String {
    ulid::Ulid::new().to_string()
}
