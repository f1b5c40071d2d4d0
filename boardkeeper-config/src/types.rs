//! Configuration types

use crate::error::{ConfigError, ConfigResult};
use boardkeeper_common::DEFAULT_LOG_FILTER;
use serde::{Deserialize, Serialize};

/// Widest sequential number the ID token may be padded to
const MAX_ID_WIDTH: usize = 12;

/// A status column written into a freshly scaffolded board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub key: String,
    pub title: String,
}

impl ColumnSpec {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
        }
    }
}

/// Engine-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Prefix of sequential task IDs (`T-` in `T-000001`)
    pub id_prefix: String,
    /// Zero-padded width of the numeric part
    pub id_width: usize,
    /// Columns written into the config of every new board
    pub default_columns: Vec<ColumnSpec>,
    /// Tracing filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            id_prefix: "T-".to_string(),
            id_width: 6,
            default_columns: vec![
                ColumnSpec::new("todo", "To Do"),
                ColumnSpec::new("in-progress", "In Progress"),
                ColumnSpec::new("done", "Done"),
            ],
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl EngineConfig {
    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        if self.id_prefix.trim().is_empty() {
            return Err(ConfigError::invalid_value("id_prefix", "must not be empty"));
        }
        if self
            .id_prefix
            .chars()
            .any(|c| c == '/' || c == '\\' || c == '.' || c.is_whitespace() || c.is_control())
        {
            return Err(ConfigError::invalid_value(
                "id_prefix",
                format!("'{}' is not filesystem-safe", self.id_prefix),
            ));
        }
        if self.id_width == 0 || self.id_width > MAX_ID_WIDTH {
            return Err(ConfigError::invalid_value(
                "id_width",
                format!("must be between 1 and {MAX_ID_WIDTH}"),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for column in &self.default_columns {
            let key = column.key.trim();
            if key.is_empty() {
                return Err(ConfigError::invalid_value(
                    "default_columns",
                    "column key must not be empty",
                ));
            }
            if !seen.insert(key.to_lowercase()) {
                return Err(ConfigError::invalid_value(
                    "default_columns",
                    format!("duplicate column key '{key}'"),
                ));
            }
        }
        Ok(())
    }

    /// Format a sequence number as a task ID token
    pub fn format_task_id(&self, number: u64) -> String {
        format!("{}{:0width$}", self.id_prefix, number, width = self.id_width)
    }

    /// Extract the sequence number from a task ID token, if it has this shape
    ///
    /// Numbers wider than `id_width` are accepted so a board keeps counting
    /// past the padded range.
    pub fn parse_task_number(&self, id: &str) -> Option<u64> {
        let digits = id.strip_prefix(&self.id_prefix)?;
        if digits.len() < self.id_width || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}
