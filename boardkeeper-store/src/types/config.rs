//! Per-board configuration: status columns, id counter, board context

use boardkeeper_config::{ColumnSpec, EngineConfig};
use serde::{Deserialize, Serialize};

/// A workflow stage shown by consumers; task statuses are not checked against it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub key: String,
    pub title: String,
}

impl Column {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
        }
    }
}

impl From<&ColumnSpec> for Column {
    fn from(spec: &ColumnSpec) -> Self {
        Self::new(spec.key.trim(), spec.title.trim())
    }
}

/// Free-form metadata describing what a board is for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardContext {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scope: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub release: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl BoardContext {
    /// Trim every field and drop blank owners
    pub fn normalized(self) -> Self {
        Self {
            scope: self.scope.trim().to_string(),
            owners: self
                .owners
                .iter()
                .map(|o| o.trim())
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            release: self.release.trim().to_string(),
            target: self.target.trim().to_string(),
            notes: self.notes.trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Contents of `boards/<id>/config.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Next sequential number to hand out
    #[serde(default = "first_id")]
    pub next_id: u64,
    #[serde(default, skip_serializing_if = "BoardContext::is_empty")]
    pub context: BoardContext,
}

fn first_id() -> u64 {
    1
}

impl BoardConfig {
    /// Fresh config seeded with the engine's default columns
    pub fn from_engine(engine: &EngineConfig) -> Self {
        Self {
            columns: engine.default_columns.iter().map(Column::from).collect(),
            next_id: first_id(),
            context: BoardContext::default(),
        }
    }

    /// Status given to tasks created without one
    pub fn default_status(&self) -> &str {
        self.columns
            .first()
            .map(|c| c.key.as_str())
            .unwrap_or("todo")
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::from_engine(&EngineConfig::default())
    }
}
