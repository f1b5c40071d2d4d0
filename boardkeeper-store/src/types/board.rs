//! Board-level types: Board, BoardRegistry, BoardPaths

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A board entry in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub name: String,
    /// Directory relative to the storage root (`boards/<id>`)
    pub path: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<NaiveDate>,
}

impl Board {
    /// Create a board entry living under `boards/<id>`
    pub fn new(id: impl Into<String>, name: impl Into<String>, created: NaiveDate) -> Self {
        let id = id.into();
        Self {
            path: format!("boards/{id}"),
            id,
            name: name.into(),
            archived: false,
            created: Some(created),
        }
    }
}

/// The cross-board registry file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardRegistry {
    pub active: String,
    #[serde(default)]
    pub boards: Vec<Board>,
}

impl BoardRegistry {
    /// A registry holding exactly one board, which is active
    pub fn single(board: Board) -> Self {
        Self {
            active: board.id.clone(),
            boards: vec![board],
        }
    }

    pub fn find(&self, id: &str) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Board> {
        self.boards.iter_mut().find(|b| b.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// First non-archived board other than `excluding`, else any other board
    pub fn fallback_active(&self, excluding: &str) -> Option<&str> {
        self.boards
            .iter()
            .find(|b| b.id != excluding && !b.archived)
            .or_else(|| self.boards.iter().find(|b| b.id != excluding))
            .map(|b| b.id.as_str())
    }

    /// Point `active` somewhere valid if it no longer references a board
    ///
    /// Returns true when `active` changed.
    pub fn repair_active(&mut self) -> bool {
        if self.contains(&self.active) {
            return false;
        }
        let replacement = self
            .boards
            .iter()
            .find(|b| !b.archived)
            .or_else(|| self.boards.first())
            .map(|b| b.id.clone());
        match replacement {
            Some(id) => {
                self.active = id;
                true
            }
            None => false,
        }
    }
}

/// Resolved filesystem locations for one board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardPaths {
    pub root: PathBuf,
    pub tasks_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub config_path: PathBuf,
}

impl BoardPaths {
    /// Layout under a board directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            tasks_dir: root.join("tasks"),
            archive_dir: root.join("archive").join("tasks"),
            config_path: root.join("config.yaml"),
            root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn registry() -> BoardRegistry {
        let mut archived = Board::new("old", "Old", date());
        archived.archived = true;
        BoardRegistry {
            active: "default".into(),
            boards: vec![
                Board::new("default", "Default", date()),
                archived,
                Board::new("work", "Work", date()),
            ],
        }
    }

    #[test]
    fn test_board_path() {
        assert_eq!(Board::new("work", "Work", date()).path, "boards/work");
    }

    #[test]
    fn test_fallback_prefers_non_archived() {
        let reg = registry();
        assert_eq!(reg.fallback_active("default"), Some("work"));
    }

    #[test]
    fn test_fallback_uses_archived_when_nothing_else() {
        let mut reg = registry();
        reg.boards.retain(|b| b.id != "work");
        assert_eq!(reg.fallback_active("default"), Some("old"));

        reg.boards.retain(|b| b.id == "default");
        assert_eq!(reg.fallback_active("default"), None);
    }

    #[test]
    fn test_repair_active() {
        let mut reg = registry();
        assert!(!reg.repair_active());

        reg.active = "ghost".into();
        assert!(reg.repair_active());
        assert_eq!(reg.active, "default");
    }

    #[test]
    fn test_board_paths() {
        let paths = BoardPaths::new("/store/boards/work");
        assert_eq!(paths.tasks_dir, PathBuf::from("/store/boards/work/tasks"));
        assert_eq!(
            paths.archive_dir,
            PathBuf::from("/store/boards/work/archive/tasks")
        );
        assert_eq!(
            paths.config_path,
            PathBuf::from("/store/boards/work/config.yaml")
        );
    }

    #[test]
    fn test_registry_yaml_shape() {
        let reg = BoardRegistry::single(Board::new("default", "Default", date()));
        let yaml = serde_yaml_ng::to_string(&reg).unwrap();
        assert!(yaml.contains("active: default"));
        assert!(yaml.contains("path: boards/default"));
        assert!(yaml.contains("created: 2024-05-01"));
    }
}
