//! Task type and its normalization helpers

use crate::error::{Result, StoreError};
use boardkeeper_common::slugify;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Index task ids to their recorded status
pub fn status_index<'a, I>(tasks: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .map(|t| (t.id.clone(), t.status.clone()))
        .collect()
}

/// Priority assigned when a task leaves it unset (0)
pub const DEFAULT_PRIORITY: u8 = 2;

/// Normalized statuses that satisfy a dependency
pub const DONE_STATUSES: [&str; 2] = ["done", "archived"];

/// A work item on a board
///
/// The serialized fields form the YAML header of the task file, in this order;
/// `content` is the markdown body. `path`, `board_id` and `board_name` are
/// stamped on after reading and never written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub uid: String,
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub priority: u8,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<NaiveDate>,
    #[serde(default)]
    pub depends_on: Vec<String>,

    #[serde(skip)]
    pub content: String,
    #[serde(skip)]
    pub path: Option<PathBuf>,
    #[serde(skip)]
    pub board_id: Option<String>,
    #[serde(skip)]
    pub board_name: Option<String>,
}

impl Task {
    /// Create an unsaved task; the repository assigns id, uid and created
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            uid: String::new(),
            title: title.into(),
            status: String::new(),
            priority: 0,
            tags: Vec::new(),
            created: None,
            depends_on: Vec::new(),
            content: String::new(),
            path: None,
            board_id: None,
            board_name: None,
        }
    }

    /// Use an explicit id instead of the next sequential one
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_created(mut self, created: NaiveDate) -> Self {
        self.created = Some(created);
        self
    }

    pub fn with_depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Whether this task's status counts as finished for dependents
    pub fn is_done(&self) -> bool {
        is_done_status(&self.status)
    }

    /// Check if every dependency resolves to a task with a done-equivalent status
    ///
    /// `statuses` maps every known task id to its recorded status. Unknown ids
    /// are not ready.
    pub fn is_ready(&self, statuses: &HashMap<String, String>) -> bool {
        self.blocked_by(statuses).is_empty()
    }

    /// Dependencies that keep this task from being ready
    pub fn blocked_by(&self, statuses: &HashMap<String, String>) -> Vec<String> {
        self.depends_on
            .iter()
            .filter(|dep_id| !statuses.get(*dep_id).is_some_and(|s| is_done_status(s)))
            .cloned()
            .collect()
    }

    /// Tasks that list this one as a dependency
    pub fn blocks(&self, all_tasks: &[Task]) -> Vec<String> {
        all_tasks
            .iter()
            .filter(|t| t.depends_on.contains(&self.id))
            .map(|t| t.id.clone())
            .collect()
    }
}

/// Normalize a status into its filesystem-safe token (`In Progress` -> `in-progress`)
pub fn normalize_status(status: &str) -> String {
    slugify(status)
}

/// Whether a status belongs to the done-equivalent set
pub fn is_done_status(status: &str) -> bool {
    let token = normalize_status(status);
    DONE_STATUSES.contains(&token.as_str())
}

/// Map 0 to the default and reject anything outside 1..=3
pub fn normalize_priority(priority: u8) -> Result<u8> {
    match priority {
        0 => Ok(DEFAULT_PRIORITY),
        1..=3 => Ok(priority),
        value => Err(StoreError::InvalidPriority { value }),
    }
}

/// Trim a title, rejecting blank ones
pub fn normalize_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidTitle);
    }
    Ok(trimmed.to_string())
}

/// Trim tags, drop blanks and remove case-insensitive duplicates, keeping
/// the first spelling in its original position
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Trim and deduplicate dependency ids, validating each one's syntax
pub fn normalize_dependencies<S: AsRef<str>>(task_id: &str, deps: &[S]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(deps.len());
    for dep in deps {
        let dep = dep.as_ref().trim();
        if super::ids::validate_task_id(dep).is_err() {
            return Err(StoreError::invalid_dependency(
                task_id,
                format!("malformed dependency id '{dep}'"),
            ));
        }
        if seen.insert(dep.to_string()) {
            out.push(dep.to_string());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, status: &str) -> Task {
        Task::new(format!("Task {id}")).with_id(id).with_status(status)
    }

    #[test]
    fn test_priority_normalization() {
        assert_eq!(normalize_priority(0).unwrap(), 2);
        assert_eq!(normalize_priority(1).unwrap(), 1);
        assert_eq!(normalize_priority(3).unwrap(), 3);
        assert!(matches!(
            normalize_priority(4),
            Err(StoreError::InvalidPriority { value: 4 })
        ));
    }

    #[test]
    fn test_title_normalization() {
        assert_eq!(normalize_title("  Ship it ").unwrap(), "Ship it");
        assert!(matches!(normalize_title(" \t"), Err(StoreError::InvalidTitle)));
    }

    #[test]
    fn test_tag_normalization() {
        let tags = normalize_tags(&[" Backend", "api", "backend ", "", "API", "ui"]);
        assert_eq!(tags, vec!["Backend", "api", "ui"]);
    }

    #[test]
    fn test_dependency_normalization() {
        let deps = normalize_dependencies("T-000003", &["T-000001", " T-000002 ", "T-000001"]).unwrap();
        assert_eq!(deps, vec!["T-000001", "T-000002"]);

        let err = normalize_dependencies("T-000003", &["../T-000001"]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidDependency { .. }));

        let err = normalize_dependencies("T-000003", &[""]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidDependency { .. }));
    }

    #[test]
    fn test_done_statuses() {
        assert!(is_done_status("done"));
        assert!(is_done_status("Done"));
        assert!(is_done_status(" ARCHIVED "));
        assert!(!is_done_status("in-progress"));
        assert!(!is_done_status("done-ish"));
        assert_eq!(normalize_status("In Progress"), "in-progress");
    }

    #[test]
    fn test_readiness() {
        let all = vec![
            task("T-000001", "done"),
            task("T-000002", "doing"),
            task("T-000008", "Archived"),
            task("T-000009", "todo"),
        ];
        let statuses = status_index(&all);

        let waits_on_done = task("T-000003", "todo").with_depends_on(["T-000001"]);
        assert!(waits_on_done.is_ready(&statuses));

        let waits_on_doing = task("T-000004", "todo").with_depends_on(["T-000001", "T-000002"]);
        assert!(!waits_on_doing.is_ready(&statuses));
        assert_eq!(waits_on_doing.blocked_by(&statuses), vec!["T-000002"]);

        let waits_on_archived_status = task("T-000005", "todo").with_depends_on(["T-000008"]);
        assert!(waits_on_archived_status.is_ready(&statuses));

        let waits_on_open = task("T-000010", "todo").with_depends_on(["T-000009"]);
        assert!(!waits_on_open.is_ready(&statuses));

        let waits_on_missing = task("T-000006", "todo").with_depends_on(["T-000404"]);
        assert!(!waits_on_missing.is_ready(&statuses));
        assert_eq!(waits_on_missing.blocked_by(&statuses), vec!["T-000404"]);

        let no_deps = task("T-000007", "todo");
        assert!(no_deps.is_ready(&statuses));
    }

    #[test]
    fn test_blocks() {
        let a = task("T-000001", "todo");
        let b = task("T-000002", "todo").with_depends_on(["T-000001"]);
        let c = task("T-000003", "todo").with_depends_on(["T-000001"]);
        let all = vec![a.clone(), b, c];
        assert_eq!(a.blocks(&all), vec!["T-000002", "T-000003"]);
    }

    #[test]
    fn test_runtime_fields_are_not_serialized() {
        let mut t = task("T-000001", "todo").with_content("body");
        t.board_id = Some("work".into());
        t.path = Some("/tmp/x.md".into());
        let yaml = serde_yaml_ng::to_string(&t).unwrap();
        assert!(!yaml.contains("board_id"));
        assert!(!yaml.contains("path"));
        assert!(!yaml.contains("body"));
        assert!(yaml.starts_with("id: T-000001\nuid:"));
    }
}
