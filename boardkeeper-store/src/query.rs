//! In-memory filtering and sorting of loaded tasks

use crate::types::{normalize_status, Task};
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Field to order query results by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Id,
    Title,
    Status,
    Priority,
    Created,
}

/// How tag filters combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagMatch {
    /// At least one listed tag must be present
    #[default]
    Any,
    /// Every listed tag must be present
    All,
}

/// Filter and sort options for a task listing
///
/// All filters are optional and combine with AND. Tasks without a created
/// date never match a date range.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub status: Option<String>,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub tag_match: TagMatch,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
    pub sort: SortKey,
    pub descending: bool,
}

impl TaskQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Case-insensitive substring match on the title
    pub fn title_contains(mut self, text: impl Into<String>) -> Self {
        self.title = Some(text.into());
        self
    }

    pub fn any_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self.tag_match = TagMatch::Any;
        self
    }

    pub fn all_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self.tag_match = TagMatch::All;
        self
    }

    /// Inclusive created-date bounds; either side may be open
    pub fn created_between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.created_from = from;
        self.created_to = to;
        self
    }

    pub fn sort_by(mut self, key: SortKey) -> Self {
        self.sort = key;
        self
    }

    pub fn descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    /// Whether a single task passes every filter
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = &self.status {
            if normalize_status(status) != normalize_status(&task.status) {
                return false;
            }
        }

        if let Some(text) = &self.title {
            let needle = text.trim().to_lowercase();
            if !needle.is_empty() && !task.title.to_lowercase().contains(&needle) {
                return false;
            }
        }

        let wanted: Vec<String> = self
            .tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if !wanted.is_empty() {
            let has = |tag: &String| task.tags.iter().any(|t| t.to_lowercase() == *tag);
            let ok = match self.tag_match {
                TagMatch::Any => wanted.iter().any(has),
                TagMatch::All => wanted.iter().all(has),
            };
            if !ok {
                return false;
            }
        }

        if self.created_from.is_some() || self.created_to.is_some() {
            let Some(created) = task.created else {
                return false;
            };
            if self.created_from.is_some_and(|from| created < from)
                || self.created_to.is_some_and(|to| created > to)
            {
                return false;
            }
        }

        true
    }

    /// Filter and sort a loaded slice, returning owned copies
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        let mut out: Vec<Task> = tasks.iter().filter(|t| self.matches(t)).cloned().collect();
        out.sort_by(|a, b| {
            let ordering = self.compare(a, b);
            if self.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
        out
    }

    /// Primary key comparison with id as the tie-breaker
    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let primary = match self.sort {
            SortKey::Id => Ordering::Equal,
            SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortKey::Status => normalize_status(&a.status).cmp(&normalize_status(&b.status)),
            SortKey::Priority => a.priority.cmp(&b.priority),
            SortKey::Created => a.created.cmp(&b.created),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn tasks() -> Vec<Task> {
        vec![
            Task::new("Write parser")
                .with_id("T-000001")
                .with_status("todo")
                .with_priority(1)
                .with_tags(["Backend", "parser"])
                .with_created(date(1)),
            Task::new("Design UI")
                .with_id("T-000002")
                .with_status("In Progress")
                .with_priority(3)
                .with_tags(["ui"])
                .with_created(date(5)),
            Task::new("write docs")
                .with_id("T-000003")
                .with_status("done")
                .with_priority(2)
                .with_tags(["docs", "backend"])
                .with_created(date(10)),
            Task::new("Undated").with_id("T-000004").with_status("todo"),
        ]
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_empty_query_sorts_by_id() {
        let mut input = tasks();
        input.reverse();
        let out = TaskQuery::new().apply(&input);
        assert_eq!(ids(&out), vec!["T-000001", "T-000002", "T-000003", "T-000004"]);
    }

    #[test]
    fn test_status_filter_normalizes() {
        let out = TaskQuery::new().status("in-progress").apply(&tasks());
        assert_eq!(ids(&out), vec!["T-000002"]);
    }

    #[test]
    fn test_title_substring_is_case_insensitive() {
        let out = TaskQuery::new().title_contains("WRITE").apply(&tasks());
        assert_eq!(ids(&out), vec!["T-000001", "T-000003"]);
    }

    #[test]
    fn test_tag_any_and_all() {
        let any = TaskQuery::new().any_tags(["BACKEND", "ui"]).apply(&tasks());
        assert_eq!(ids(&any), vec!["T-000001", "T-000002", "T-000003"]);

        let all = TaskQuery::new().all_tags(["backend", "docs"]).apply(&tasks());
        assert_eq!(ids(&all), vec!["T-000003"]);
    }

    #[test]
    fn test_created_range_is_inclusive() {
        let out = TaskQuery::new()
            .created_between(Some(date(5)), Some(date(10)))
            .apply(&tasks());
        assert_eq!(ids(&out), vec!["T-000002", "T-000003"]);

        let open_start = TaskQuery::new()
            .created_between(None, Some(date(1)))
            .apply(&tasks());
        assert_eq!(ids(&open_start), vec!["T-000001"]);
    }

    #[test]
    fn test_sort_priority_descending() {
        let out = TaskQuery::new()
            .sort_by(SortKey::Priority)
            .descending(true)
            .apply(&tasks());
        assert_eq!(ids(&out)[0], "T-000002");
    }

    #[test]
    fn test_sort_title_ignores_case() {
        let out = TaskQuery::new().sort_by(SortKey::Title).apply(&tasks());
        assert_eq!(ids(&out), vec!["T-000002", "T-000004", "T-000003", "T-000001"]);
    }
}
