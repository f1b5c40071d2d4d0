//! TaskRepository - file-per-task storage for one board
//!
//! Every task is a markdown file with a YAML header under `tasks/`; archived
//! tasks move, bytes untouched, to `archive/tasks/`. The board's column set,
//! id counter and context live in `config.yaml` next to them.
//!
//! Mutations are serialized per repository instance through an async
//! `RwLock`; reads share it. Writes go through a temp file and rename, so a
//! reader never sees a half-written record.

use crate::cancel::{ensure_active, CancellationToken};
use crate::error::{Result, StoreError};
use crate::frontmatter::{self, Document};
use crate::graph::validate_dependencies;
use crate::types::{
    new_uid, normalize_dependencies, normalize_priority, normalize_tags, normalize_title,
    status_index, validate_task_id, BoardConfig, BoardContext, BoardPaths, Column, Task,
    DEFAULT_PRIORITY,
};
use boardkeeper_common::{atomic_write, is_within};
use boardkeeper_config::EngineConfig;
use chrono::{Local, NaiveDate};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

const TASK_EXTENSION: &str = "md";

/// Board identity stamped onto every task read through a repository
#[derive(Debug, Clone)]
struct BoardLabel {
    id: String,
    name: String,
}

/// Storage for the tasks of a single board
#[derive(Debug)]
pub struct TaskRepository {
    paths: BoardPaths,
    engine: Arc<EngineConfig>,
    board: Option<BoardLabel>,
    lock: RwLock<()>,
}

impl TaskRepository {
    /// Open a repository over the given board layout with default settings
    pub fn new(paths: BoardPaths) -> Self {
        Self {
            paths,
            engine: Arc::new(EngineConfig::default()),
            board: None,
            lock: RwLock::new(()),
        }
    }

    /// Use a loaded engine configuration (id format, default columns)
    pub fn with_config(mut self, engine: Arc<EngineConfig>) -> Self {
        self.engine = engine;
        self
    }

    /// Stamp tasks read from this repository with a board id and name
    pub fn with_board(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.board = Some(BoardLabel {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    pub fn paths(&self) -> &BoardPaths {
        &self.paths
    }

    pub fn board_id(&self) -> Option<&str> {
        self.board.as_ref().map(|b| b.id.as_str())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Create the board's directories and default config if missing
    ///
    /// Idempotent: an existing config is left alone.
    pub async fn init(&self, cancel: &CancellationToken) -> Result<()> {
        let _guard = self.lock.write().await;
        ensure_active(cancel)?;

        for dir in [&self.paths.tasks_dir, &self.paths.archive_dir] {
            fs::create_dir_all(dir)
                .await
                .map_err(StoreError::io("create directory", dir))?;
        }

        if !self.exists(&self.paths.config_path).await? {
            let config = BoardConfig::from_engine(&self.engine);
            self.save_config(cancel, &config).await?;
            tracing::info!(root = %self.paths.root.display(), "initialized board storage");
        }
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All active tasks, ordered by file name
    pub async fn list_all(&self, cancel: &CancellationToken) -> Result<Vec<Task>> {
        let _guard = self.lock.read().await;
        self.read_tasks(cancel, &self.paths.tasks_dir, false).await
    }

    /// All archived tasks; an absent archive is simply empty
    pub async fn list_archived(&self, cancel: &CancellationToken) -> Result<Vec<Task>> {
        let _guard = self.lock.read().await;
        self.read_tasks(cancel, &self.paths.archive_dir, true).await
    }

    /// Fetch one active task
    pub async fn get(&self, cancel: &CancellationToken, id: &str) -> Result<Task> {
        let _guard = self.lock.read().await;
        let path = self.require(cancel, &self.paths.tasks_dir, id).await?;
        self.read_task(cancel, &path).await
    }

    /// Fetch one archived task
    pub async fn get_archived(&self, cancel: &CancellationToken, id: &str) -> Result<Task> {
        let _guard = self.lock.read().await;
        let path = self.require(cancel, &self.paths.archive_dir, id).await?;
        self.read_task(cancel, &path).await
    }

    /// Active tasks whose every dependency is satisfied
    ///
    /// A dependency is satisfied when it names a task, active or archived,
    /// whose status is done-equivalent. Unknown ids keep the dependent waiting.
    pub async fn list_ready(&self, cancel: &CancellationToken) -> Result<Vec<Task>> {
        let _guard = self.lock.read().await;
        let active = self.read_tasks(cancel, &self.paths.tasks_dir, false).await?;
        let archived = self.read_tasks(cancel, &self.paths.archive_dir, true).await?;
        let statuses = status_index(active.iter().chain(&archived));

        let ready: Vec<Task> = active
            .iter()
            .filter(|t| t.is_ready(&statuses))
            .cloned()
            .collect();
        tracing::debug!(ready = ready.len(), total = active.len(), "computed ready set");
        Ok(ready)
    }

    /// The board's config, or the engine defaults when none is stored
    pub async fn config(&self, cancel: &CancellationToken) -> Result<BoardConfig> {
        let _guard = self.lock.read().await;
        self.load_config(cancel).await
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Persist a new task
    ///
    /// A blank id gets the next sequential one; uid, created date and status
    /// are filled in when missing. The counter is persisted before the task
    /// file, so an id is never handed out twice even if the write fails.
    pub async fn create(&self, cancel: &CancellationToken, task: Task) -> Result<Task> {
        let mut task = task;
        task.title = normalize_title(&task.title)?;
        task.priority = normalize_priority(task.priority)?;
        task.tags = normalize_tags(&task.tags);

        let _guard = self.lock.write().await;
        ensure_active(cancel)?;
        if !self.exists(&self.paths.tasks_dir).await? {
            return Err(StoreError::StoreNotInitialized {
                path: self.paths.tasks_dir.clone(),
            });
        }

        let mut config = self.load_config(cancel).await?;
        let mut tasks = self.read_tasks(cancel, &self.paths.tasks_dir, false).await?;
        let archived = self.read_tasks(cancel, &self.paths.archive_dir, true).await?;
        let explicit = task.id.trim().to_string();
        let allocated = if explicit.is_empty() {
            let highest = self.highest_task_number(tasks.iter().chain(&archived));
            let number = config.next_id.max(highest + 1);
            task.id = self.engine.format_task_id(number);
            config.next_id = number + 1;
            true
        } else {
            validate_task_id(&explicit)?;
            task.id = explicit;
            let taken = tasks.iter().chain(&archived).any(|t| t.id == task.id);
            let archived_path = self.task_path(&self.paths.archive_dir, &task.id)?;
            if taken || self.exists(&archived_path).await? {
                return Err(StoreError::TaskExists { id: task.id });
            }
            false
        };

        let path = self.task_path(&self.paths.tasks_dir, &task.id)?;
        if self.exists(&path).await? {
            return Err(StoreError::TaskExists { id: task.id });
        }

        task.depends_on = normalize_dependencies(&task.id, &task.depends_on)?;
        if !task.depends_on.is_empty() {
            tasks.push(task.clone());
            validate_dependencies(&tasks, &task.id)?;
        }

        if task.uid.trim().is_empty() {
            task.uid = new_uid();
        }
        if task.created.is_none() {
            task.created = Some(Local::now().date_naive());
        }
        if task.status.trim().is_empty() {
            task.status = config.default_status().to_string();
        }

        if allocated {
            self.save_config(cancel, &config).await?;
        }
        self.write_task(cancel, &path, &task).await?;
        self.stamp(&mut task, path);

        tracing::info!(id = %task.id, title = %task.title, "created task");
        Ok(task)
    }

    // =========================================================================
    // Field updates
    // =========================================================================

    /// Change a task's status; any token is accepted
    pub async fn update_status(
        &self,
        cancel: &CancellationToken,
        id: &str,
        status: &str,
    ) -> Result<Task> {
        let status = status.trim().to_string();
        self.modify(cancel, id, move |task| {
            task.status = status;
            Ok(())
        })
        .await
    }

    pub async fn update_title(
        &self,
        cancel: &CancellationToken,
        id: &str,
        title: &str,
    ) -> Result<Task> {
        let title = normalize_title(title)?;
        self.modify(cancel, id, move |task| {
            task.title = title;
            Ok(())
        })
        .await
    }

    pub async fn update_tags<S: AsRef<str>>(
        &self,
        cancel: &CancellationToken,
        id: &str,
        tags: &[S],
    ) -> Result<Task> {
        let tags = normalize_tags(tags);
        self.modify(cancel, id, move |task| {
            task.tags = tags;
            Ok(())
        })
        .await
    }

    /// Replace the markdown body
    pub async fn update_content(
        &self,
        cancel: &CancellationToken,
        id: &str,
        content: &str,
    ) -> Result<Task> {
        let content = content.to_string();
        self.modify(cancel, id, move |task| {
            task.content = content;
            Ok(())
        })
        .await
    }

    pub async fn update_priority(
        &self,
        cancel: &CancellationToken,
        id: &str,
        priority: u8,
    ) -> Result<Task> {
        let priority = normalize_priority(priority)?;
        self.modify(cancel, id, move |task| {
            task.priority = priority;
            Ok(())
        })
        .await
    }

    /// Replace a task's dependency list, rejecting any change that closes a cycle
    pub async fn update_dependencies<S: AsRef<str>>(
        &self,
        cancel: &CancellationToken,
        id: &str,
        depends_on: &[S],
    ) -> Result<Task> {
        validate_task_id(id)?;
        let depends_on = normalize_dependencies(id, depends_on)?;

        let _guard = self.lock.write().await;
        let mut tasks = self.read_tasks(cancel, &self.paths.tasks_dir, false).await?;
        let index = tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::TaskNotFound { id: id.to_string() })?;

        tasks[index].depends_on = depends_on;
        validate_dependencies(&tasks, id)?;

        let mut task = tasks.swap_remove(index);
        let path = match task.path.take() {
            Some(path) => path,
            None => self.task_path(&self.paths.tasks_dir, id)?,
        };
        self.write_task(cancel, &path, &task).await?;
        self.stamp(&mut task, path);

        tracing::info!(id = %task.id, deps = ?task.depends_on, "updated dependencies");
        Ok(task)
    }

    // =========================================================================
    // Archive and restore
    // =========================================================================

    /// Move a task into the archive, bytes unchanged
    pub async fn archive(&self, cancel: &CancellationToken, id: &str) -> Result<Task> {
        let _guard = self.lock.write().await;
        let task = self
            .relocate(cancel, id, &self.paths.tasks_dir, &self.paths.archive_dir)
            .await?;
        tracing::info!(id = %task.id, "archived task");
        Ok(task)
    }

    /// Move an archived task back into the active set, bytes unchanged
    pub async fn restore(&self, cancel: &CancellationToken, id: &str) -> Result<Task> {
        let _guard = self.lock.write().await;
        let task = self
            .relocate(cancel, id, &self.paths.archive_dir, &self.paths.tasks_dir)
            .await?;
        tracing::info!(id = %task.id, "restored task");
        Ok(task)
    }

    /// Archive every active task created strictly before `cutoff`
    ///
    /// Tasks without a created date are left in place. Each move is atomic on
    /// its own; a cancellation part-way leaves the earlier moves done.
    pub async fn archive_before(
        &self,
        cancel: &CancellationToken,
        cutoff: NaiveDate,
    ) -> Result<Vec<Task>> {
        let _guard = self.lock.write().await;
        let candidates: Vec<Task> = self
            .read_tasks(cancel, &self.paths.tasks_dir, false)
            .await?
            .into_iter()
            .filter(|t| t.created.is_some_and(|d| d < cutoff))
            .collect();

        let mut moved = Vec::with_capacity(candidates.len());
        for task in candidates {
            let moved_task = self
                .relocate(cancel, &task.id, &self.paths.tasks_dir, &self.paths.archive_dir)
                .await?;
            moved.push(moved_task);
        }

        tracing::info!(count = moved.len(), %cutoff, "archived tasks by date");
        Ok(moved)
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Permanently remove an active task
    pub async fn delete(&self, cancel: &CancellationToken, id: &str) -> Result<()> {
        let _guard = self.lock.write().await;
        let path = self.require(cancel, &self.paths.tasks_dir, id).await?;
        self.remove(cancel, &path).await?;
        tracing::info!(id, "deleted task");
        Ok(())
    }

    /// Permanently remove an archived task
    pub async fn delete_archived(&self, cancel: &CancellationToken, id: &str) -> Result<()> {
        let _guard = self.lock.write().await;
        let path = self.require(cancel, &self.paths.archive_dir, id).await?;
        self.remove(cancel, &path).await?;
        tracing::info!(id, "deleted archived task");
        Ok(())
    }

    // =========================================================================
    // Board config
    // =========================================================================

    /// Replace the board context; fields are trimmed and blank owners dropped
    pub async fn update_context(
        &self,
        cancel: &CancellationToken,
        context: BoardContext,
    ) -> Result<BoardConfig> {
        let _guard = self.lock.write().await;
        let mut config = self.load_config(cancel).await?;
        config.context = context.normalized();
        self.save_config(cancel, &config).await?;
        Ok(config)
    }

    /// Replace the column set
    ///
    /// Keys are trimmed; columns with a blank key or a repeated key are
    /// dropped. Existing task statuses are not touched.
    pub async fn set_columns(
        &self,
        cancel: &CancellationToken,
        columns: Vec<Column>,
    ) -> Result<BoardConfig> {
        let mut seen = HashSet::new();
        let columns: Vec<Column> = columns
            .into_iter()
            .map(|c| Column::new(c.key.trim(), c.title.trim()))
            .filter(|c| !c.key.is_empty() && seen.insert(c.key.clone()))
            .collect();

        let _guard = self.lock.write().await;
        let mut config = self.load_config(cancel).await?;
        config.columns = columns;
        self.save_config(cancel, &config).await?;
        Ok(config)
    }

    // =========================================================================
    // Internals (callers hold the lock)
    // =========================================================================

    /// Read-modify-write one active task under the write lock
    async fn modify<F>(&self, cancel: &CancellationToken, id: &str, apply: F) -> Result<Task>
    where
        F: FnOnce(&mut Task) -> Result<()>,
    {
        let _guard = self.lock.write().await;
        let path = self.require(cancel, &self.paths.tasks_dir, id).await?;
        let mut task = self.read_task(cancel, &path).await?;
        apply(&mut task)?;
        self.write_task(cancel, &path, &task).await?;
        tracing::debug!(id = %task.id, "updated task");
        Ok(task)
    }

    /// Rename a task file from one subtree into the other
    async fn relocate(
        &self,
        cancel: &CancellationToken,
        id: &str,
        from: &Path,
        to: &Path,
    ) -> Result<Task> {
        let source = self.require(cancel, from, id).await?;
        let mut task = self.read_task(cancel, &source).await?;

        let file_name = source
            .file_name()
            .map(PathBuf::from)
            .ok_or_else(|| StoreError::InvalidId { id: id.to_string() })?;
        let target = to.join(file_name);
        if !is_within(to, &target) {
            return Err(StoreError::InvalidPath {
                path: target,
                root: to.to_path_buf(),
            });
        }
        if self.exists(&target).await? {
            return Err(StoreError::TaskExists { id: id.to_string() });
        }

        ensure_active(cancel)?;
        fs::create_dir_all(to)
            .await
            .map_err(StoreError::io("create directory", to))?;
        fs::rename(&source, &target)
            .await
            .map_err(StoreError::io("move task", &source))?;

        task.path = Some(target);
        Ok(task)
    }

    async fn remove(&self, cancel: &CancellationToken, path: &Path) -> Result<()> {
        ensure_active(cancel)?;
        fs::remove_file(path)
            .await
            .map_err(StoreError::io("remove task", path))
    }

    /// Parse every task file in `dir`, sorted by file name
    async fn read_tasks(
        &self,
        cancel: &CancellationToken,
        dir: &Path,
        missing_ok: bool,
    ) -> Result<Vec<Task>> {
        let files = self.task_files(cancel, dir, missing_ok).await?;
        let mut tasks = Vec::with_capacity(files.len());
        for path in files {
            tasks.push(self.read_task(cancel, &path).await?);
        }
        tracing::debug!(dir = %dir.display(), count = tasks.len(), "read tasks");
        Ok(tasks)
    }

    /// Record files in `dir`; dotfiles and temp files are skipped
    async fn task_files(
        &self,
        cancel: &CancellationToken,
        dir: &Path,
        missing_ok: bool,
    ) -> Result<Vec<PathBuf>> {
        ensure_active(cancel)?;
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return if missing_ok {
                    Ok(Vec::new())
                } else {
                    Err(StoreError::StoreNotInitialized {
                        path: dir.to_path_buf(),
                    })
                };
            }
            Err(e) => return Err(StoreError::io("read directory", dir)(e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(StoreError::io("read directory", dir))?
        {
            ensure_active(cancel)?;
            let path = entry.path();
            let is_record = path.extension().and_then(|e| e.to_str()) == Some(TASK_EXTENSION)
                && !path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with('.'));
            if !is_record {
                continue;
            }
            let file_type = entry
                .file_type()
                .await
                .map_err(StoreError::io("inspect", &path))?;
            if file_type.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    async fn read_task(&self, cancel: &CancellationToken, path: &Path) -> Result<Task> {
        ensure_active(cancel)?;
        let text = fs::read_to_string(path)
            .await
            .map_err(StoreError::io("read task", path))?;
        let Document { header, body } =
            frontmatter::parse::<Task>(&text).map_err(|source| StoreError::Frontmatter {
                path: path.to_path_buf(),
                source,
            })?;

        let mut task = header;
        task.content = body;
        if task.priority == 0 {
            task.priority = DEFAULT_PRIORITY;
        }
        if task.id.is_empty() {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                task.id = stem.to_string();
            }
        }
        self.stamp(&mut task, path.to_path_buf());
        Ok(task)
    }

    async fn write_task(&self, cancel: &CancellationToken, path: &Path, task: &Task) -> Result<()> {
        ensure_active(cancel)?;
        let text =
            frontmatter::render(task, &task.content).map_err(|source| StoreError::Frontmatter {
                path: path.to_path_buf(),
                source,
            })?;
        atomic_write(path, text.as_bytes())
            .await
            .map_err(StoreError::io("write task", path))
    }

    /// Locate a task file by id: `<id>.md` first, then a header scan
    async fn locate(
        &self,
        cancel: &CancellationToken,
        dir: &Path,
        id: &str,
    ) -> Result<Option<PathBuf>> {
        let direct = self.task_path(dir, id)?;
        ensure_active(cancel)?;
        if self.exists(&direct).await? {
            return Ok(Some(direct));
        }

        let found = self
            .read_tasks(cancel, dir, true)
            .await?
            .into_iter()
            .find(|t| t.id == id)
            .and_then(|t| t.path);
        Ok(found)
    }

    async fn require(&self, cancel: &CancellationToken, dir: &Path, id: &str) -> Result<PathBuf> {
        self.locate(cancel, dir, id)
            .await?
            .ok_or_else(|| StoreError::TaskNotFound { id: id.to_string() })
    }

    /// `<dir>/<id>.md`, after checking the id cannot escape `dir`
    fn task_path(&self, dir: &Path, id: &str) -> Result<PathBuf> {
        validate_task_id(id)?;
        let path = dir.join(format!("{id}.{TASK_EXTENSION}"));
        if !is_within(dir, &path) {
            return Err(StoreError::InvalidPath {
                path,
                root: dir.to_path_buf(),
            });
        }
        Ok(path)
    }

    /// Highest sequence number among the given tasks' header ids and file names
    fn highest_task_number<'a, I>(&self, tasks: I) -> u64
    where
        I: IntoIterator<Item = &'a Task>,
    {
        tasks
            .into_iter()
            .flat_map(|t| {
                let stem = t
                    .path
                    .as_deref()
                    .and_then(Path::file_stem)
                    .and_then(|s| s.to_str());
                [Some(t.id.as_str()), stem]
            })
            .flatten()
            .filter_map(|id| self.engine.parse_task_number(id))
            .max()
            .unwrap_or(0)
    }

    async fn load_config(&self, cancel: &CancellationToken) -> Result<BoardConfig> {
        ensure_active(cancel)?;
        let path = &self.paths.config_path;
        match fs::read_to_string(path).await {
            Ok(text) if text.trim().is_empty() => Ok(BoardConfig::from_engine(&self.engine)),
            Ok(text) => serde_yaml_ng::from_str(&text).map_err(StoreError::yaml(path)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Ok(BoardConfig::from_engine(&self.engine))
            }
            Err(e) => Err(StoreError::io("read config", path)(e)),
        }
    }

    async fn save_config(&self, cancel: &CancellationToken, config: &BoardConfig) -> Result<()> {
        ensure_active(cancel)?;
        let path = &self.paths.config_path;
        let text = serde_yaml_ng::to_string(config).map_err(StoreError::yaml(path))?;
        atomic_write(path, text.as_bytes())
            .await
            .map_err(StoreError::io("write config", path))
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        fs::try_exists(path)
            .await
            .map_err(StoreError::io("inspect", path))
    }

    fn stamp(&self, task: &mut Task, path: PathBuf) {
        task.path = Some(path);
        if let Some(board) = &self.board {
            task.board_id = Some(board.id.clone());
            task.board_name = Some(board.name.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, TaskRepository, CancellationToken) {
        let temp = TempDir::new().unwrap();
        let repo = TaskRepository::new(BoardPaths::new(temp.path().join("board")))
            .with_board("default", "Default");
        let cancel = CancellationToken::new();
        repo.init(&cancel).await.unwrap();
        (temp, repo, cancel)
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let (_temp, repo, cancel) = setup().await;
        repo.update_context(
            &cancel,
            BoardContext {
                scope: "launch".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        repo.init(&cancel).await.unwrap();
        let config = repo.config(&cancel).await.unwrap();
        assert_eq!(config.context.scope, "launch");
        assert!(repo.paths().archive_dir.is_dir());
    }

    #[tokio::test]
    async fn test_create_assigns_defaults() {
        let (_temp, repo, cancel) = setup().await;
        let task = repo.create(&cancel, Task::new("  First  ")).await.unwrap();

        assert_eq!(task.id, "T-000001");
        assert_eq!(task.title, "First");
        assert_eq!(task.status, "todo");
        assert_eq!(task.priority, DEFAULT_PRIORITY);
        assert!(!task.uid.is_empty());
        assert!(task.created.is_some());
        assert_eq!(task.board_id.as_deref(), Some("default"));
        assert_eq!(task.board_name.as_deref(), Some("Default"));
        assert!(task.path.as_ref().unwrap().ends_with("tasks/T-000001.md"));

        let config = repo.config(&cancel).await.unwrap();
        assert_eq!(config.next_id, 2);
    }

    #[tokio::test]
    async fn test_create_validation_writes_nothing() {
        let (_temp, repo, cancel) = setup().await;

        let err = repo.create(&cancel, Task::new("   ")).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidTitle));

        let err = repo
            .create(&cancel, Task::new("x").with_priority(9))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPriority { value: 9 }));

        let err = repo
            .create(&cancel, Task::new("x").with_depends_on(["a/b"]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidDependency { .. }));

        assert!(repo.list_all(&cancel).await.unwrap().is_empty());
        assert_eq!(repo.config(&cancel).await.unwrap().next_id, 1);
    }

    #[tokio::test]
    async fn test_create_with_explicit_id() {
        let (_temp, repo, cancel) = setup().await;
        let task = repo
            .create(&cancel, Task::new("Custom").with_id("setup-ci"))
            .await
            .unwrap();
        assert_eq!(task.id, "setup-ci");

        let err = repo
            .create(&cancel, Task::new("Again").with_id("setup-ci"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::TaskExists { .. }));

        let err = repo
            .create(&cancel, Task::new("Escape").with_id("../x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidId { .. }));
    }

    #[tokio::test]
    async fn test_create_requires_init() {
        let temp = TempDir::new().unwrap();
        let repo = TaskRepository::new(BoardPaths::new(temp.path().join("missing")));
        let err = repo
            .create(&CancellationToken::new(), Task::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::StoreNotInitialized { .. }));
    }

    #[tokio::test]
    async fn test_updates() {
        let (_temp, repo, cancel) = setup().await;
        let task = repo.create(&cancel, Task::new("Draft")).await.unwrap();

        repo.update_status(&cancel, &task.id, "in-progress").await.unwrap();
        repo.update_title(&cancel, &task.id, " Final ").await.unwrap();
        repo.update_tags(&cancel, &task.id, &["ui", "UI", " api "])
            .await
            .unwrap();
        repo.update_priority(&cancel, &task.id, 0).await.unwrap();
        repo.update_content(&cancel, &task.id, "## Notes\n\nbody")
            .await
            .unwrap();

        let got = repo.get(&cancel, &task.id).await.unwrap();
        assert_eq!(got.status, "in-progress");
        assert_eq!(got.title, "Final");
        assert_eq!(got.tags, vec!["ui", "api"]);
        assert_eq!(got.priority, 2);
        assert_eq!(got.content, "## Notes\n\nbody");
        assert_eq!(got.uid, task.uid);

        assert!(matches!(
            repo.update_title(&cancel, &task.id, "").await,
            Err(StoreError::InvalidTitle)
        ));
        assert!(repo
            .update_status(&cancel, "T-000404", "done")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_get_falls_back_to_header_scan() {
        let (_temp, repo, cancel) = setup().await;
        let text = "---\nid: legacy-7\ntitle: Renamed file\nstatus: todo\n---\nbody\n";
        std::fs::write(repo.paths().tasks_dir.join("some-other-name.md"), text).unwrap();

        let task = repo.get(&cancel, "legacy-7").await.unwrap();
        assert_eq!(task.title, "Renamed file");
        assert_eq!(task.content, "body");
        assert_eq!(task.priority, DEFAULT_PRIORITY);
    }

    #[tokio::test]
    async fn test_allocation_reads_header_ids() {
        let (_temp, repo, cancel) = setup().await;
        let text = "---\nid: T-000001\ntitle: Hand written\nstatus: todo\n---\n\n";
        std::fs::write(repo.paths().tasks_dir.join("legacy.md"), text).unwrap();
        let text = "---\nid: T-000005\ntitle: Old\nstatus: done\n---\n\n";
        std::fs::write(repo.paths().archive_dir.join("old-one.md"), text).unwrap();

        let task = repo.create(&cancel, Task::new("New")).await.unwrap();
        assert_eq!(task.id, "T-000006");

        for id in ["T-000001", "T-000005"] {
            let err = repo
                .create(&cancel, Task::new("Clash").with_id(id))
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::TaskExists { .. }), "{id}");
        }

        let all = repo.list_all(&cancel).await.unwrap();
        let unique: HashSet<&str> = all.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(unique.len(), all.len());
    }

    #[tokio::test]
    async fn test_temp_and_hidden_files_are_ignored() {
        let (_temp, repo, cancel) = setup().await;
        repo.create(&cancel, Task::new("Real")).await.unwrap();
        let dir = &repo.paths().tasks_dir;
        std::fs::write(dir.join(".T-000009.md.tmp"), "junk").unwrap();
        std::fs::write(dir.join(".hidden.md"), "junk").unwrap();
        std::fs::write(dir.join("notes.txt"), "junk").unwrap();

        assert_eq!(repo.list_all(&cancel).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_file_fails_listing() {
        let (_temp, repo, cancel) = setup().await;
        std::fs::write(repo.paths().tasks_dir.join("broken.md"), "no header here").unwrap();

        let err = repo.list_all(&cancel).await.unwrap_err();
        assert!(matches!(err, StoreError::Frontmatter { .. }));
    }

    #[tokio::test]
    async fn test_set_columns_changes_default_status() {
        let (_temp, repo, cancel) = setup().await;
        let config = repo
            .set_columns(
                &cancel,
                vec![
                    Column::new(" backlog ", "Backlog"),
                    Column::new("", "Nameless"),
                    Column::new("backlog", "Duplicate"),
                    Column::new("shipped", "Shipped"),
                ],
            )
            .await
            .unwrap();
        assert_eq!(config.columns.len(), 2);
        assert_eq!(config.columns[0].title, "Backlog");

        let task = repo.create(&cancel, Task::new("x")).await.unwrap();
        assert_eq!(task.status, "backlog");
    }

    #[tokio::test]
    async fn test_archive_conflict() {
        let (_temp, repo, cancel) = setup().await;
        let task = repo.create(&cancel, Task::new("x")).await.unwrap();
        std::fs::copy(
            task.path.as_ref().unwrap(),
            repo.paths().archive_dir.join("T-000001.md"),
        )
        .unwrap();

        let err = repo.archive(&cancel, &task.id).await.unwrap_err();
        assert!(matches!(err, StoreError::TaskExists { .. }));
        assert!(repo.get(&cancel, &task.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_archive_before_cutoff() {
        let (_temp, repo, cancel) = setup().await;
        let old = NaiveDate::from_ymd_opt(2023, 1, 10).unwrap();
        let new = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        repo.create(&cancel, Task::new("old").with_created(old))
            .await
            .unwrap();
        repo.create(&cancel, Task::new("new").with_created(new))
            .await
            .unwrap();

        let moved = repo
            .archive_before(&cancel, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .await
            .unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].title, "old");

        assert_eq!(repo.list_all(&cancel).await.unwrap().len(), 1);
        assert_eq!(repo.list_archived(&cancel).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_archived() {
        let (_temp, repo, cancel) = setup().await;
        let task = repo.create(&cancel, Task::new("x")).await.unwrap();
        repo.archive(&cancel, &task.id).await.unwrap();

        assert!(repo.delete(&cancel, &task.id).await.unwrap_err().is_not_found());
        repo.delete_archived(&cancel, &task.id).await.unwrap();
        assert!(repo.list_archived(&cancel).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_archived_without_archive_dir() {
        let (_temp, repo, cancel) = setup().await;
        std::fs::remove_dir_all(&repo.paths().archive_dir).unwrap();
        assert!(repo.list_archived(&cancel).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_canceled_token_aborts_before_io() {
        let (_temp, repo, cancel) = setup().await;
        cancel.cancel();

        assert!(repo.list_all(&cancel).await.unwrap_err().is_canceled());
        assert!(repo
            .create(&cancel, Task::new("x"))
            .await
            .unwrap_err()
            .is_canceled());

        let fresh = CancellationToken::new();
        assert!(repo.list_all(&fresh).await.unwrap().is_empty());
    }
}
