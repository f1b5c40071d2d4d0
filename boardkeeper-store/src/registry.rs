//! BoardRegistryManager - the cross-board registry
//!
//! The registry lives at `boards/boards.yaml` under the storage root and
//! lists every board with the id of the active one. Each board owns
//! `boards/<id>/`, laid out as a [`TaskRepository`] expects.
//!
//! The registry always holds at least one board and its `active` id always
//! names one of them.

use crate::cancel::{ensure_active, CancellationToken};
use crate::error::{Result, StoreError};
use crate::migrate::{legacy_layout_present, migrate_legacy_layout};
use crate::repository::TaskRepository;
use crate::types::{validate_board_id, Board, BoardPaths, BoardRegistry};
use boardkeeper_common::{atomic_write, init_tracing, is_within, slugify, Pretty};
use boardkeeper_config::{ConfigProvider, EngineConfig};
use chrono::Local;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

/// Directory under the storage root holding the registry and board dirs
pub const BOARDS_DIR: &str = "boards";

/// Registry file name inside [`BOARDS_DIR`]
pub const REGISTRY_FILE: &str = "boards.yaml";

/// Id of the board created on first use and by legacy migration
pub const DEFAULT_BOARD_ID: &str = "default";

/// Slug used when a board name has no usable characters
const FALLBACK_SLUG: &str = "board";

/// Manages the board registry rooted at a storage directory
pub struct BoardRegistryManager {
    root: PathBuf,
    engine: Arc<EngineConfig>,
    lock: RwLock<()>,
}

impl BoardRegistryManager {
    /// Manager over `root` using the default engine configuration
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            engine: Arc::new(EngineConfig::default()),
            lock: RwLock::new(()),
        }
    }

    /// Manager over `root` with configuration layered from its files and environment
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let engine = ConfigProvider::new(&root).load()?;
        tracing::debug!(config = %Pretty(&engine), "loaded engine configuration");
        Ok(Self::new(root).with_config(Arc::new(engine)))
    }

    pub fn with_config(mut self, engine: Arc<EngineConfig>) -> Self {
        self.engine = engine;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn engine(&self) -> Arc<EngineConfig> {
        Arc::clone(&self.engine)
    }

    /// Install the stderr subscriber with the configured filter; `RUST_LOG` wins
    pub fn init_logging(&self) -> bool {
        init_tracing(&self.engine.log_filter)
    }

    pub fn registry_path(&self) -> PathBuf {
        self.boards_dir().join(REGISTRY_FILE)
    }

    fn boards_dir(&self) -> PathBuf {
        self.root.join(BOARDS_DIR)
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Make sure the registry exists, migrating a legacy layout first
    ///
    /// Idempotent. A fresh store gets a `default` board with scaffolded
    /// directories and config.
    pub async fn ensure_initialized(&self, cancel: &CancellationToken) -> Result<BoardRegistry> {
        let _guard = self.lock.write().await;
        self.initialize(cancel).await
    }

    async fn initialize(&self, cancel: &CancellationToken) -> Result<BoardRegistry> {
        let migrated = migrate_legacy_layout(&self.root, cancel).await?;

        if let Some(registry) = self.read(cancel).await? {
            if migrated {
                // A legacy store may have had only some of the board's paths
                let board = find(&registry, DEFAULT_BOARD_ID)?;
                self.scaffold(cancel, board).await?;
            }
            return Ok(registry);
        }

        let board = Board::new(DEFAULT_BOARD_ID, "Default", Local::now().date_naive());
        self.scaffold(cancel, &board).await?;
        let registry = BoardRegistry::single(board);
        write_registry(&self.registry_path(), &registry, cancel).await?;
        tracing::info!(root = %self.root.display(), "initialized board registry");
        Ok(registry)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All boards in registry order, plus the active board id
    pub async fn list_boards(&self, cancel: &CancellationToken) -> Result<(Vec<Board>, String)> {
        let registry = self.snapshot(cancel).await?;
        Ok((registry.boards, registry.active))
    }

    pub async fn get(&self, cancel: &CancellationToken, id: &str) -> Result<Board> {
        let registry = self.snapshot(cancel).await?;
        find(&registry, id).cloned()
    }

    pub async fn active_board(&self, cancel: &CancellationToken) -> Result<Board> {
        let registry = self.snapshot(cancel).await?;
        find(&registry, &registry.active).cloned()
    }

    /// Filesystem layout of a board; a blank id means the active board
    pub async fn resolve_board_paths(
        &self,
        cancel: &CancellationToken,
        id: &str,
    ) -> Result<BoardPaths> {
        let (_, paths) = self.resolve(cancel, id).await?;
        Ok(paths)
    }

    /// A ready-to-use repository for a board; a blank id means the active board
    ///
    /// Missing board directories are created. Tasks read through the returned
    /// repository carry the board's id and name.
    pub async fn open_repository(
        &self,
        cancel: &CancellationToken,
        id: &str,
    ) -> Result<TaskRepository> {
        let (board, paths) = self.resolve(cancel, id).await?;
        let repo = TaskRepository::new(paths)
            .with_config(self.engine())
            .with_board(board.id, board.name);
        repo.init(cancel).await?;
        Ok(repo)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Register a new board with a slug id derived from `name`
    ///
    /// Collisions with registered ids or existing directories get `-1`,
    /// `-2`, ... appended.
    pub async fn create(&self, cancel: &CancellationToken, name: &str) -> Result<Board> {
        let name = normalize_board_name(name)?;

        let _guard = self.lock.write().await;
        let mut registry = self.initialize(cancel).await?;

        let base = match slugify(&name) {
            slug if slug.is_empty() => FALLBACK_SLUG.to_string(),
            slug => slug,
        };
        let mut id = base.clone();
        let mut suffix = 1;
        while registry.contains(&id) || self.exists(cancel, &self.boards_dir().join(&id)).await? {
            id = format!("{base}-{suffix}");
            suffix += 1;
        }
        validate_board_id(&id)?;

        let board = Board::new(id, name, Local::now().date_naive());
        self.scaffold(cancel, &board).await?;
        registry.boards.push(board.clone());
        write_registry(&self.registry_path(), &registry, cancel).await?;

        tracing::info!(id = %board.id, name = %board.name, "created board");
        Ok(board)
    }

    /// Change a board's display name; its id and directory stay put
    pub async fn rename(&self, cancel: &CancellationToken, id: &str, name: &str) -> Result<Board> {
        let name = normalize_board_name(name)?;
        self.update(cancel, id, |registry| {
            let board = find_mut(registry, id)?;
            board.name = name;
            Ok(board.clone())
        })
        .await
    }

    /// Make a board the active one; archived boards may be activated
    pub async fn set_active(&self, cancel: &CancellationToken, id: &str) -> Result<Board> {
        let board = self
            .update(cancel, id, |registry| {
                let board = find(registry, id)?.clone();
                registry.active = board.id.clone();
                Ok(board)
            })
            .await?;
        tracing::info!(id = %board.id, "switched active board");
        Ok(board)
    }

    /// Flag a board archived, moving `active` elsewhere when possible
    ///
    /// The only board stays active even when archived.
    pub async fn archive(&self, cancel: &CancellationToken, id: &str) -> Result<Board> {
        let board = self
            .update(cancel, id, |registry| {
                let board = find_mut(registry, id)?;
                board.archived = true;
                let board = board.clone();
                if registry.active == board.id {
                    if let Some(next) = registry.fallback_active(&board.id) {
                        registry.active = next.to_string();
                    }
                }
                Ok(board)
            })
            .await?;
        tracing::info!(id = %board.id, "archived board");
        Ok(board)
    }

    /// Clear a board's archived flag
    pub async fn restore(&self, cancel: &CancellationToken, id: &str) -> Result<Board> {
        let board = self
            .update(cancel, id, |registry| {
                let board = find_mut(registry, id)?;
                board.archived = false;
                Ok(board.clone())
            })
            .await?;
        tracing::info!(id = %board.id, "restored board");
        Ok(board)
    }

    /// Remove a board and erase its directory
    ///
    /// The registry is saved first, so a failure while erasing leaves an
    /// orphaned directory rather than a registry entry without data.
    pub async fn delete(&self, cancel: &CancellationToken, id: &str) -> Result<()> {
        validate_board_id(id)?;

        let _guard = self.lock.write().await;
        let mut registry = self.initialize(cancel).await?;
        let board = find(&registry, id)?.clone();
        if registry.boards.len() <= 1 {
            return Err(StoreError::BoardDeleteForbidden { id: board.id });
        }
        let dir = self.board_dir(&board)?;

        if registry.active == board.id {
            if let Some(next) = registry.fallback_active(&board.id) {
                registry.active = next.to_string();
            }
        }
        registry.boards.retain(|b| b.id != board.id);
        write_registry(&self.registry_path(), &registry, cancel).await?;

        ensure_active(cancel)?;
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::io("remove board directory", &dir)(e)),
        }

        tracing::info!(id = %board.id, active = %registry.active, "deleted board");
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Read the registry under the read lock
    ///
    /// Falls back to the write path only when the registry is missing or a
    /// legacy layout still needs moving.
    async fn snapshot(&self, cancel: &CancellationToken) -> Result<BoardRegistry> {
        {
            let _guard = self.lock.read().await;
            if !legacy_layout_present(&self.root, cancel).await? {
                if let Some(registry) = self.read(cancel).await? {
                    return Ok(registry);
                }
            }
        }
        self.ensure_initialized(cancel).await
    }

    /// Read-modify-write the registry under the write lock
    async fn update<T, F>(&self, cancel: &CancellationToken, id: &str, apply: F) -> Result<T>
    where
        F: FnOnce(&mut BoardRegistry) -> Result<T>,
    {
        validate_board_id(id)?;

        let _guard = self.lock.write().await;
        let mut registry = self.initialize(cancel).await?;
        let out = apply(&mut registry)?;
        write_registry(&self.registry_path(), &registry, cancel).await?;
        Ok(out)
    }

    async fn resolve(&self, cancel: &CancellationToken, id: &str) -> Result<(Board, BoardPaths)> {
        let registry = self.snapshot(cancel).await?;
        let id = match id.trim() {
            "" => registry.active.as_str(),
            id => {
                validate_board_id(id)?;
                id
            }
        };
        let board = find(&registry, id)?.clone();
        let paths = BoardPaths::new(self.board_dir(&board)?);
        Ok((board, paths))
    }

    /// Absolute directory of a board, which must sit inside `boards/`
    fn board_dir(&self, board: &Board) -> Result<PathBuf> {
        let boards_dir = self.boards_dir();
        let dir = self.root.join(&board.path);
        if !is_within(&boards_dir, &dir) {
            return Err(StoreError::InvalidPath {
                path: dir,
                root: boards_dir,
            });
        }
        Ok(dir)
    }

    async fn scaffold(&self, cancel: &CancellationToken, board: &Board) -> Result<()> {
        let dir = self.board_dir(board)?;
        TaskRepository::new(BoardPaths::new(dir))
            .with_config(self.engine())
            .init(cancel)
            .await
    }

    async fn read(&self, cancel: &CancellationToken) -> Result<Option<BoardRegistry>> {
        read_registry(&self.registry_path(), cancel).await
    }

    async fn exists(&self, cancel: &CancellationToken, path: &Path) -> Result<bool> {
        ensure_active(cancel)?;
        fs::try_exists(path)
            .await
            .map_err(StoreError::io("inspect", path))
    }
}

fn normalize_board_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidBoardName);
    }
    Ok(trimmed.to_string())
}

fn find<'a>(registry: &'a BoardRegistry, id: &str) -> Result<&'a Board> {
    registry
        .find(id)
        .ok_or_else(|| StoreError::BoardNotFound { id: id.to_string() })
}

fn find_mut<'a>(registry: &'a mut BoardRegistry, id: &str) -> Result<&'a mut Board> {
    registry
        .find_mut(id)
        .ok_or_else(|| StoreError::BoardNotFound { id: id.to_string() })
}

/// Load and check the registry file; `None` when it does not exist
///
/// An `active` id that no longer names a board is repaired in memory.
pub(crate) async fn read_registry(
    path: &Path,
    cancel: &CancellationToken,
) -> Result<Option<BoardRegistry>> {
    ensure_active(cancel)?;
    let text = match fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io("read registry", path)(e)),
    };

    let mut registry: BoardRegistry =
        serde_yaml_ng::from_str(&text).map_err(StoreError::yaml(path))?;
    check_registry(path, &registry)?;

    if registry.repair_active() {
        tracing::warn!(
            path = %path.display(),
            active = %registry.active,
            "registry pointed at a missing board; using another"
        );
    }
    Ok(Some(registry))
}

pub(crate) async fn write_registry(
    path: &Path,
    registry: &BoardRegistry,
    cancel: &CancellationToken,
) -> Result<()> {
    ensure_active(cancel)?;
    let text = serde_yaml_ng::to_string(registry).map_err(StoreError::yaml(path))?;
    atomic_write(path, text.as_bytes())
        .await
        .map_err(StoreError::io("write registry", path))?;
    tracing::debug!(path = %path.display(), boards = registry.boards.len(), "wrote registry");
    Ok(())
}

fn check_registry(path: &Path, registry: &BoardRegistry) -> Result<()> {
    let invalid = |reason: String| StoreError::InvalidRegistry {
        path: path.to_path_buf(),
        reason,
    };

    if registry.boards.is_empty() {
        return Err(invalid("no boards listed".to_string()));
    }
    let mut seen = HashSet::new();
    for board in &registry.boards {
        if validate_board_id(&board.id).is_err() {
            return Err(invalid(format!("malformed board id '{}'", board.id)));
        }
        if !seen.insert(board.id.as_str()) {
            return Err(invalid(format!("duplicate board id '{}'", board.id)));
        }
    }
    Ok(())
}
