//! Board and task persistence engine with file-per-record storage
//!
//! Tasks are markdown files with a YAML header, grouped into boards. A
//! registry file tracks every board and which one is active. Everything is
//! plain text so a store can live in version control.
//!
//! ## Overview
//!
//! - **File-per-task** - each task is one `<id>.md` file, rewritten whole on change
//! - **Sequential ids** - `T-000001`, `T-000002`, ... per board, never reused
//! - **Dependencies** - tasks list the ids they depend on; cycles are rejected
//! - **Archive** - archived tasks move to a sibling subtree with their bytes intact
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use boardkeeper_store::{BoardRegistryManager, CancellationToken, Task};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cancel = CancellationToken::new();
//! let manager = BoardRegistryManager::load("/path/to/store")?;
//! manager.ensure_initialized(&cancel).await?;
//!
//! let repo = manager.open_repository(&cancel, "").await?;
//! let task = repo
//!     .create(&cancel, Task::new("Write the parser").with_tags(["backend"]))
//!     .await?;
//! println!("Created task: {}", task.id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Storage Structure
//!
//! ```text
//! store/
//! └── boards/
//!     ├── boards.yaml              # Registry: active id + board list
//!     └── {board-id}/
//!         ├── config.yaml          # Columns, next_id counter, context
//!         ├── tasks/
//!         │   └── {id}.md          # Task (YAML frontmatter + markdown body)
//!         └── archive/
//!             └── tasks/
//!                 └── {id}.md      # Archived task, byte-identical
//! ```
//!
//! A store written before boards existed (`tasks/`, `config.yaml` and
//! `archive/tasks/` at the root) is moved into `boards/default/` the first
//! time the registry is initialized.
//!
//! Coordination is per process: concurrent callers sharing one
//! [`TaskRepository`] or [`BoardRegistryManager`] are serialized, separate
//! processes writing the same store are not.

mod cancel;
mod error;
pub mod frontmatter;
pub mod graph;
mod migrate;
pub mod query;
mod registry;
mod repository;
pub mod types;

pub use cancel::CancellationToken;
pub use error::{Result, StoreError};
pub use graph::{validate_dependencies, DependencyGraph};
pub use query::{SortKey, TagMatch, TaskQuery};
pub use registry::{BoardRegistryManager, BOARDS_DIR, DEFAULT_BOARD_ID, REGISTRY_FILE};
pub use repository::TaskRepository;
pub use types::{Board, BoardConfig, BoardContext, BoardPaths, BoardRegistry, Column, Task};

// Severity classification implemented by StoreError
pub use boardkeeper_common::{ErrorSeverity, Severity};
