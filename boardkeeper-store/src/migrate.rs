//! One-time move of the single-board layout into `boards/default/`
//!
//! Before boards existed the store kept `tasks/`, `config.yaml` and
//! `archive/tasks/` directly under the storage root. Those paths are moved
//! as-is; nothing is rewritten. If any destination already exists the
//! migration refuses before moving anything.

use crate::cancel::{ensure_active, CancellationToken};
use crate::error::{Result, StoreError};
use crate::registry::{read_registry, write_registry, BOARDS_DIR, DEFAULT_BOARD_ID, REGISTRY_FILE};
use crate::types::{Board, BoardRegistry};
use chrono::Local;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Display name given to the board created from a legacy layout
const DEFAULT_BOARD_NAME: &str = "Default";

/// A legacy path and where it lands
#[derive(Debug)]
struct Move {
    from: PathBuf,
    to: PathBuf,
}

fn planned_moves(root: &Path) -> Vec<Move> {
    let board = root.join(BOARDS_DIR).join(DEFAULT_BOARD_ID);
    vec![
        Move {
            from: root.join("tasks"),
            to: board.join("tasks"),
        },
        Move {
            from: root.join("config.yaml"),
            to: board.join("config.yaml"),
        },
        Move {
            from: root.join("archive").join("tasks"),
            to: board.join("archive").join("tasks"),
        },
    ]
}

/// Move a legacy single-board layout under `root` into the default board
///
/// Returns `true` when something was migrated. The registry is created when
/// absent, or gains a `default` entry when it lacks one.
pub(crate) async fn migrate_legacy_layout(root: &Path, cancel: &CancellationToken) -> Result<bool> {
    let moves = pending_moves(root, cancel).await?;
    if moves.is_empty() {
        return Ok(false);
    }

    for planned in &moves {
        if exists(cancel, &planned.to).await? {
            tracing::warn!(
                from = %planned.from.display(),
                to = %planned.to.display(),
                "legacy layout found but destination is occupied"
            );
            return Err(StoreError::MigrationConflict {
                path: planned.to.clone(),
            });
        }
    }

    for planned in &moves {
        ensure_active(cancel)?;
        if let Some(parent) = planned.to.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(StoreError::io("create directory", parent))?;
        }
        fs::rename(&planned.from, &planned.to)
            .await
            .map_err(StoreError::io("move legacy path", &planned.from))?;
        tracing::debug!(from = %planned.from.display(), to = %planned.to.display(), "moved legacy path");
    }

    // Leftover archive/ parent; remove_dir keeps it if anything else lives there
    let legacy_archive = root.join("archive");
    if let Err(e) = fs::remove_dir(&legacy_archive).await {
        tracing::debug!(
            path = %legacy_archive.display(),
            error = %e,
            "kept legacy archive directory"
        );
    }

    let registry_path = root.join(BOARDS_DIR).join(REGISTRY_FILE);
    let default_board = Board::new(
        DEFAULT_BOARD_ID,
        DEFAULT_BOARD_NAME,
        Local::now().date_naive(),
    );
    let registry = match read_registry(&registry_path, cancel).await? {
        Some(mut registry) => {
            if !registry.contains(DEFAULT_BOARD_ID) {
                registry.boards.push(default_board);
            }
            registry
        }
        None => BoardRegistry::single(default_board),
    };
    write_registry(&registry_path, &registry, cancel).await?;

    tracing::info!(
        root = %root.display(),
        moved = moves.len(),
        "migrated legacy layout into the default board"
    );
    Ok(true)
}

/// Whether any legacy path is still waiting to be moved
pub(crate) async fn legacy_layout_present(root: &Path, cancel: &CancellationToken) -> Result<bool> {
    Ok(!pending_moves(root, cancel).await?.is_empty())
}

async fn pending_moves(root: &Path, cancel: &CancellationToken) -> Result<Vec<Move>> {
    let mut moves = Vec::new();
    for planned in planned_moves(root) {
        if exists(cancel, &planned.from).await? {
            moves.push(planned);
        }
    }
    Ok(moves)
}

async fn exists(cancel: &CancellationToken, path: &Path) -> Result<bool> {
    ensure_active(cancel)?;
    fs::try_exists(path)
        .await
        .map_err(StoreError::io("inspect", path))
}
