//! Core types for the persistence engine

mod board;
mod config;
mod ids;
mod task;

pub use board::{Board, BoardPaths, BoardRegistry};
pub use config::{BoardConfig, BoardContext, Column};
pub use ids::{new_uid, validate_board_id, validate_task_id};
pub use task::{
    is_done_status, normalize_dependencies, normalize_priority, normalize_status, normalize_tags,
    normalize_title, status_index, Task, DEFAULT_PRIORITY, DONE_STATUSES,
};
