//! Boardkeeper engine configuration using Figment
//!
//! Configuration is assembled from, lowest priority first:
//!
//! 1. Built-in defaults ([`EngineConfig::default`])
//! 2. `boardkeeper.{toml,json,yaml,yml}` files in the storage root
//! 3. `BOARDKEEPER_*` environment variables
//!
//! ```no_run
//! use boardkeeper_config::ConfigProvider;
//!
//! let config = ConfigProvider::new("/path/to/store").load()?;
//! assert_eq!(config.format_task_id(7), "T-000007");
//! # Ok::<(), boardkeeper_config::ConfigError>(())
//! ```
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! id_prefix: "T-"
//! id_width: 6
//! log_filter: "boardkeeper=debug"
//! default_columns:
//!   - key: todo
//!     title: To Do
//!   - key: done
//!     title: Done
//! ```

mod error;
mod provider;
mod types;

pub use error::{ConfigError, ConfigResult};
pub use provider::{ConfigProvider, CONFIG_FILE_STEM, ENV_PREFIX};
pub use types::{ColumnSpec, EngineConfig};
