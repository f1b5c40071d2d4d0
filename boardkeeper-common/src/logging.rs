//! Logging utilities for Boardkeeper
//!
//! The engine only emits `tracing` events; binaries and tests that want to see
//! them call [`init_tracing`] once at startup.

use serde::Serialize;
use std::fmt::Debug;
use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor configuration supplies one
pub const DEFAULT_LOG_FILTER: &str = "boardkeeper=info,warn";

/// Install a stderr `fmt` subscriber filtered by `RUST_LOG`, falling back to `filter`.
///
/// Returns `false` if a global subscriber was already installed, which makes it
/// safe to call from every test and entry point.
pub fn init_tracing(filter: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Wrapper for pretty-printing types in logs as YAML
///
/// ```ignore
/// use boardkeeper_common::Pretty;
/// use tracing::debug;
///
/// debug!("registry: {}", Pretty(&registry));
/// ```
///
/// Outputs YAML with a leading newline; Debug is the fallback when YAML
/// serialization fails.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{}", yaml),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> std::fmt::Debug for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_pretty_renders_yaml() {
        let sample = Sample {
            name: "work".into(),
            count: 3,
        };
        let rendered = format!("{}", Pretty(&sample));
        assert!(rendered.starts_with('\n'));
        assert!(rendered.contains("name: work"));
        assert!(rendered.contains("count: 3"));
    }

    #[test]
    fn test_init_tracing_is_repeatable() {
        init_tracing("debug");
        // Second install must not panic, only report that one already exists
        assert!(!init_tracing("debug"));
    }
}
