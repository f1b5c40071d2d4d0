//! Configuration provider using figment

use crate::error::ConfigResult;
use crate::types::EngineConfig;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// File stem searched for in the storage root
pub const CONFIG_FILE_STEM: &str = "boardkeeper";

/// Prefix of environment variables that override file values
pub const ENV_PREFIX: &str = "BOARDKEEPER_";

/// Loads [`EngineConfig`] for one storage root
///
/// No caching is performed; every [`load`](Self::load) reads the sources fresh.
pub struct ConfigProvider {
    root: PathBuf,
}

impl ConfigProvider {
    /// Create a provider that looks for config files in `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage root searched for config files
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load and validate configuration from all sources
    pub fn load(&self) -> ConfigResult<EngineConfig> {
        let config: EngineConfig = self.figment().extract()?;
        config.validate()?;
        debug!(
            root = %self.root.display(),
            id_prefix = %config.id_prefix,
            id_width = config.id_width,
            "loaded engine configuration"
        );
        Ok(config)
    }

    /// Build the figment with all sources in precedence order
    ///
    /// Later sources override earlier ones:
    /// 1. Defaults
    /// 2. `boardkeeper.toml`, `boardkeeper.json`, `boardkeeper.yaml`, `boardkeeper.yml`
    /// 3. `BOARDKEEPER_*` environment variables
    pub fn figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(EngineConfig::default()));

        for path in self.discover_files() {
            trace!("merging config file {}", path.display());
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file(&path)),
                Some("json") => figment.merge(Json::file(&path)),
                _ => figment.merge(Yaml::file(&path)),
            };
        }

        figment.merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().into()))
    }

    /// Config files present in the root, lowest priority first
    fn discover_files(&self) -> Vec<PathBuf> {
        ["toml", "json", "yaml", "yml"]
            .iter()
            .map(|ext| self.root.join(format!("{CONFIG_FILE_STEM}.{ext}")))
            .filter(|path| path.is_file())
            .collect()
    }
}
