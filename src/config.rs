// file: src/config.rs
// description: application configuration management with toml and environment support
// reference: https://docs.rs/config

use crate::error::{AdapterError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the Recoll configuration directory.
pub const RECOLL_CONFDIR_ENV: &str = "RECOLL_CONFDIR";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub index: IndexConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Recoll configuration directory. Falls back to `$RECOLL_CONFDIR`,
    /// then to `~/.recoll`.
    pub confdir: Option<PathBuf>,
    /// Overrides the database location read from `recoll.conf`.
    pub dbdir: Option<PathBuf>,
    pub recollq_path: PathBuf,
    pub query_timeout_secs: u64,
    /// Stemming language passed to the engine; unset keeps its default.
    #[serde(default)]
    pub stemming_language: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    pub default_max_results: usize,
    pub max_results_ceiling: usize,
    pub snippet_chars: usize,
    pub content_max_chars: usize,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| AdapterError::Config(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder
                .add_source(config::File::from(Path::new("config/default.toml")).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("RECOLL_MCP")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| AdapterError::Config(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| AdapterError::Config(e.to_string()))?;

        if let Some(confdir) = std::env::var_os(RECOLL_CONFDIR_ENV).filter(|v| !v.is_empty()) {
            config.index.confdir = Some(PathBuf::from(confdir));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            index: IndexConfig {
                confdir: None,
                dbdir: None,
                recollq_path: PathBuf::from("recollq"),
                query_timeout_secs: 30,
                stemming_language: None,
            },
            limits: LimitsConfig {
                default_max_results: 20,
                max_results_ceiling: 100,
                snippet_chars: 300,
                content_max_chars: 10_000,
            },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.index.query_timeout_secs == 0 {
            return Err(AdapterError::Config(
                "query_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.limits.max_results_ceiling == 0 {
            return Err(AdapterError::Config(
                "max_results_ceiling must be greater than 0".to_string(),
            ));
        }

        if self.limits.default_max_results == 0
            || self.limits.default_max_results > self.limits.max_results_ceiling
        {
            return Err(AdapterError::Config(format!(
                "default_max_results must be between 1 and {}",
                self.limits.max_results_ceiling
            )));
        }

        if self.limits.snippet_chars == 0 || self.limits.content_max_chars == 0 {
            return Err(AdapterError::Config(
                "snippet_chars and content_max_chars must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl IndexConfig {
    /// Resolves the Recoll configuration directory: explicit setting first,
    /// then the engine's default location.
    pub fn resolve_confdir(&self) -> Result<PathBuf> {
        if let Some(confdir) = &self.confdir {
            return Ok(expand_home(confdir));
        }

        dirs::home_dir()
            .map(|home| home.join(".recoll"))
            .ok_or_else(|| {
                AdapterError::IndexUnavailable(
                    "no Recoll configuration directory set and no home directory found"
                        .to_string(),
                )
            })
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.limits.default_max_results, 20);
        assert_eq!(config.index.query_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_validate_rejects_default_above_ceiling() {
        let mut config = Config::default_config();
        config.limits.default_max_results = 500;
        assert!(matches!(config.validate(), Err(AdapterError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default_config();
        config.index.query_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");
        std::fs::write(
            &path,
            "[index]\nconfdir = \"/srv/recoll\"\nrecollq_path = \"/usr/bin/recollq\"\nquery_timeout_secs = 5\n\n[limits]\ndefault_max_results = 10\nmax_results_ceiling = 50\nsnippet_chars = 120\ncontent_max_chars = 2000\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.index.query_timeout_secs, 5);
        assert_eq!(config.limits.max_results_ceiling, 50);
        if std::env::var_os(RECOLL_CONFDIR_ENV).is_none() {
            assert_eq!(config.index.confdir, Some(PathBuf::from("/srv/recoll")));
        }
    }

    #[test]
    fn test_resolve_confdir_prefers_explicit_setting() {
        let mut index = Config::default_config().index;
        index.confdir = Some(PathBuf::from("/srv/recoll"));
        assert_eq!(index.resolve_confdir().unwrap(), PathBuf::from("/srv/recoll"));
    }

    #[test]
    fn test_expand_home_leaves_absolute_paths() {
        assert_eq!(expand_home(Path::new("/etc/recoll")), PathBuf::from("/etc/recoll"));
    }
}
