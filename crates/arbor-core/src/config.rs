//! Configuration for routers and the `arbor` driver, loaded from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CoreError;

/// Full Arbor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ArborConfig {
    /// Traversal limits and topology strictness.
    #[serde(default)]
    pub routing: RoutingSettings,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingSettings {
    /// Maximum number of hops a single routing attempt may take.
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,
    /// Fail with a loop error as soon as a node is visited twice.
    #[serde(default = "default_true")]
    pub detect_loops: bool,
    /// Reject children whose address does not extend their parent's.
    #[serde(default)]
    pub strict_topology: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_max_hops() -> usize {
    256
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
            detect_loops: true,
            strict_topology: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ArborConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, CoreError> {
        let config: ArborConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a TOML file, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Save the config to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let contents = toml::to_string_pretty(self)?;
        let io_err = |source| CoreError::ConfigIo {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, contents).map_err(io_err)?;
        Ok(())
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.routing.max_hops == 0 {
            return Err(CoreError::InvalidConfig {
                field: "routing.max_hops",
                reason: "must be at least 1".into(),
            });
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(CoreError::InvalidConfig {
                field: "logging.format",
                reason: format!("expected \"text\" or \"json\", got {:?}", self.logging.format),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ArborConfig::default();
        assert_eq!(config.routing.max_hops, 256);
        assert!(config.routing.detect_loops);
        assert!(!config.routing.strict_topology);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = ArborConfig::from_toml_str(
            r#"
[routing]
max_hops = 12
"#,
        )
        .unwrap();
        assert_eq!(config.routing.max_hops, 12);
        assert!(config.routing.detect_loops);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(ArborConfig::from_toml_str("").unwrap(), ArborConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = ArborConfig::from_toml_str("[routing]\nmax_hops = 0\n").unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { field: "routing.max_hops", .. }));

        let err = ArborConfig::from_toml_str("[logging]\nformat = \"xml\"\n").unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { field: "logging.format", .. }));

        assert!(matches!(
            ArborConfig::from_toml_str("[routing]\nmax_hops = \"many\"\n"),
            Err(CoreError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("arbor-config-{}", std::process::id()));
        let path = dir.join("arbor.toml");

        let mut config = ArborConfig::default();
        config.routing.strict_topology = true;
        config.logging.level = "debug".into();
        config.save(&path).unwrap();

        let loaded = ArborConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = Path::new("/nonexistent/arbor/arbor.toml");
        assert_eq!(ArborConfig::load(path).unwrap(), ArborConfig::default());
    }
}
