// This file is part of the product TagEdit.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
    /// Maximum number of change-detection snapshots kept; 0 keeps all.
    #[serde(default)]
    pub history_limit: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            history_limit: 0,
        }
    }
}

fn default_database_path() -> String {
    "tags.xml".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub database_path: PathBuf,
    pub history_limit: usize,
    pub log_level: LevelFilter,
}

impl Config {
    /// Reads `config.yaml` from the runtime root. A missing file yields defaults.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&config_path).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to parse config file '{}': {}",
                config_path.display(),
                e
            ))
        })
    }

    pub fn load_and_validate(root: &Path) -> Result<ValidatedConfig, ConfigError> {
        Self::load(root)?.validate(root)
    }

    pub fn validate(self, root: &Path) -> Result<ValidatedConfig, ConfigError> {
        let path = self.database.path.trim();
        if path.is_empty() {
            return Err(ConfigError::ValidationError(
                "database.path cannot be empty".to_string(),
            ));
        }
        let path = PathBuf::from(path);
        let database_path = if path.is_absolute() {
            path
        } else {
            root.join(path)
        };

        Ok(ValidatedConfig {
            database_path,
            history_limit: self.database.history_limit,
            log_level: parse_log_level(&self.logging.level)?,
        })
    }
}

pub fn parse_log_level(level: &str) -> Result<LevelFilter, ConfigError> {
    match level.to_lowercase().as_str() {
        "off" => Ok(LevelFilter::Off),
        "trace" => Ok(LevelFilter::Trace),
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        other => Err(ConfigError::ValidationError(format!(
            "logging.level must be one of off, trace, debug, info, warn, error, got: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;

    #[test]
    fn missing_config_uses_defaults() {
        let fixture = TestFixtureRoot::new_unique("config-missing").unwrap();
        let validated = Config::load_and_validate(fixture.path()).unwrap();
        assert_eq!(validated.database_path, fixture.path().join("tags.xml"));
        assert_eq!(validated.history_limit, 0);
        assert_eq!(validated.log_level, LevelFilter::Warn);
    }

    #[test]
    fn reads_database_and_logging_sections() {
        let fixture = TestFixtureRoot::new_unique("config-read").unwrap();
        fs::write(
            fixture.path().join(CONFIG_FILE_NAME),
            "database:\n  path: \"data/bgm.xml\"\n  history_limit: 8\nlogging:\n  level: \"Debug\"\n",
        )
        .unwrap();
        let validated = Config::load_and_validate(fixture.path()).unwrap();
        assert_eq!(
            validated.database_path,
            fixture.path().join("data").join("bgm.xml")
        );
        assert_eq!(validated.history_limit, 8);
        assert_eq!(validated.log_level, LevelFilter::Debug);
    }

    #[test]
    fn rejects_unknown_level_and_empty_path() {
        let config = Config {
            logging: LoggingConfig {
                level: "loud".to_string(),
            },
            ..Config::default()
        };
        assert!(matches!(
            config.validate(Path::new(".")),
            Err(ConfigError::ValidationError(_))
        ));

        let config = Config {
            database: DatabaseConfig {
                path: "  ".to_string(),
                history_limit: 0,
            },
            ..Config::default()
        };
        assert!(matches!(
            config.validate(Path::new(".")),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn unparsable_config_is_a_load_error() {
        let fixture = TestFixtureRoot::new_unique("config-broken").unwrap();
        fs::write(fixture.path().join(CONFIG_FILE_NAME), "database: [").unwrap();
        assert!(matches!(
            Config::load(fixture.path()),
            Err(ConfigError::LoadError(_))
        ));
    }
}
