// This file is part of the product TagEdit.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::{Config, ConfigError, ValidatedConfig};
use crate::tags::{TagDatabase, TagError, codec};
use std::error::Error;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

pub mod config;

#[derive(Debug)]
pub struct BootstrapResult {
    pub validated_config: ValidatedConfig,
    pub created_config: bool,
    pub created_database: bool,
}

#[derive(Debug)]
pub enum BootstrapError {
    Config(ConfigError),
    Io(std::io::Error),
    Tags(TagError),
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapError::Config(err) => write!(f, "{}", err),
            BootstrapError::Io(err) => write!(f, "Bootstrap I/O error: {}", err),
            BootstrapError::Tags(err) => write!(f, "Bootstrap tag database error: {}", err),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BootstrapError::Config(err) => Some(err),
            BootstrapError::Io(err) => Some(err),
            BootstrapError::Tags(err) => Some(err),
        }
    }
}

impl From<ConfigError> for BootstrapError {
    fn from(err: ConfigError) -> Self {
        BootstrapError::Config(err)
    }
}

impl From<std::io::Error> for BootstrapError {
    fn from(err: std::io::Error) -> Self {
        BootstrapError::Io(err)
    }
}

/// Creates a default `config.yaml` and an empty tag database when they are absent.
/// Existing files are never touched.
pub fn bootstrap_runtime(root: &Path) -> Result<BootstrapResult, BootstrapError> {
    let created_config = config::ensure_config(root)?;
    let validated_config = Config::load_and_validate(root)?;
    let created_database = ensure_database(&validated_config.database_path)?;

    Ok(BootstrapResult {
        validated_config,
        created_config,
        created_database,
    })
}

fn ensure_database(path: &Path) -> Result<bool, BootstrapError> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
        log_action(format!("created directory {}", parent.display()));
    }

    let contents = codec::encode_database(&TagDatabase::new());
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => return Err(BootstrapError::Io(err)),
    };
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;

    // The written template must decode.
    codec::decode_file(path).map_err(BootstrapError::Tags)?;
    log_action(format!("created empty tag database {}", path.display()));
    Ok(true)
}

pub(crate) fn log_action(message: impl AsRef<str>) {
    eprintln!("[bootstrap] {}", message.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;

    #[test]
    fn creates_config_and_database_once() {
        let fixture = TestFixtureRoot::new_unique("bootstrap-fresh").unwrap();
        let first = bootstrap_runtime(fixture.path()).unwrap();
        assert!(first.created_config);
        assert!(first.created_database);
        assert!(first.validated_config.database_path.exists());

        let second = bootstrap_runtime(fixture.path()).unwrap();
        assert!(!second.created_config);
        assert!(!second.created_database);
    }

    #[test]
    fn existing_database_is_left_alone() {
        let fixture = TestFixtureRoot::new_unique("bootstrap-existing").unwrap();
        let path = fixture.path().join("tags.xml");
        fs::write(&path, "<taglist></taglist>").unwrap();
        let result = bootstrap_runtime(fixture.path()).unwrap();
        assert!(!result.created_database);
        assert_eq!(fs::read_to_string(&path).unwrap(), "<taglist></taglist>");
    }
}
