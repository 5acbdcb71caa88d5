// This file is part of the product TagEdit.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::tags::errors::{TagError, TagErrorKind, TagResult};
use std::ffi::OsStr;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const MAX_TEMP_ATTEMPTS: u32 = 100;

pub(crate) fn read_file(path: &Path) -> TagResult<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(TagError::new(
            TagErrorKind::NotFound,
            format!("Tag database {} does not exist", path.display()),
        )
        .with_source(err)),
        Err(err) => Err(TagError::new(
            TagErrorKind::MalformedInput,
            format!("Failed to read tag database {}: {}", path.display(), err),
        )
        .with_source(err)),
    }
}

/// Replaces `path` with `content` through a sibling temp file, so a failed
/// write leaves the previous file in place.
pub(crate) fn write_file_atomic(path: &Path, content: &str) -> TagResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| persistence(format!("{} has no file name", path.display())))?;
    let (mut file, temp_path) = create_temp_file(parent, file_name)?;

    if let Ok(metadata) = fs::metadata(path) {
        #[cfg(unix)]
        {
            if let Err(err) = fs::set_permissions(&temp_path, metadata.permissions()) {
                let _ = fs::remove_file(&temp_path);
                return Err(persistence(format!(
                    "Failed to set temp file permissions: {}",
                    err
                ))
                .with_source(err));
            }
        }
        #[cfg(not(unix))]
        let _ = metadata;
    }

    if let Err(err) = file.write_all(content.as_bytes()) {
        let _ = fs::remove_file(&temp_path);
        return Err(persistence(format!("Failed to write temp file: {}", err)).with_source(err));
    }
    if let Err(err) = file.sync_all() {
        let _ = fs::remove_file(&temp_path);
        return Err(persistence(format!("Failed to sync temp file: {}", err)).with_source(err));
    }
    drop(file);

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(persistence(format!(
            "Failed to replace {}: {}",
            path.display(),
            err
        ))
        .with_source(err));
    }

    #[cfg(unix)]
    {
        if let Err(err) = sync_parent_dir(parent) {
            log::warn!("Tag database directory sync failed: {}", err);
        }
    }

    Ok(())
}

fn create_temp_file(parent: &Path, file_name: &OsStr) -> TagResult<(fs::File, PathBuf)> {
    let file_name = file_name
        .to_str()
        .ok_or_else(|| persistence("Tag database file name is not valid UTF-8"))?;
    for attempt in 0..MAX_TEMP_ATTEMPTS {
        let temp_name = format!(".{}.tmp.{}.{}", file_name, std::process::id(), attempt);
        let temp_path = parent.join(temp_name);
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path);
        match file {
            Ok(file) => return Ok((file, temp_path)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(
                    persistence(format!("Failed to create temp file: {}", err)).with_source(err)
                );
            }
        }
    }
    Err(persistence(
        "Failed to create temp file after multiple attempts",
    ))
}

#[cfg(unix)]
fn sync_parent_dir(parent: &Path) -> Result<(), std::io::Error> {
    let dir = fs::File::open(parent)?;
    dir.sync_all()
}

fn persistence(message: impl Into<String>) -> TagError {
    TagError::new(TagErrorKind::PersistenceError, message)
}
