// This file is part of the product TagEdit.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagErrorKind {
    NotLoaded,
    NotFound,
    DuplicateIdentifier,
    DuplicateName,
    InvalidRecordShape,
    UnknownAttribute,
    MalformedInput,
    PersistenceError,
}

impl TagErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            TagErrorKind::NotLoaded => "not loaded",
            TagErrorKind::NotFound => "not found",
            TagErrorKind::DuplicateIdentifier => "duplicate identifier",
            TagErrorKind::DuplicateName => "duplicate name",
            TagErrorKind::InvalidRecordShape => "invalid record shape",
            TagErrorKind::UnknownAttribute => "unknown attribute",
            TagErrorKind::MalformedInput => "malformed input",
            TagErrorKind::PersistenceError => "persistence error",
        }
    }
}

#[derive(Debug)]
pub struct TagError {
    kind: TagErrorKind,
    message: String,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl TagError {
    pub fn new(kind: TagErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn not_loaded() -> Self {
        Self::new(TagErrorKind::NotLoaded, "The database is not loaded!")
    }

    pub fn not_found(token: &str) -> Self {
        Self::new(TagErrorKind::NotFound, format!("No such tag \"{}\"", token))
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(TagErrorKind::MalformedInput, message)
    }

    pub fn kind(&self) -> TagErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for TagError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn Error + 'static))
    }
}

pub type TagResult<T> = Result<T, TagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_is_exposed() {
        let io = std::io::Error::other("disk full");
        let err = TagError::new(TagErrorKind::PersistenceError, "write failed").with_source(io);
        assert_eq!(err.kind(), TagErrorKind::PersistenceError);
        assert_eq!(err.to_string(), "write failed");
        assert!(err.source().unwrap().to_string().contains("disk full"));
    }
}
