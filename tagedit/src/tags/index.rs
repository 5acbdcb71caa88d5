// This file is part of the product TagEdit.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::tags::errors::{TagError, TagErrorKind, TagResult};
use crate::tags::record::{TagDatabase, TagId};
use std::collections::{BTreeMap, BTreeSet};

/// Name to identifier lookup derived from a database snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameIndex {
    names: BTreeMap<String, TagId>,
}

impl NameIndex {
    /// Fails on a repeated identifier or a name shared by two records.
    pub fn build(database: &TagDatabase) -> TagResult<Self> {
        Self::from_entries(database.iter().map(|(id, record)| (*id, record.name.as_str())))
    }

    pub(crate) fn from_entries<'a>(
        entries: impl IntoIterator<Item = (TagId, &'a str)>,
    ) -> TagResult<Self> {
        let mut names = BTreeMap::new();
        let mut ids = BTreeSet::new();
        for (id, name) in entries {
            if !ids.insert(id) {
                return Err(TagError::new(
                    TagErrorKind::DuplicateIdentifier,
                    format!("Duplicate tag ID: {}", id),
                ));
            }
            if names.insert(name.to_string(), id).is_some() {
                return Err(TagError::new(
                    TagErrorKind::DuplicateName,
                    format!("Duplicate tag name: {}", name),
                ));
            }
        }
        Ok(Self { names })
    }

    pub fn get(&self, name: &str) -> Option<TagId> {
        self.names.get(name).copied()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::record::empty_record;

    fn database(entries: &[(u64, &str)]) -> TagDatabase {
        entries
            .iter()
            .map(|(id, name)| {
                let mut record = empty_record();
                record.name = name.to_string();
                (TagId::new(*id), record)
            })
            .collect()
    }

    #[test]
    fn maps_names_to_ids() {
        let index = NameIndex::build(&database(&[(1, "Animation"), (4, "Armor")])).unwrap();
        assert_eq!(index.get("Armor"), Some(TagId::new(4)));
        assert_eq!(index.get("Animation"), Some(TagId::new(1)));
        assert_eq!(index.get("animation"), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn duplicate_names_fail() {
        let err = NameIndex::build(&database(&[(1, "Armor"), (2, "Armor")])).unwrap_err();
        assert_eq!(err.kind(), TagErrorKind::DuplicateName);
    }

    #[test]
    fn duplicate_ids_fail() {
        let err = NameIndex::from_entries([(TagId::new(1), "A"), (TagId::new(1), "B")])
            .unwrap_err();
        assert_eq!(err.kind(), TagErrorKind::DuplicateIdentifier);
    }

    #[test]
    fn empty_database_builds_empty_index() {
        assert!(NameIndex::build(&TagDatabase::new()).unwrap().is_empty());
    }
}
