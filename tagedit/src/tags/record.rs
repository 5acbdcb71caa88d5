// This file is part of the product TagEdit.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::tags::errors::{TagError, TagErrorKind, TagResult};
use std::collections::BTreeMap;
use std::fmt;

/// Number of fields in a raw add row: beth, gems, nexus category, nexus tag, steam, name.
pub const NEW_TAG_FIELD_COUNT: usize = 6;

/// External key of a record. Always a canonical decimal integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagId(u64);

impl TagId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Parses a canonical identifier. `"7"` parses, `"07"`, `"+7"` and `"seven"` do not.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        if raw.len() > 1 && raw.starts_with('0') {
            return None;
        }
        raw.parse::<u64>().ok().map(TagId)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Keyed by identifier; iteration is ascending by numeric id.
pub type TagDatabase = BTreeMap<TagId, TagRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NexusKind {
    Category,
    Tag,
}

impl NexusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NexusKind::Category => "category",
            NexusKind::Tag => "tag",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "category" => Some(NexusKind::Category),
            "tag" => Some(NexusKind::Tag),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NexusLinks {
    pub category: Vec<String>,
    pub tag: Vec<String>,
}

impl NexusLinks {
    pub fn is_empty(&self) -> bool {
        self.category.is_empty() && self.tag.is_empty()
    }

    pub fn push(&mut self, kind: NexusKind, value: String) {
        match kind {
            NexusKind::Category => self.category.push(value),
            NexusKind::Tag => self.tag.push(value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRecord {
    pub name: String,
    pub beth: Vec<String>,
    pub gems: Vec<String>,
    pub nexus: NexusLinks,
    pub steam: Vec<String>,
}

/// A fresh record with an empty name and no links. Every call returns new storage.
pub fn empty_record() -> TagRecord {
    TagRecord::default()
}

impl TagRecord {
    /// Overwrites one field. The value must have the field's shape, except that a
    /// bare text value is accepted for a list field as a single entry. Empty
    /// entries are dropped, as they would be on the next load.
    pub fn set_field(&mut self, field: TagField, value: FieldValue) -> TagResult<()> {
        match (field, value) {
            (TagField::Name, FieldValue::Text(name)) => self.name = name,
            (TagField::Nexus, FieldValue::Nexus(links)) => {
                self.nexus = NexusLinks {
                    category: without_empty(links.category),
                    tag: without_empty(links.tag),
                };
            }
            (TagField::Beth | TagField::Gems | TagField::Steam, value) => {
                let entries = match value {
                    FieldValue::List(entries) => without_empty(entries),
                    FieldValue::Text(entry) => single(entry),
                    FieldValue::Nexus(_) => return Err(shape_mismatch(field)),
                };
                match field {
                    TagField::Beth => self.beth = entries,
                    TagField::Gems => self.gems = entries,
                    _ => self.steam = entries,
                }
            }
            (field, _) => return Err(shape_mismatch(field)),
        }
        Ok(())
    }
}

fn shape_mismatch(field: TagField) -> TagError {
    TagError::new(
        TagErrorKind::InvalidRecordShape,
        format!("Value has the wrong shape for attribute '{}'", field.as_str()),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    Name,
    Beth,
    Gems,
    Nexus,
    Steam,
}

impl TagField {
    pub const ALL: [TagField; 5] = [
        TagField::Beth,
        TagField::Gems,
        TagField::Nexus,
        TagField::Steam,
        TagField::Name,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TagField::Name => "name",
            TagField::Beth => "beth",
            TagField::Gems => "gems",
            TagField::Nexus => "nexus",
            TagField::Steam => "steam",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Nexus(NexusLinks),
}

/// A record to be added, before it has an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub beth: String,
    pub gems: String,
    pub nexus_category: String,
    pub nexus_tag: String,
    pub steam: String,
    pub name: String,
}

impl NewTag {
    /// Builds from a raw row in `(beth, gems, nexus_category, nexus_tag, steam, name)` order.
    pub fn from_row(row: &[String]) -> TagResult<Self> {
        if row.len() != NEW_TAG_FIELD_COUNT {
            return Err(TagError::new(
                TagErrorKind::InvalidRecordShape,
                format!(
                    "A tag needs exactly {} fields (beth, gems, category, tag, steam, name), got {}",
                    NEW_TAG_FIELD_COUNT,
                    row.len()
                ),
            ));
        }
        Ok(Self {
            beth: row[0].clone(),
            gems: row[1].clone(),
            nexus_category: row[2].clone(),
            nexus_tag: row[3].clone(),
            steam: row[4].clone(),
            name: row[5].clone(),
        })
    }

    /// Empty strings become empty sequences.
    pub fn into_record(self) -> TagRecord {
        let mut record = empty_record();
        record.name = self.name;
        record.beth = single(self.beth);
        record.gems = single(self.gems);
        record.nexus.category = single(self.nexus_category);
        record.nexus.tag = single(self.nexus_tag);
        record.steam = single(self.steam);
        record
    }
}

fn without_empty(mut entries: Vec<String>) -> Vec<String> {
    entries.retain(|entry| !entry.is_empty());
    entries
}

fn single(value: String) -> Vec<String> {
    if value.is_empty() {
        Vec::new()
    } else {
        vec![value]
    }
}
