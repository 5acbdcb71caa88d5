// This file is part of the product TagEdit.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::tags::codec;
use crate::tags::errors::{TagError, TagErrorKind, TagResult};
use crate::tags::index::NameIndex;
use crate::tags::record::{FieldValue, NewTag, TagDatabase, TagField, TagId, TagRecord};
use crate::tags::store;
use log::{debug, info};
use std::collections::BTreeSet;
use std::path::Path;

/// Successful result of a service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub message: String,
    pub value: T,
}

impl<T> Outcome<T> {
    fn new(message: impl Into<String>, value: T) -> Self {
        Self {
            message: message.into(),
            value,
        }
    }
}

pub type ServiceResult<T> = Result<Outcome<T>, TagError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSummary {
    pub id: TagId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    pub id: TagId,
    pub record: TagRecord,
}

/// Owns one editing session: the loaded database, its name index and the
/// snapshots taken at each successful load or save.
#[derive(Debug, Default)]
pub struct TagService {
    database: Option<TagDatabase>,
    index: NameIndex,
    history: Vec<TagDatabase>,
    history_limit: usize,
}

impl TagService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `limit` snapshots; `0` keeps all of them.
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            history_limit: limit,
            ..Self::default()
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.database.is_some()
    }

    pub fn record_count(&self) -> usize {
        self.database.as_ref().map_or(0, |database| database.len())
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn load(&mut self, path: &Path) -> ServiceResult<usize> {
        debug!("loading the database from {}", path.display());
        let database = codec::decode_file(path)?;
        let index = NameIndex::build(&database)?;
        let count = database.len();
        self.record_snapshot(database.clone());
        self.database = Some(database);
        self.index = index;
        info!("Loaded {} tags from {}", count, path.display());
        Ok(Outcome::new(format!("Loaded {} tags", count), count))
    }

    pub fn save(&mut self, path: &Path) -> ServiceResult<usize> {
        let database = self.database.as_ref().ok_or_else(TagError::not_loaded)?;
        let index = NameIndex::build(database)?;
        let xml = codec::encode_database(database);
        store::write_file_atomic(path, &xml)?;
        let snapshot = database.clone();
        let count = snapshot.len();
        self.record_snapshot(snapshot);
        self.index = index;
        info!("Saved {} tags to {}", count, path.display());
        Ok(Outcome::new(format!("Saved {} tags", count), count))
    }

    pub fn unload(&mut self) -> ServiceResult<()> {
        if self.database.take().is_none() {
            return Err(TagError::not_loaded());
        }
        self.index = NameIndex::default();
        info!("Database unloaded");
        Ok(Outcome::new("Database unloaded", ()))
    }

    /// Accepts an identifier or a name.
    pub fn resolve(&self, token: &str) -> ServiceResult<TagId> {
        let id = self.resolve_id(token)?;
        Ok(Outcome::new(format!("\"{}\" is tag {}", token, id), id))
    }

    pub fn get(&self, token: &str) -> ServiceResult<TagEntry> {
        let database = self.loaded()?;
        let id = self.resolve_id(token)?;
        let record = database
            .get(&id)
            .cloned()
            .ok_or_else(|| TagError::not_found(token))?;
        Ok(Outcome::new(
            format!("Tag {} \"{}\"", id, record.name),
            TagEntry { id, record },
        ))
    }

    pub fn list(&self) -> ServiceResult<Vec<String>> {
        let names: Vec<String> = self
            .loaded()?
            .values()
            .map(|record| record.name.clone())
            .collect();
        Ok(Outcome::new(format!("{} tags", names.len()), names))
    }

    pub fn summaries(&self) -> ServiceResult<Vec<TagSummary>> {
        let summaries: Vec<TagSummary> = self
            .loaded()?
            .iter()
            .map(|(id, record)| TagSummary {
                id: *id,
                name: record.name.clone(),
            })
            .collect();
        Ok(Outcome::new(format!("{} tags", summaries.len()), summaries))
    }

    /// True when the loaded database differs from the snapshot of the last load or save.
    pub fn changed_since_baseline(&self) -> bool {
        match (&self.database, self.history.last()) {
            (Some(database), Some(baseline)) => database != baseline,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    pub fn rebuild_index(&mut self) -> ServiceResult<usize> {
        debug!("building id mapping");
        let index = NameIndex::build(self.loaded()?)?;
        let count = index.len();
        self.index = index;
        Ok(Outcome::new(format!("Indexed {} names", count), count))
    }

    pub fn next_free_identifier(&mut self) -> ServiceResult<TagId> {
        self.rebuild_index()?;
        let id = next_id(self.loaded()?)?;
        Ok(Outcome::new(format!("Next free id is {}", id), id))
    }

    /// Adds rows of `(beth, gems, nexus_category, nexus_tag, steam, name)`.
    /// The whole batch is validated before anything is inserted.
    pub fn add(&mut self, rows: &[Vec<String>]) -> ServiceResult<Vec<TagId>> {
        self.loaded()?;
        let mut records = Vec::with_capacity(rows.len());
        let mut batch_names = BTreeSet::new();
        for row in rows {
            let record = NewTag::from_row(row)?.into_record();
            if record.name.is_empty() {
                return Err(TagError::new(
                    TagErrorKind::InvalidRecordShape,
                    "A tag needs a non-empty name",
                ));
            }
            if self.index.contains_name(&record.name) || !batch_names.insert(record.name.clone())
            {
                return Err(TagError::new(
                    TagErrorKind::DuplicateName,
                    format!("Duplicate tag name: {}", record.name),
                ));
            }
            records.push(record);
        }

        let first = self.next_free_identifier()?.value;
        let mut assigned = Vec::with_capacity(records.len());
        for offset in 0..records.len() as u64 {
            let value = first
                .value()
                .checked_add(offset)
                .ok_or_else(id_space_exhausted)?;
            assigned.push(TagId::new(value));
        }

        let database = self.database.as_mut().ok_or_else(TagError::not_loaded)?;
        for (id, record) in assigned.iter().zip(records) {
            debug!("adding tag {} \"{}\"", id, record.name);
            database.insert(*id, record);
        }
        self.rebuild_index()?;
        Ok(Outcome::new(format!("Added {} tags", assigned.len()), assigned))
    }

    /// Removes every resolved tag, or none of them.
    pub fn delete(&mut self, tokens: &[String]) -> ServiceResult<Vec<TagId>> {
        self.loaded()?;
        let mut ids = Vec::with_capacity(tokens.len());
        for token in tokens {
            let id = self.resolve_id(token)?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        let database = self.database.as_mut().ok_or_else(TagError::not_loaded)?;
        for id in &ids {
            debug!("deleting tag {}", id);
            database.remove(id);
        }
        self.rebuild_index()?;
        Ok(Outcome::new(format!("Deleted {} tags", ids.len()), ids))
    }

    /// Overwrites one attribute of a tag with a value of the attribute's shape.
    pub fn edit(&mut self, token: &str, attribute: &str, value: FieldValue) -> ServiceResult<TagId> {
        self.loaded()?;
        let id = self.resolve_id(token)?;
        let field = TagField::parse(attribute).ok_or_else(|| {
            TagError::new(
                TagErrorKind::UnknownAttribute,
                format!("Tags have no attribute \"{}\"", attribute),
            )
        })?;
        if let (TagField::Name, FieldValue::Text(name)) = (field, &value)
            && let Some(owner) = self.index.get(name)
            && owner != id
        {
            return Err(TagError::new(
                TagErrorKind::DuplicateName,
                format!("Tag {} is already named \"{}\"", owner, name),
            ));
        }

        let database = self.database.as_mut().ok_or_else(TagError::not_loaded)?;
        let record = database.get_mut(&id).ok_or_else(|| TagError::not_found(token))?;
        let mut updated = record.clone();
        updated.set_field(field, value)?;
        *record = updated;
        debug!("edited {} of tag {}", field.as_str(), id);

        if field == TagField::Name {
            self.rebuild_index()?;
        }
        Ok(Outcome::new(
            format!("Updated {} of tag {}", field.as_str(), id),
            id,
        ))
    }

    fn loaded(&self) -> TagResult<&TagDatabase> {
        self.database.as_ref().ok_or_else(TagError::not_loaded)
    }

    fn resolve_id(&self, token: &str) -> TagResult<TagId> {
        let database = self.loaded()?;
        if let Some(id) = TagId::parse(token)
            && database.contains_key(&id)
        {
            return Ok(id);
        }
        match self.index.get(token) {
            Some(id) if database.contains_key(&id) => Ok(id),
            _ => Err(TagError::not_found(token)),
        }
    }

    fn record_snapshot(&mut self, snapshot: TagDatabase) {
        self.history.push(snapshot);
        if self.history_limit > 0 && self.history.len() > self.history_limit {
            let excess = self.history.len() - self.history_limit;
            self.history.drain(..excess);
        }
    }
}

fn next_id(database: &TagDatabase) -> TagResult<TagId> {
    match database.keys().next_back() {
        Some(max) => max
            .value()
            .checked_add(1)
            .map(TagId::new)
            .ok_or_else(id_space_exhausted),
        None => Ok(TagId::new(1)),
    }
}

fn id_space_exhausted() -> TagError {
    TagError::new(
        TagErrorKind::InvalidRecordShape,
        "No identifiers left to assign",
    )
}
