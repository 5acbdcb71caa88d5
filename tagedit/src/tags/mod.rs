// This file is part of the product TagEdit.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod codec;
pub mod errors;
pub mod index;
pub mod record;
pub mod service;
pub(crate) mod store;

pub use errors::{TagError, TagErrorKind, TagResult};
pub use index::NameIndex;
pub use record::{
    FieldValue, NEW_TAG_FIELD_COUNT, NewTag, NexusKind, NexusLinks, TagDatabase, TagField, TagId,
    TagRecord, empty_record,
};
pub use service::{Outcome, ServiceResult, TagEntry, TagService, TagSummary};
