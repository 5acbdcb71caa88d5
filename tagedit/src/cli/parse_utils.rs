// This file is part of the product TagEdit.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::CliError;
use crate::tags::{FieldValue, NEW_TAG_FIELD_COUNT, NexusKind, NexusLinks, TagField};

pub(crate) fn parse_required_arg<'a>(
    args: &'a [String],
    label: &str,
) -> Result<(String, &'a [String]), CliError> {
    if args.is_empty() {
        return Err(CliError::usage(format!("Missing {}", label)));
    }
    Ok((args[0].clone(), &args[1..]))
}

/// Groups add arguments into rows of six. A short trailing row is kept so the
/// service can reject the batch.
pub(crate) fn parse_rows(args: &[String]) -> Vec<Vec<String>> {
    args.chunks(NEW_TAG_FIELD_COUNT)
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Builds the edit value for `attribute` from the remaining words.
/// Unknown attributes fall through as text so the service reports them.
pub(crate) fn parse_field_value(attribute: &str, values: &[String]) -> Result<FieldValue, CliError> {
    match TagField::parse(attribute) {
        Some(TagField::Name) => Ok(FieldValue::Text(values.join(" "))),
        Some(TagField::Beth | TagField::Gems | TagField::Steam) => Ok(FieldValue::List(
            values
                .iter()
                .filter(|value| !value.is_empty())
                .cloned()
                .collect(),
        )),
        Some(TagField::Nexus) => parse_nexus_links(values).map(FieldValue::Nexus),
        None => Ok(FieldValue::Text(values.join(" "))),
    }
}

fn parse_nexus_links(values: &[String]) -> Result<NexusLinks, CliError> {
    let mut links = NexusLinks::default();
    for value in values.iter().filter(|value| !value.is_empty()) {
        let (kind, text) = value.split_once(':').ok_or_else(|| {
            CliError::usage(format!(
                "Nexus values look like category:<text> or tag:<text>, got '{}'",
                value
            ))
        })?;
        let kind = NexusKind::parse(kind).ok_or_else(|| {
            CliError::usage(format!("Unknown nexus link type '{}'", kind))
        })?;
        if !text.is_empty() {
            links.push(kind, text.to_string());
        }
    }
    Ok(links)
}
