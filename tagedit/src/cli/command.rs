// This file is part of the product TagEdit.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::CliError;
use crate::config::ValidatedConfig;
use crate::tags::{FieldValue, TagEntry, TagService};
use log::debug;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    TagList,
    TagShow {
        tokens: Vec<String>,
    },
    TagAdd {
        rows: Vec<Vec<String>>,
    },
    TagDelete {
        tokens: Vec<String>,
    },
    TagEdit {
        token: String,
        attribute: String,
        value: FieldValue,
    },
    DbCheck,
    DbNextId,
}

/// Loads the configured database, runs `command`, and saves when the command
/// changed anything.
pub fn execute(
    config: &ValidatedConfig,
    command: CliCommand,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let mut service = TagService::with_history_limit(config.history_limit);
    service.load(&config.database_path)?;
    run_command(&mut service, command, out)?;

    if service.changed_since_baseline() {
        let saved = service.save(&config.database_path)?;
        debug!("{}", saved.message);
    }
    Ok(())
}

fn run_command(
    service: &mut TagService,
    command: CliCommand,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        CliCommand::TagList => {
            for summary in service.summaries()?.value {
                writeln!(out, "{}\t{}", summary.id, summary.name)?;
            }
        }
        CliCommand::TagShow { tokens } => {
            let mut entries = Vec::with_capacity(tokens.len());
            for token in tokens.iter() {
                entries.push(service.get(token)?.value);
            }
            for entry in entries.iter() {
                out.write_all(render_entry(entry).as_bytes())?;
            }
        }
        CliCommand::TagAdd { rows } => {
            for id in service.add(&rows)?.value {
                writeln!(out, "{}", id)?;
            }
        }
        CliCommand::TagDelete { tokens } => {
            let deleted = service.delete(&tokens)?;
            writeln!(out, "{}", deleted.message)?;
        }
        CliCommand::TagEdit {
            token,
            attribute,
            value,
        } => {
            let edited = service.edit(&token, &attribute, value)?;
            writeln!(out, "{}", edited.message)?;
        }
        CliCommand::DbCheck => {
            let indexed = service.rebuild_index()?;
            writeln!(out, "{} tags, {} names indexed", service.record_count(), indexed.value)?;
        }
        CliCommand::DbNextId => {
            writeln!(out, "{}", service.next_free_identifier()?.value)?;
        }
    }
    Ok(())
}

/// Multi-line rendering of one record, shared by the CLI and the shell.
pub fn render_entry(entry: &TagEntry) -> String {
    let record = &entry.record;
    let mut out = String::new();
    out.push_str(&format!("{}: {}\n", entry.id, record.name));
    push_values(&mut out, "beth", &record.beth);
    push_values(&mut out, "gems", &record.gems);
    push_values(&mut out, "nexus category", &record.nexus.category);
    push_values(&mut out, "nexus tag", &record.nexus.tag);
    push_values(&mut out, "steam", &record.steam);
    out
}

fn push_values(out: &mut String, label: &str, values: &[String]) {
    if values.is_empty() {
        out.push_str(&format!("  {}: -\n", label));
    } else {
        out.push_str(&format!("  {}: {}\n", label, values.join(", ")));
    }
}
