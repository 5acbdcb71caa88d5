// This file is part of the product TagEdit.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Line-oriented interactive editor over any reader/writer pair.
//!
//! The database is loaded before the first prompt. Every command reports
//! failures on the output and the loop keeps going; only `exit`, `quit`
//! and end of input leave it.

use crate::cli::parse_utils::{parse_field_value, parse_rows};
use crate::cli::render_entry;
use crate::config::ValidatedConfig;
use crate::tags::{TagError, TagService};
use crate::util::words::split_words;
use log::{debug, warn};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const PROMPT: &str = "$ ";
const CONFIRM_QUESTION: &str = "Are you sure you want to continue? [Y/n]";

const HELP: &[(&str, &str)] = &[
    ("help", "Show this list."),
    ("load", "Load the tag database into memory."),
    ("unload", "Unload the database without saving."),
    ("save", "Save changes to the database."),
    ("list", "List all tags."),
    ("printtag <tag>", "Print one tag (alias: show)."),
    (
        "add <beth> <gems> <category> <tag> <steam> <name> [...]",
        "Add tags, six fields each; \"\" leaves a field empty.",
    ),
    ("delete <tag>...", "Delete tags; nothing is deleted if one is missing."),
    ("edit <tag> <attribute> <value>...", "Overwrite one attribute of a tag."),
    ("nextid", "Show the next free tag id."),
    ("exit", "Leave the editor (alias: quit)."),
];

enum Flow {
    Continue,
    Stop,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Clean,
    /// Input ended at the unsaved-changes question; the changes were dropped.
    DiscardedUnanswered,
}

pub struct Shell<R, W> {
    service: TagService,
    database_path: PathBuf,
    input: R,
    output: W,
    ended: SessionEnd,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(config: &ValidatedConfig, input: R, output: W) -> Self {
        Self {
            service: TagService::with_history_limit(config.history_limit),
            database_path: config.database_path.clone(),
            input,
            output,
            ended: SessionEnd::Clean,
        }
    }

    pub fn run(&mut self) -> io::Result<SessionEnd> {
        writeln!(self.output, "Tag Editor")?;
        writeln!(self.output, "Show commands with `help`")?;
        debug!("preloop");
        self.load()?;

        loop {
            write!(self.output, "{}", PROMPT)?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                writeln!(self.output)?;
                if let Flow::Stop = self.exit()? {
                    return Ok(self.ended);
                }
                continue;
            };
            if let Flow::Stop = self.execute_line(&line)? {
                return Ok(self.ended);
            }
        }
    }

    fn execute_line(&mut self, line: &str) -> io::Result<Flow> {
        let words = match split_words(line) {
            Ok(words) => words,
            Err(message) => {
                self.error(&message)?;
                return Ok(Flow::Continue);
            }
        };
        let Some((command, args)) = words.split_first() else {
            return Ok(Flow::Continue);
        };

        match command.to_ascii_lowercase().as_str() {
            "help" | "?" => self.help()?,
            "load" => self.load()?,
            "unload" => self.unload()?,
            "save" => self.save()?,
            "list" => self.list()?,
            "printtag" | "show" => self.print_tag(args)?,
            "add" => self.add(args)?,
            "delete" => self.delete(args)?,
            "edit" => self.edit(args)?,
            "nextid" => self.next_id()?,
            "exit" | "quit" => return self.exit(),
            _ => self.error(&format!("Unknown command `{}`", line.trim()))?,
        }
        Ok(Flow::Continue)
    }

    fn help(&mut self) -> io::Result<()> {
        for (usage, description) in HELP {
            writeln!(self.output, "  {:<58} {}", usage, description)?;
        }
        Ok(())
    }

    fn load(&mut self) -> io::Result<()> {
        if self.service.is_loaded() {
            return self.error("The database is already loaded!");
        }
        let result = self.service.load(&self.database_path);
        self.report(result.map(|outcome| outcome.message))
    }

    fn unload(&mut self) -> io::Result<()> {
        if !self.service.is_loaded() {
            return self.report_error(&TagError::not_loaded());
        }
        if !self.confirm_discard()? {
            return writeln!(self.output, "Canceled.");
        }
        let result = self.service.unload();
        self.report(result.map(|outcome| outcome.message))
    }

    fn save(&mut self) -> io::Result<()> {
        let result = self.service.save(&self.database_path);
        self.report(result.map(|outcome| outcome.message))
    }

    fn list(&mut self) -> io::Result<()> {
        match self.service.list() {
            Ok(outcome) => {
                for name in outcome.value {
                    writeln!(self.output, "{}", name)?;
                }
                Ok(())
            }
            Err(err) => self.report_error(&err),
        }
    }

    fn print_tag(&mut self, args: &[String]) -> io::Result<()> {
        if args.is_empty() {
            return self.error("Usage: printtag <tag>");
        }
        let token = args.join(" ");
        match self.service.get(&token) {
            Ok(outcome) => self.output.write_all(render_entry(&outcome.value).as_bytes()),
            Err(err) => self.report_error(&err),
        }
    }

    fn add(&mut self, args: &[String]) -> io::Result<()> {
        if args.is_empty() {
            return self.error("Usage: add <beth> <gems> <category> <tag> <steam> <name> [...]");
        }
        match self.service.add(&parse_rows(args)) {
            Ok(outcome) => {
                for id in outcome.value.iter() {
                    writeln!(self.output, "{}", id)?;
                }
                writeln!(self.output, "{}", outcome.message)
            }
            Err(err) => self.report_error(&err),
        }
    }

    fn delete(&mut self, args: &[String]) -> io::Result<()> {
        if args.is_empty() {
            return self.error("Usage: delete <tag>...");
        }
        let result = self.service.delete(args);
        self.report(result.map(|outcome| outcome.message))
    }

    fn edit(&mut self, args: &[String]) -> io::Result<()> {
        if args.len() < 3 {
            return self.error("Usage: edit <tag> <attribute> <value>...");
        }
        let value = match parse_field_value(&args[1], &args[2..]) {
            Ok(value) => value,
            Err(err) => return self.error(&err.to_string()),
        };
        let result = self.service.edit(&args[0], &args[1], value);
        self.report(result.map(|outcome| outcome.message))
    }

    fn next_id(&mut self) -> io::Result<()> {
        match self.service.next_free_identifier() {
            Ok(outcome) => writeln!(self.output, "{}", outcome.value),
            Err(err) => self.report_error(&err),
        }
    }

    fn exit(&mut self) -> io::Result<Flow> {
        if self.confirm_discard()? {
            writeln!(self.output, "Bye!")?;
            Ok(Flow::Stop)
        } else {
            writeln!(self.output, "Canceled.")?;
            Ok(Flow::Continue)
        }
    }

    /// True when there is nothing to lose or the user agreed to lose it.
    /// End of input while asking drops the changes and marks the session.
    fn confirm_discard(&mut self) -> io::Result<bool> {
        if !self.service.changed_since_baseline() {
            return Ok(true);
        }
        warn!("unsaved changes to {}", self.database_path.display());
        writeln!(self.output, "You have unsaved changes!")?;
        writeln!(self.output, "{}", CONFIRM_QUESTION)?;
        self.output.flush()?;
        match self.read_line()? {
            Some(answer) => Ok(is_confirmation(&answer)),
            None => {
                warn!(
                    "input ended without an answer; discarding changes to {}",
                    self.database_path.display()
                );
                writeln!(self.output)?;
                writeln!(self.output, "No answer; unsaved changes were discarded.")?;
                self.ended = SessionEnd::DiscardedUnanswered;
                Ok(true)
            }
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn report(&mut self, result: Result<String, TagError>) -> io::Result<()> {
        match result {
            Ok(message) => writeln!(self.output, "{}", message),
            Err(err) => self.report_error(&err),
        }
    }

    fn report_error(&mut self, err: &TagError) -> io::Result<()> {
        debug!("{} failure: {}", err.kind().label(), err);
        self.error(err.message())
    }

    fn error(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "error: {}", message)
    }
}

/// Empty or any prefix of "yes", ignoring case.
fn is_confirmation(answer: &str) -> bool {
    "yes".starts_with(&answer.trim().to_ascii_lowercase())
}

/// Runs the editor on stdin and stdout.
pub fn run_stdio(config: &ValidatedConfig) -> io::Result<SessionEnd> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    Shell::new(config, stdin.lock(), stdout.lock()).run()
}
