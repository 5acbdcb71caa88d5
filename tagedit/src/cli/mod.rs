// This file is part of the product TagEdit.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! One-shot commands: `tagedit <domain> <command> [args...]`.
//!
//! Domain and command words are matched case-insensitively, first exactly
//! (name or alias) and then as a unique prefix.

pub mod command;
pub mod db;
pub(crate) mod parse_utils;
pub mod tags;

use crate::config::ValidatedConfig;
use crate::tags::TagError;
pub use command::{CliCommand, execute, render_entry};
use std::fmt;
use std::io::Write;

/// A failed command. `Usage` exits 2, `Operation` exits 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    Usage(String),
    Operation(String),
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        CliError::Usage(message.into())
    }

    pub fn operation(message: impl Into<String>) -> Self {
        CliError::Operation(message.into())
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 2,
            CliError::Operation(_) => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Usage(message) | CliError::Operation(message) => f.write_str(message),
        }
    }
}

impl From<TagError> for CliError {
    fn from(err: TagError) -> Self {
        log::debug!("{} failure: {}", err.kind().label(), err);
        CliError::operation(err.message())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::operation(format!("Failed to write output: {}", err))
    }
}

pub type Parser = fn(&[String]) -> Result<CliCommand, CliError>;

/// A group of commands under one leading word (`tag`, `db`).
pub struct Domain {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub summary: &'static str,
    pub commands: &'static [Command],
}

pub struct Command {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// Argument synopsis after `<domain> <command>`.
    pub args: &'static str,
    pub about: &'static str,
    pub parser: Parser,
}

pub static DOMAINS: &[Domain] = &[tags::DOMAIN, db::DOMAIN];

trait Keyword {
    fn name(&self) -> &'static str;
    fn aliases(&self) -> &'static [&'static str];

    fn words(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.name()).chain(self.aliases().iter().copied())
    }
}

impl Keyword for Domain {
    fn name(&self) -> &'static str {
        self.name
    }

    fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }
}

impl Keyword for Command {
    fn name(&self) -> &'static str {
        self.name
    }

    fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }
}

fn lookup<'a, T: Keyword>(items: &'a [T], token: &str, what: &str) -> Result<&'a T, CliError> {
    if let Some(item) = items
        .iter()
        .find(|item| item.words().any(|word| word.eq_ignore_ascii_case(token)))
    {
        return Ok(item);
    }

    let prefix = token.to_ascii_lowercase();
    let candidates: Vec<&T> = items
        .iter()
        .filter(|item| item.words().any(|word| word.starts_with(&prefix)))
        .collect();
    match candidates.as_slice() {
        [item] => Ok(*item),
        [] => Err(CliError::usage(format!("Unknown {} '{}'", what, token))),
        several => {
            let names: Vec<&str> = several.iter().map(|item| item.name()).collect();
            Err(CliError::usage(format!(
                "Ambiguous {} '{}' (could be {})",
                what,
                token,
                names.join(", ")
            )))
        }
    }
}

/// Turns `<domain> <command> [args...]` into a command.
pub fn parse_command(tokens: &[String]) -> Result<CliCommand, CliError> {
    let Some((domain_token, rest)) = tokens.split_first() else {
        return Err(CliError::usage("Missing command domain"));
    };
    let domain = lookup(DOMAINS, domain_token, "domain")?;

    let Some((command_token, args)) = rest.split_first() else {
        let names: Vec<&str> = domain.commands.iter().map(|command| command.name).collect();
        return Err(CliError::usage(format!(
            "Missing {} command; one of: {}",
            domain.name,
            names.join(", ")
        )));
    };
    let command = lookup(domain.commands, command_token, &format!("{} command", domain.name))?;
    (command.parser)(args)
}

fn synopsis(domain: &Domain, command: &Command) -> String {
    if command.args.is_empty() {
        format!("{} {}", domain.name, command.name)
    } else {
        format!("{} {} {}", domain.name, command.name, command.args)
    }
}

pub fn help_text() -> String {
    let width = DOMAINS
        .iter()
        .flat_map(|domain| domain.commands.iter().map(|command| synopsis(domain, command).len()))
        .max()
        .unwrap_or(0);

    let mut out = String::from(
        "tagedit: edit the tag database\n\
         \n\
         Usage: tagedit [-C <root>] [-v] [<domain> <command> [args...]]\n\
         \x20      tagedit [-C <root>] init\n\
         \x20      tagedit help\n\
         \n\
         With no command, an interactive editor opens on the configured database.\n\
         \n\
         Options:\n\
         \x20 -C <root>   runtime root holding config.yaml (default: .)\n\
         \x20 -v          log at debug level\n\
         \x20 -h, --help  show this help\n",
    );

    for domain in DOMAINS {
        out.push('\n');
        out.push_str(domain.name);
        if !domain.aliases.is_empty() {
            out.push_str(&format!(" ({})", domain.aliases.join(", ")));
        }
        out.push_str(&format!(": {}\n", domain.summary));
        for command in domain.commands {
            let line = synopsis(domain, command);
            out.push_str(&format!("  {:width$}  {}\n", line, command.about));
            if !command.aliases.is_empty() {
                out.push_str(&format!("  {:width$}  also: {}\n", "", command.aliases.join(", ")));
            }
        }
    }

    out.push_str(
        "\nWords may be abbreviated to any unique prefix. \
         <tag> is a numeric id or an exact name.\n",
    );
    out
}

/// Resolves and runs one command; returns the process exit code.
pub fn run_cli(
    config: &ValidatedConfig,
    tokens: &[String],
    out: &mut dyn Write,
    err_out: &mut dyn Write,
) -> i32 {
    let result = parse_command(tokens).and_then(|command| execute(config, command, out));
    match result {
        Ok(()) => 0,
        Err(err) => {
            let _ = writeln!(err_out, "{}", err);
            err.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn parse(values: &[&str]) -> Result<CliCommand, CliError> {
        parse_command(&tokens(values))
    }

    #[test]
    fn words_are_case_insensitive() {
        assert_eq!(parse(&["TAG", "List"]).unwrap(), CliCommand::TagList);
        assert_eq!(parse(&["Db", "NEXTID"]).unwrap(), CliCommand::DbNextId);
    }

    #[test]
    fn aliases_resolve_like_names() {
        assert_eq!(
            parse(&["t", "rm", "7"]).unwrap(),
            CliCommand::TagDelete {
                tokens: tokens(&["7"])
            }
        );
        assert_eq!(
            parse(&["tag", "get", "Armour"]).unwrap(),
            CliCommand::TagShow {
                tokens: tokens(&["Armour"])
            }
        );
    }

    #[test]
    fn unique_prefixes_resolve() {
        assert_eq!(parse(&["ta", "li"]).unwrap(), CliCommand::TagList);
        assert_eq!(parse(&["d", "n"]).unwrap(), CliCommand::DbNextId);
        assert_eq!(parse(&["db", "ch"]).unwrap(), CliCommand::DbCheck);
        assert_eq!(
            parse(&["t", "pr", "1"]).unwrap(),
            CliCommand::TagShow {
                tokens: tokens(&["1"])
            }
        );
    }

    #[test]
    fn a_prefix_of_a_name_and_its_alias_is_one_match() {
        assert_eq!(parse(&["db", "next"]).unwrap(), CliCommand::DbNextId);
    }

    #[test]
    fn empty_command_word_is_ambiguous() {
        let err = parse(&["tag", ""]).unwrap_err();
        assert_eq!(
            err,
            CliError::usage(
                "Ambiguous tag command '' (could be add, delete, edit, list, show)"
            )
        );
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn unknown_words_are_usage_errors() {
        let err = parse(&["frob", "list"]).unwrap_err();
        assert_eq!(err, CliError::usage("Unknown domain 'frob'"));

        let err = parse(&["db", "vacuum"]).unwrap_err();
        assert_eq!(err, CliError::usage("Unknown db command 'vacuum'"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_words_are_usage_errors() {
        assert_eq!(
            parse(&[]).unwrap_err(),
            CliError::usage("Missing command domain")
        );
        assert_eq!(
            parse(&["db"]).unwrap_err(),
            CliError::usage("Missing db command; one of: check, next-id")
        );
    }

    #[test]
    fn command_arguments_reach_the_parser() {
        let err = parse(&["tag", "list", "extra"]).unwrap_err();
        assert!(err.to_string().contains("does not take"));
    }

    #[test]
    fn no_word_is_claimed_twice() {
        let mut domain_words = BTreeSet::new();
        for domain in DOMAINS {
            for word in domain.words() {
                assert!(domain_words.insert(word), "domain word {} reused", word);
            }
            let mut command_words = BTreeSet::new();
            for command in domain.commands {
                for word in command.words() {
                    assert_eq!(word, word.to_ascii_lowercase());
                    assert!(
                        command_words.insert(word),
                        "{} command word {} reused",
                        domain.name,
                        word
                    );
                }
            }
        }
    }

    #[test]
    fn help_lists_every_command_with_its_aliases() {
        let help = help_text();
        assert!(help.contains("\ntag (t): "));
        assert!(help.contains("\ndb: "));
        assert!(help.contains("tag edit <tag> <attribute> <value>..."));
        assert!(help.contains("also: rm"));
        assert!(help.contains("also: print, get"));
        for domain in DOMAINS {
            for command in domain.commands {
                assert!(help.contains(&format!("{} {}", domain.name, command.name)));
            }
        }
    }

    #[test]
    fn tag_errors_become_operation_failures() {
        let err = CliError::from(TagError::not_found("Ghost"));
        assert_eq!(err, CliError::operation("No such tag \"Ghost\""));
        assert_eq!(err.exit_code(), 1);
    }
}
