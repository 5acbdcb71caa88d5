// This file is part of the product TagEdit.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::cli::{CliCommand, CliError, Command, Domain};

pub const DOMAIN: Domain = Domain {
    name: "db",
    aliases: &[],
    summary: "the database file as a whole",
    commands: &[
        Command {
            name: "check",
            aliases: &[],
            args: "",
            about: "load the file and report the tag count",
            parser: parse_check,
        },
        Command {
            name: "next-id",
            aliases: &["nextid"],
            args: "",
            about: "print the id the next added tag gets",
            parser: parse_next_id,
        },
    ],
};

fn parse_check(args: &[String]) -> Result<CliCommand, CliError> {
    no_args(args, "db check")?;
    Ok(CliCommand::DbCheck)
}

fn parse_next_id(args: &[String]) -> Result<CliCommand, CliError> {
    no_args(args, "db next-id")?;
    Ok(CliCommand::DbNextId)
}

fn no_args(args: &[String], command: &str) -> Result<(), CliError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CliError::usage(format!(
            "{} does not take any arguments",
            command
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_reject_arguments() {
        let extra = vec!["extra".to_string()];
        assert!(parse_check(&extra).is_err());
        assert!(parse_next_id(&extra).is_err());
        assert_eq!(parse_next_id(&[]).unwrap(), CliCommand::DbNextId);
    }
}
