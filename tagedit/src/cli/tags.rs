// This file is part of the product TagEdit.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::cli::parse_utils::{parse_field_value, parse_required_arg, parse_rows};
use crate::cli::{CliCommand, CliError, Command, Domain};

pub const DOMAIN: Domain = Domain {
    name: "tag",
    aliases: &["t"],
    summary: "records in the tag database",
    commands: &[
        Command {
            name: "add",
            aliases: &[],
            args: "<beth> <gems> <category> <tag> <steam> <name> [...]",
            about: "add one tag per six values",
            parser: parse_add,
        },
        Command {
            name: "delete",
            aliases: &["rm"],
            args: "<tag>...",
            about: "delete tags; nothing is deleted if one is missing",
            parser: parse_delete,
        },
        Command {
            name: "edit",
            aliases: &[],
            args: "<tag> <attribute> <value>...",
            about: "set name, beth, gems, steam or nexus (category:<text> tag:<text>)",
            parser: parse_edit,
        },
        Command {
            name: "list",
            aliases: &[],
            args: "",
            about: "list ids and names",
            parser: parse_list,
        },
        Command {
            name: "show",
            aliases: &["print", "get"],
            args: "<tag>...",
            about: "print full records",
            parser: parse_show,
        },
    ],
};

fn parse_add(args: &[String]) -> Result<CliCommand, CliError> {
    if args.is_empty() {
        return Err(CliError::usage(
            "tag add requires <beth> <gems> <category> <tag> <steam> <name>",
        ));
    }
    Ok(CliCommand::TagAdd {
        rows: parse_rows(args),
    })
}

fn parse_delete(args: &[String]) -> Result<CliCommand, CliError> {
    if args.is_empty() {
        return Err(CliError::usage("Missing tag id or name"));
    }
    Ok(CliCommand::TagDelete {
        tokens: args.to_vec(),
    })
}

fn parse_edit(args: &[String]) -> Result<CliCommand, CliError> {
    let (token, rest) = parse_required_arg(args, "tag id or name")?;
    let (attribute, values) = parse_required_arg(rest, "attribute")?;
    if values.is_empty() {
        return Err(CliError::usage(format!(
            "tag edit requires a value for '{}'",
            attribute
        )));
    }
    let value = parse_field_value(&attribute, values)?;
    Ok(CliCommand::TagEdit {
        token,
        attribute,
        value,
    })
}

fn parse_list(args: &[String]) -> Result<CliCommand, CliError> {
    if !args.is_empty() {
        return Err(CliError::usage("tag list does not take any arguments"));
    }
    Ok(CliCommand::TagList)
}

fn parse_show(args: &[String]) -> Result<CliCommand, CliError> {
    if args.is_empty() {
        return Err(CliError::usage("Missing tag id or name"));
    }
    Ok(CliCommand::TagShow {
        tokens: args.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::FieldValue;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parse_add_groups_rows() {
        let command = parse_add(&args(&["", "", "", "", "", "Cheats"])).unwrap();
        assert_eq!(
            command,
            CliCommand::TagAdd {
                rows: vec![args(&["", "", "", "", "", "Cheats"])]
            }
        );
        assert!(parse_add(&[]).is_err());
    }

    #[test]
    fn parse_edit_requires_value() {
        let err = parse_edit(&args(&["4", "name"])).unwrap_err();
        assert!(err.to_string().contains("requires a value"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn parse_edit_joins_name_words() {
        let command = parse_edit(&args(&["Armour", "name", "Heavy", "Armour"])).unwrap();
        assert_eq!(
            command,
            CliCommand::TagEdit {
                token: "Armour".to_string(),
                attribute: "name".to_string(),
                value: FieldValue::Text("Heavy Armour".to_string()),
            }
        );
    }

    #[test]
    fn parse_list_rejects_args() {
        let err = parse_list(&args(&["extra"])).unwrap_err();
        assert!(err.to_string().contains("does not take"));
    }

    #[test]
    fn parse_show_and_delete_need_a_tag() {
        assert!(parse_show(&[]).is_err());
        assert!(parse_delete(&[]).is_err());
        assert_eq!(
            parse_show(&args(&["1", "Armour"])).unwrap(),
            CliCommand::TagShow {
                tokens: args(&["1", "Armour"])
            }
        );
    }
}
