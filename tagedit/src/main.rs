// This file is part of the product TagEdit.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::{debug, info};
use std::path::PathBuf;
use tagedit::config::{Config, ValidatedConfig};
use tagedit::{bootstrap, cli, shell, util};

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let parsed_args = match parse_args() {
        Ok(args) => args,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -C <root> to set the runtime directory.");
            eprintln!("❌ Use `tagedit help` to list the commands.");
            return 2;
        }
    };

    if matches!(parsed_args.mode, RunMode::Help) {
        print!("{}", cli::help_text());
        return 0;
    }

    if matches!(parsed_args.mode, RunMode::Init) {
        return match bootstrap::bootstrap_runtime(&parsed_args.runtime_root) {
            Ok(result) => {
                if !result.created_config && !result.created_database {
                    println!("Nothing to do; config and database already exist.");
                }
                0
            }
            Err(error) => {
                eprintln!("❌ Bootstrap error: {}", error);
                1
            }
        };
    }

    let config = match Config::load_and_validate(&parsed_args.runtime_root) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("❌ Configuration error: {}", error);
            return 1;
        }
    };

    let level = util::effective_level(config.log_level, parsed_args.verbose);
    if let Err(error) = util::init_logger(level) {
        eprintln!("❌ Failed to initialize logger: {}", error);
        return 1;
    }
    log_startup_info(&parsed_args.runtime_root, &config);

    match parsed_args.mode {
        RunMode::Cli(tokens) => {
            let stdout = std::io::stdout();
            let stderr = std::io::stderr();
            cli::run_cli(&config, &tokens, &mut stdout.lock(), &mut stderr.lock())
        }
        _ => match shell::run_stdio(&config) {
            Ok(shell::SessionEnd::Clean) => 0,
            Ok(shell::SessionEnd::DiscardedUnanswered) => {
                eprintln!("❌ Input ended before the unsaved changes were confirmed.");
                1
            }
            Err(error) => {
                eprintln!("❌ Shell I/O error: {}", error);
                1
            }
        },
    }
}

fn log_startup_info(runtime_root: &std::path::Path, config: &ValidatedConfig) {
    debug!("Runtime root: {}", runtime_root.display());
    debug!("Database file: {}", config.database_path.display());
    if config.history_limit > 0 {
        info!("Keeping at most {} snapshots", config.history_limit);
    }
}

#[derive(Debug)]
enum RunMode {
    Shell,
    Cli(Vec<String>),
    Init,
    Help,
}

struct ParsedArgs {
    runtime_root: PathBuf,
    verbose: bool,
    mode: RunMode,
}

fn parse_args() -> Result<ParsedArgs, String> {
    parse_args_from(std::env::args().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<ParsedArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut runtime_root = PathBuf::from(".");
    let mut verbose = false;
    let mut cli_tokens = Vec::new();

    while let Some(arg) = args.next() {
        if !cli_tokens.is_empty() {
            cli_tokens.push(arg);
        } else if is_help_flag(&arg) {
            return Ok(ParsedArgs {
                runtime_root,
                verbose,
                mode: RunMode::Help,
            });
        } else if arg == "--" {
            continue;
        } else if arg == "-C" {
            let value = args
                .next()
                .ok_or_else(|| "Missing value for -C".to_string())?;
            runtime_root = PathBuf::from(value);
        } else if arg == "-v" {
            verbose = true;
        } else if arg.starts_with('-') && arg.len() > 1 {
            return Err(format!("Unknown option {}", arg));
        } else {
            cli_tokens.push(arg);
        }
    }

    if cli_tokens.len() == 1 && cli_tokens[0].eq_ignore_ascii_case("help") {
        return Ok(ParsedArgs {
            runtime_root,
            verbose,
            mode: RunMode::Help,
        });
    }

    let runtime_root = make_runtime_root_absolute(runtime_root)?;

    let mode = if cli_tokens.is_empty() {
        RunMode::Shell
    } else if cli_tokens.len() == 1 && cli_tokens[0].eq_ignore_ascii_case("init") {
        RunMode::Init
    } else {
        RunMode::Cli(cli_tokens)
    };

    Ok(ParsedArgs {
        runtime_root,
        verbose,
        mode,
    })
}

fn is_help_flag(arg: &str) -> bool {
    arg == "-h" || arg == "--help"
}

fn make_runtime_root_absolute(runtime_root: PathBuf) -> Result<PathBuf, String> {
    if runtime_root.is_absolute() {
        return Ok(runtime_root);
    }

    let current_dir = std::env::current_dir()
        .map_err(|error| format!("Failed to resolve current directory: {}", error))?;
    Ok(current_dir.join(runtime_root))
}
