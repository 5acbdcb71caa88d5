// This file is part of the product TagEdit.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use env_logger::{Builder, Logger, Target};
use log::{LevelFilter, SetLoggerError};
use std::io::Write;

/// Level used when `-v` is given: at least debug.
pub fn effective_level(configured: LevelFilter, verbose: bool) -> LevelFilter {
    if verbose {
        configured.max(LevelFilter::Debug)
    } else {
        configured
    }
}

/// Installs an env_logger writing to stderr. A non-empty `RUST_LOG` takes
/// over filtering completely; otherwise `level` applies to every target.
pub fn init_logger(level: LevelFilter) -> Result<(), SetLoggerError> {
    let directives = std::env::var(env_logger::DEFAULT_FILTER_ENV).ok();
    let logger = build_logger(level, directives.as_deref());
    let max_level = logger.filter();
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(max_level);
    Ok(())
}

fn build_logger(level: LevelFilter, directives: Option<&str>) -> Logger {
    let mut builder = Builder::new();
    match directives.map(str::trim) {
        Some(directives) if !directives.is_empty() => builder.parse_filters(directives),
        _ => builder.filter_level(level),
    };
    builder
        .target(Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .build()
}
