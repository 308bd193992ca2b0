// Copyright (C) 2024-2026 MinePulse Developers (see AUTHORS)
//
// This file is part of MinePulse
//
// MinePulse is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// MinePulse is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// MinePulse. If not, see <https://www.gnu.org/licenses/>.

use crate::config::LoggingConfig;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILE: &str = "minepulse.log";

/// Our crates log at `level`, dependencies such as reqwest and hyper only warn
fn default_directives(level: &str) -> String {
    format!("warn,minepulse={level},minepulse_lib={level},sessionrpc={level}")
}

/// Directory and file name for the daily rolling appender
fn split_log_path(file: &str) -> (PathBuf, String) {
    let path = Path::new(file);
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_LOG_FILE)
        .to_string();
    (directory, filename)
}

/// Sets up logging according to the logging configuration.
///
/// Console output goes to stderr so the live session line on stdout stays intact.
/// `RUST_LOG` replaces the configured level when set.
/// Keep the returned guard alive for as long as file logging should flush.
pub fn setup_logging(
    logging_config: &LoggingConfig,
) -> Result<Option<non_blocking::WorkerGuard>, Box<dyn Error>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(&logging_config.level))?,
    };

    let console_layer = if logging_config.console.unwrap_or(true) {
        Some(fmt::layer().with_writer(std::io::stderr).with_target(false))
    } else {
        None
    };

    let (file_layer, guard) = if let Some(file) = &logging_config.file {
        let (directory, filename) = split_log_path(file);
        std::fs::create_dir_all(&directory)?;

        let file_appender = RollingFileAppender::new(Rotation::DAILY, directory, filename);
        let (non_blocking_appender, guard) = non_blocking(file_appender);
        let layer = fmt::layer()
            .with_writer(non_blocking_appender)
            .with_ansi(false);

        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    Registry::default()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    info!(
        "Logging initialized at level {} (file: {})",
        logging_config.level,
        logging_config.file.as_deref().unwrap_or("none")
    );
    Ok(guard)
}
