//! Tracing subscriber setup shared by the `agency` and `agency-tui` binaries.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{AgencyError, AgencyResult};

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// `logging.file_path` wins over the binary's default target.
    pub fn resolve(config: &LoggingConfig, fallback: LogTarget) -> LogTarget {
        if config.file_path.is_empty() {
            fallback
        } else {
            LogTarget::File(PathBuf::from(&config.file_path))
        }
    }
}

/// Build the level filter: `--verbose` forces debug, then `RUST_LOG`, then the
/// configured level.
pub fn build_filter(config: &LoggingConfig, verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

pub fn init_logging(config: &LoggingConfig, verbose: bool, target: LogTarget) -> AgencyResult<()> {
    let filter = build_filter(config, verbose);

    match target {
        LogTarget::Stderr => install(filter, config.json_format, true, std::io::stderr),
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            install(filter, config.json_format, false, Mutex::new(file))
        }
    }
}

fn install<W>(filter: EnvFilter, json: bool, ansi: bool, writer: W) -> AgencyResult<()>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| AgencyError::Internal(format!("Failed to install logger: {}", e)))
}
