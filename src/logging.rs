use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};

/// Environment variable naming the file diagnostics are written to.
pub const LOG_ENV: &str = "BRIEF_LOG";

/// Install the diagnostics subscriber. Stdout belongs to the report, so
/// nothing is logged unless `BRIEF_LOG` points at a file.
pub fn init() -> Result<()> {
    match std::env::var_os(LOG_ENV) {
        Some(path) if !path.is_empty() => init_file(Path::new(&path)),
        _ => Ok(()),
    }
}

fn init_file(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to install log subscriber")
}
