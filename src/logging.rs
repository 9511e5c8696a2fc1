use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Route `tracing` output to the configured log file. The terminal itself is
/// owned by the UI, so nothing is written to stdout/stderr while it runs.
/// An unusable log path disables logging instead of stopping the app.
pub fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let file = match config.log_path.as_deref().map(open_log_file).transpose() {
        Ok(file) => file,
        Err(err) => {
            eprintln!("logging disabled: {err:#}");
            None
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false);
    let installed = match file {
        Some(file) => builder.with_writer(Mutex::new(file)).try_init(),
        None => builder.with_writer(std::io::sink).try_init(),
    };
    installed.map_err(|err| anyhow::anyhow!("install subscriber: {err}"))
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("create log dir {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}
