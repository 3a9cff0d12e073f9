//! Logging to a file while the terminal is owned by the UI

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Default log file location in the system temp dir
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join("tern.log")
}

/// Install the global subscriber writing to `log_file`.
///
/// The filter defaults to `info` and is overridden by `RUST_LOG`. Returns
/// false when the file can't be opened or a subscriber is already set; the
/// editor then runs without logs.
pub fn init_global(log_file: &Path) -> bool {
    let file = match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", log_file.display(), e);
            return false;
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .is_ok()
}
