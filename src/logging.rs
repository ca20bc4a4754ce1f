//! Tracing setup. The terminal belongs to the UI, so log lines go to a file in
//! the data directory instead of stdout. Logging is best-effort: when the file
//! cannot be opened the subscriber writes to a sink and the app still starts.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted when no explicit filter is given.
pub const LOG_ENV: &str = "BOOKSHELF_LOG";
const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber, appending to `log_path`. Returns `false`
/// when the log file could not be opened and output is being discarded.
pub fn init(log_path: &Path, level: Option<&str>) -> bool {
    let (writer, to_file) = match open_log_file(log_path) {
        Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), true),
        Err(_) => (BoxMakeWriter::new(io::sink), false),
    };

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init();
    to_file
}

fn open_log_file(log_path: &Path) -> io::Result<File> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(log_path)
}

fn build_filter(level: Option<&str>) -> EnvFilter {
    match level {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}
