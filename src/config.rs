//! Command-line configuration. Everything has a sensible default so running
//! the binary bare opens the shelf stored under the user's home directory.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::storage::{default_data_dir, default_db_path};

/// File the tracing subscriber appends to inside the data directory.
const LOG_FILE_NAME: &str = "bookshelf.log";

#[derive(Parser, Clone, Debug)]
#[clap(author, version, about = "Track the books you are reading", long_about = None)]
pub struct Args {
    /// Directory holding the database and the log file.
    #[clap(long)]
    pub data_dir: Option<PathBuf>,

    /// Skip cover lookups entirely.
    #[clap(long)]
    pub offline: bool,

    /// Keep books in memory only; nothing is written to disk.
    #[clap(long)]
    pub in_memory: bool,

    /// Tracing filter, e.g. `debug` or `bookshelf=trace`.
    #[clap(long)]
    pub log_level: Option<String>,
}

/// Resolved runtime settings.
#[derive(Clone, Debug)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    pub covers_enabled: bool,
    pub in_memory: bool,
    pub log_level: Option<String>,
}

impl Config {
    pub fn resolve(args: Args) -> Result<Self> {
        let data_dir = match args.data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        Ok(Self {
            db_path: default_db_path(&data_dir),
            log_path: data_dir.join(LOG_FILE_NAME),
            data_dir,
            covers_enabled: !args.offline,
            in_memory: args.in_memory,
            log_level: args.log_level,
        })
    }
}
