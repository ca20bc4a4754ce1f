//! Startup wiring shared by the binary and its integration tests: open
//! storage (falling back to memory), set up cover lookups, and build the app.

use std::rc::Rc;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::cover::{CoverFetcher, CoverLookup, GoogleBooksLookup};
use crate::storage::{MemoryStore, SharedStorage, SqliteStore};
use crate::store::BookStore;
use crate::ui::App;

/// Open the SQLite store, or fall back to a session-only memory store. The
/// flag reports whether writes will outlive the process (or were meant to,
/// for `--in-memory`).
pub fn open_storage(config: &Config) -> (SharedStorage, bool) {
    if config.in_memory {
        info!("running with in-memory storage");
        let storage: SharedStorage = Rc::new(MemoryStore::new());
        return (storage, true);
    }
    match SqliteStore::open(&config.db_path) {
        Ok(store) => {
            let storage: SharedStorage = Rc::new(store);
            (storage, true)
        }
        Err(err) => {
            warn!(error = %err, path = %config.db_path.display(), "storage unavailable; using memory");
            let storage: SharedStorage = Rc::new(MemoryStore::new());
            (storage, false)
        }
    }
}

pub fn cover_fetcher(config: &Config) -> Option<CoverFetcher> {
    if !config.covers_enabled {
        return None;
    }
    match GoogleBooksLookup::new() {
        Ok(lookup) => {
            let lookup: Arc<dyn CoverLookup> = Arc::new(lookup);
            Some(CoverFetcher::new(lookup))
        }
        Err(err) => {
            warn!(error = %err, "cover lookups disabled");
            None
        }
    }
}

/// Build a ready-to-run app. Storage failures never stop startup; they show
/// up as a footer warning instead.
pub fn build_app(config: &Config) -> App {
    let (storage, persistent) = open_storage(config);
    let covers = cover_fetcher(config);

    let store = BookStore::new(Rc::clone(&storage));
    let mut app = App::new(store, storage, covers);
    if !persistent {
        app.warn_session_only();
    }
    app
}
