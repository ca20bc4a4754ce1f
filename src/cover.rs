//! Best-effort cover art. Lookups run on worker threads so creating a book
//! never waits on the network; the control thread collects finished lookups
//! with [`CoverFetcher::drain`] and hands them to the store.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

const GOOGLE_BOOKS_ENDPOINT: &str = "https://www.googleapis.com/books/v1/volumes";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves a cover URL for a title.
pub trait CoverLookup: Send + Sync {
    fn lookup(&self, title: &str) -> Option<String>;
}

/// Queries the public Google Books volumes API and takes the first hit.
pub struct GoogleBooksLookup {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl GoogleBooksLookup {
    pub fn new() -> reqwest::Result<Self> {
        Self::with_endpoint(GOOGLE_BOOKS_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: &str) -> reqwest::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    fn fetch(&self, title: &str) -> reqwest::Result<VolumeSearch> {
        self.client
            .get(&self.endpoint)
            .query(&[("q", title), ("maxResults", "1")])
            .send()?
            .error_for_status()?
            .json::<VolumeSearch>()
    }
}

impl CoverLookup for GoogleBooksLookup {
    fn lookup(&self, title: &str) -> Option<String> {
        match self.fetch(title) {
            Ok(search) => search.first_cover(),
            Err(err) => {
                warn!(error = %err, title, "cover lookup failed");
                None
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct VolumeSearch {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo", default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
struct VolumeInfo {
    #[serde(rename = "imageLinks")]
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Default, Deserialize)]
struct ImageLinks {
    medium: Option<String>,
    thumbnail: Option<String>,
}

impl VolumeSearch {
    /// Prefer the medium image, then the thumbnail, of the first volume.
    fn first_cover(self) -> Option<String> {
        let links = self.items.into_iter().next()?.volume_info.image_links?;
        links.medium.or(links.thumbnail)
    }
}

/// A finished lookup: the book it was requested for and what was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverResult {
    pub book_id: i64,
    pub cover: Option<String>,
}

/// Fire-and-forget dispatcher for cover lookups.
pub struct CoverFetcher {
    lookup: Arc<dyn CoverLookup>,
    sender: Sender<CoverResult>,
    receiver: Receiver<CoverResult>,
}

impl CoverFetcher {
    pub fn new(lookup: Arc<dyn CoverLookup>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            lookup,
            sender,
            receiver,
        }
    }

    /// Start a lookup for `title` in the background.
    pub fn request(&self, book_id: i64, title: &str) {
        let lookup = Arc::clone(&self.lookup);
        let sender = self.sender.clone();
        let title = title.to_string();
        let spawned = thread::Builder::new()
            .name(format!("cover-{book_id}"))
            .spawn(move || {
                let cover = lookup.lookup(&title);
                debug!(book_id, found = cover.is_some(), "cover lookup finished");
                // The receiver only goes away when the app is shutting down.
                let _ = sender.send(CoverResult { book_id, cover });
            });
        if let Err(err) = spawned {
            warn!(error = %err, book_id, "could not start cover lookup");
        }
    }

    /// Collect every lookup that has finished so far without blocking.
    pub fn drain(&self) -> Vec<CoverResult> {
        self.receiver.try_iter().collect()
    }

    /// Block until the next lookup finishes or `timeout` elapses.
    #[cfg(test)]
    fn wait_for_next(&self, timeout: Duration) -> Option<CoverResult> {
        self.receiver.recv_timeout(timeout).ok()
    }
}
