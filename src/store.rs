//! The in-memory book collection and its save-after-mutate discipline. Every
//! mutating call follows the same sequence: change the collection, write the
//! whole collection to storage, then notify listeners. Nothing here returns an
//! error; storage trouble is logged and the in-memory list stays
//! authoritative for the session.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::models::{Book, BookPatch};
use crate::storage::{SharedStorage, StorageError, STORAGE_KEY};

/// Callback fired synchronously whenever the projection needs recomputing.
pub type RenderListener = Box<dyn FnMut()>;

/// Hands out time-derived ids that never repeat, even when several books are
/// created within the same millisecond.
pub struct IdGenerator {
    last: i64,
    clock: fn() -> i64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::with_clock(now_millis)
    }

    pub fn with_clock(clock: fn() -> i64) -> Self {
        Self { last: 0, clock }
    }

    pub fn next_id(&mut self) -> i64 {
        let now = (self.clock)();
        self.last = now.max(self.last.saturating_add(1));
        self.last
    }

    /// Make sure future ids sort after `id`.
    pub fn observe(&mut self, id: i64) {
        self.last = self.last.max(id);
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

/// Owner of the ordered book collection.
pub struct BookStore {
    books: Vec<Book>,
    storage: SharedStorage,
    ids: IdGenerator,
    listeners: Vec<RenderListener>,
}

impl BookStore {
    /// Create an empty store. Call [`BookStore::load_initial`] to hydrate it.
    pub fn new(storage: SharedStorage) -> Self {
        Self::with_id_generator(storage, IdGenerator::new())
    }

    pub fn with_id_generator(storage: SharedStorage, ids: IdGenerator) -> Self {
        Self {
            books: Vec::new(),
            storage,
            ids,
            listeners: Vec::new(),
        }
    }

    /// Register a listener for the render signal.
    pub fn subscribe(&mut self, listener: RenderListener) {
        self.listeners.push(listener);
    }

    /// Books in insertion order.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Replace the collection with whatever is stored under the collection
    /// key. Missing or corrupt data leaves the store empty, and a record that
    /// fails to decode is skipped on its own. One render signal fires either
    /// way.
    pub fn load_initial(&mut self) {
        self.books = match self.storage.get(STORAGE_KEY) {
            Ok(Some(serialized)) => match serde_json::from_str::<Option<Vec<Value>>>(&serialized) {
                Ok(records) => decode_records(records.unwrap_or_default()),
                Err(err) => {
                    warn!(error = %err, "stored book list is corrupt; starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "could not read stored books; starting empty");
                Vec::new()
            }
        };

        for book in &self.books {
            self.ids.observe(book.id);
        }
        info!(count = self.books.len(), "loaded book collection");
        self.notify();
    }

    /// Append a new book and return a copy of it.
    pub fn create(
        &mut self,
        title: &str,
        author: &str,
        year: Option<i64>,
        is_complete: bool,
        cover: Option<String>,
    ) -> Book {
        let book = Book {
            id: self.ids.next_id(),
            title: title.to_string(),
            author: author.to_string(),
            year,
            is_complete,
            cover,
        };
        debug!(id = book.id, title = %book.title, "created book");
        self.books.push(book.clone());
        self.commit();
        book
    }

    pub fn find_by_id(&self, id: i64) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    fn find_mut(&mut self, id: i64) -> Option<&mut Book> {
        self.books.iter_mut().find(|book| book.id == id)
    }

    /// Apply a partial edit. Unknown ids are a silent no-op that writes
    /// nothing.
    pub fn update_fields(&mut self, id: i64, patch: &BookPatch) -> bool {
        let Some(book) = self.find_mut(id) else {
            debug!(id, "update ignored; no such book");
            return false;
        };
        patch.apply_to(book);
        debug!(id, "updated book");
        self.commit();
        true
    }

    /// Move a book to the completed (`true`) or in-progress (`false`) shelf.
    pub fn set_completion(&mut self, id: i64, completed: bool) -> bool {
        let Some(book) = self.find_mut(id) else {
            debug!(id, "completion change ignored; no such book");
            return false;
        };
        book.is_complete = completed;
        debug!(id, completed, "changed completion");
        self.commit();
        true
    }

    pub fn remove(&mut self, id: i64) -> bool {
        let Some(index) = self.books.iter().position(|book| book.id == id) else {
            debug!(id, "remove ignored; no such book");
            return false;
        };
        self.books.remove(index);
        debug!(id, "removed book");
        self.commit();
        true
    }

    /// Attach a late cover lookup result. The result is dropped when the book
    /// was deleted while the lookup was in flight.
    pub fn apply_cover(&mut self, id: i64, cover: Option<String>) -> bool {
        let Some(cover) = cover else {
            return false;
        };
        let Some(book) = self.find_mut(id) else {
            debug!(id, "discarding cover for deleted book");
            return false;
        };
        book.cover = Some(cover);
        self.commit();
        true
    }

    /// Serialize the whole collection over the collection key. Returns
    /// whether the write landed.
    pub fn persist(&self) -> bool {
        match self.try_persist() {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "could not persist books; changes are session-only");
                false
            }
        }
    }

    fn try_persist(&self) -> Result<(), PersistError> {
        let serialized = serde_json::to_string(&self.books)?;
        self.storage.set(STORAGE_KEY, &serialized)?;
        Ok(())
    }

    fn commit(&mut self) {
        self.persist();
        self.notify();
    }

    fn notify(&mut self) {
        for listener in self.listeners.iter_mut() {
            listener();
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum PersistError {
    #[error(transparent)]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Decode each stored record on its own so one malformed entry does not cost
/// the rest of the collection.
fn decode_records(records: Vec<Value>) -> Vec<Book> {
    let total = records.len();
    let books: Vec<Book> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Book>(record) {
            Ok(book) => Some(book),
            Err(err) => {
                warn!(index, error = %err, "skipping unreadable book record");
                None
            }
        })
        .collect();
    if books.len() < total {
        warn!(kept = books.len(), total, "some stored books could not be read");
    }
    books
}
