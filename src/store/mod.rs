//! Versioned, persisted book collection.
//!
//! [CollectionStore] owns the records. Reads go through an in-process cache
//! that is replaced after every successful write; every mutation runs its
//! read-modify-write under one lock, so two writers never interleave.

pub mod backend;
mod sanitize;

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

pub use backend::{Backend, FileBackend, MemoryBackend, COLLECTION_KEY};

use crate::{
    error::{Error, Result},
    types::{
        book::{BookDraft, BookRecord},
        timestamp::Timestamp,
    },
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub version: u32,
    pub books:   Vec<BookRecord>,
}

impl Collection {
    pub const CURRENT_VERSION: u32 = 1;
}

impl Default for Collection {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            books:   Vec::new(),
        }
    }
}

pub struct CollectionStore<B> {
    backend: B,
    cache:   Mutex<Option<Collection>>,
}

impl<B: Backend> CollectionStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            cache: Mutex::new(None),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn lock(&self) -> MutexGuard<'_, Option<Collection>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_locked(&self, cache: &mut Option<Collection>) -> Result<Collection> {
        if let Some(collection) = cache.as_ref() {
            return Ok(collection.clone());
        }
        let collection = match self.backend.read()? {
            None => Collection::default(),
            Some(raw) => {
                let sanitized = sanitize::sanitize(&raw)?;
                if sanitized.changed {
                    info!(
                        books = sanitized.collection.books.len(),
                        "Stored collection was normalized, writing it back"
                    );
                    self.persist_locked(cache, &sanitized.collection)?;
                }
                sanitized.collection
            }
        };
        *cache = Some(collection.clone());
        Ok(collection)
    }

    fn persist_locked(&self, cache: &mut Option<Collection>, collection: &Collection) -> Result<()> {
        let contents = if self.backend.pretty() {
            serde_json::to_string_pretty(collection)?
        } else {
            serde_json::to_string(collection)?
        };
        self.backend.write(&contents)?;
        *cache = Some(collection.clone());
        debug!(books = collection.books.len(), "Persisted collection");
        Ok(())
    }

    /// Runs `f` on the current collection and persists the result, all while
    /// holding the write lock.
    fn mutate<T>(&self, f: impl FnOnce(&mut Collection) -> Result<T>) -> Result<T> {
        let mut cache = self.lock();
        let mut collection = self.load_locked(&mut cache)?;
        let out = f(&mut collection)?;
        self.persist_locked(&mut cache, &collection)?;
        Ok(out)
    }

    pub fn load(&self) -> Result<Collection> {
        let mut cache = self.lock();
        self.load_locked(&mut cache)
    }

    /// Replaces the whole stored collection.
    pub fn save(&self, collection: &Collection) -> Result<()> {
        let mut cache = self.lock();
        let collection = Collection {
            version: Collection::CURRENT_VERSION,
            books:   collection.books.clone(),
        };
        self.persist_locked(&mut cache, &collection)
    }

    pub fn books(&self) -> Result<Vec<BookRecord>> {
        Ok(self.load()?.books)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<BookRecord>> {
        Ok(self.load()?.books.into_iter().find(|b| b.id == id))
    }

    pub fn find_by_isbn13(&self, isbn13: &str) -> Result<Option<BookRecord>> {
        Ok(self.load()?.books.into_iter().find(|b| b.isbn13 == isbn13))
    }

    /// Validates `draft` and appends it with a fresh id and the current time
    /// as `date_added`. Duplicate ISBNs are the caller's concern.
    pub fn add(&self, draft: BookDraft) -> Result<BookRecord> {
        let book = draft.into_record(uuid::Uuid::new_v4().to_string(), Timestamp::now())?;
        self.mutate(|collection| {
            collection.books.push(book.clone());
            Ok(())
        })?;
        info!(id = %book.id, isbn13 = %book.isbn13, "Added book");
        Ok(book)
    }

    pub fn update(&self, id: &str, draft: BookDraft) -> Result<BookRecord> {
        let updated = self.mutate(|collection| {
            let slot = collection
                .books
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or_else(|| Error::RecordNotFound(id.to_string()))?;
            let updated = draft.apply_to(slot)?;
            *slot = updated.clone();
            Ok(updated)
        })?;
        info!(id, "Updated book");
        Ok(updated)
    }

    /// Removes the book with `id`. Returns whether one was removed; an unknown
    /// id leaves the store untouched.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut cache = self.lock();
        let mut collection = self.load_locked(&mut cache)?;
        let before = collection.books.len();
        collection.books.retain(|b| b.id != id);
        if collection.books.len() == before {
            return Ok(false);
        }
        self.persist_locked(&mut cache, &collection)?;
        info!(id, "Removed book");
        Ok(true)
    }

    pub fn clear(&self) -> Result<()> {
        let mut cache = self.lock();
        self.persist_locked(&mut cache, &Collection::default())?;
        info!("Cleared collection");
        Ok(())
    }
}
