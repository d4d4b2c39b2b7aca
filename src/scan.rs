//! Scanning an ISBN: the collection is asked before any external source.

use serde::{ser::SerializeStruct, Serialize, Serializer};
use std::future::Future;
use tracing::debug;

use crate::{
    error::{Error, Result},
    lookup::{Fetch, MetadataResolver},
    store::{Backend, CollectionStore},
    types::{
        book::{BookRecord, NewBook},
        isbn::{clean_isbn, is_valid_isbn, to_isbn13},
    },
};

/// Looks up a stored record by ISBN-13.
pub trait BookFinder {
    fn find_by_isbn13(&self, isbn13: &str) -> Result<Option<BookRecord>>;
}

impl<B: Backend> BookFinder for CollectionStore<B> {
    fn find_by_isbn13(&self, isbn13: &str) -> Result<Option<BookRecord>> {
        CollectionStore::find_by_isbn13(self, isbn13)
    }
}

/// Resolves metadata for a cleaned ISBN from outside the collection.
pub trait BookLookup {
    fn lookup(&self, isbn: &str) -> impl Future<Output = Option<NewBook>> + Send;
}

impl<F: Fetch + Sync> BookLookup for MetadataResolver<F> {
    fn lookup(&self, isbn: &str) -> impl Future<Output = Option<NewBook>> + Send {
        MetadataResolver::lookup(self, isbn)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// The collection already holds this ISBN.
    AlreadyExists(BookRecord),
    /// Resolved from an external source, not saved yet.
    Found(NewBook),
}

impl ScanOutcome {
    pub fn already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

impl Serialize for ScanOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ScanOutcome", 2)?;
        match self {
            Self::AlreadyExists(book) => s.serialize_field("book", book)?,
            Self::Found(book) => s.serialize_field("book", book)?,
        }
        s.serialize_field("alreadyExists", &self.already_exists())?;
        s.end()
    }
}

/// Validates `isbn`, returns the stored record if there is one, and otherwise
/// resolves it through `lookup`. Never writes to the collection.
pub async fn scan<S, L>(isbn: &str, finder: &S, lookup: &L) -> Result<ScanOutcome>
where
    S: BookFinder,
    L: BookLookup,
{
    let cleaned = clean_isbn(isbn);
    if !is_valid_isbn(&cleaned) {
        return Err(Error::InvalidIsbn);
    }
    let isbn13 = to_isbn13(&cleaned).ok_or(Error::InvalidIsbn)?;

    if let Some(book) = finder.find_by_isbn13(&isbn13)? {
        debug!(%isbn13, id = %book.id, "Scanned ISBN is already in the collection");
        return Ok(ScanOutcome::AlreadyExists(book));
    }

    lookup
        .lookup(&cleaned)
        .await
        .map(ScanOutcome::Found)
        .ok_or(Error::BookNotFound)
}
