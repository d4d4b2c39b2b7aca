//! Load-time validation of a persisted collection.
//!
//! Each stored book is decoded on its own into [StoredBook], where a field of
//! the wrong type reads as absent. A book missing any required field is
//! dropped whole; optional fields that fail to decode are simply left out.

use serde::Deserialize;
use serde_json::Value;
use serde_with::{serde_as, DefaultOnError};
use tracing::warn;

use crate::{
    error::{Error, Result},
    store::Collection,
    types::{
        book::{BookRecord, ReadingStatus, Source},
        timestamp::Timestamp,
    },
};

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredBook {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    id:           Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    isbn13:       Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    isbn10:       Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    title:        Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    authors:      Option<Vec<String>>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    publisher:    Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    publish_date: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    publish_year: Option<i32>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    page_count:   Option<u32>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    language:     Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    subjects:     Option<Vec<String>>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    cover_url:    Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    status:       Option<ReadingStatus>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    rating:       Option<f64>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    notes:        Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    tags:         Option<Vec<String>>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    date_added:   Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    date_read:    Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    source:       Option<Source>,
}

impl StoredBook {
    fn into_record(self) -> Option<BookRecord> {
        Some(BookRecord {
            id:           self.id?,
            isbn13:       self.isbn13?,
            isbn10:       self.isbn10,
            title:        self.title?,
            authors:      self.authors?,
            publisher:    self.publisher,
            publish_date: self.publish_date,
            publish_year: self.publish_year,
            page_count:   self.page_count,
            language:     self.language,
            subjects:     self.subjects,
            cover_url:    self.cover_url,
            status:       self.status?,
            rating:       self.rating,
            notes:        self.notes,
            tags:         self.tags,
            date_added:   Timestamp(self.date_added?),
            date_read:    self.date_read.map(Timestamp),
            source:       self.source?,
        })
    }
}

pub(crate) fn sanitize_book(raw: &Value) -> Option<BookRecord> {
    StoredBook::deserialize(raw).ok()?.into_record()
}

pub(crate) struct Sanitized {
    pub collection: Collection,
    /// The sanitized collection no longer serializes to the stored payload,
    /// numbers compared by value.
    pub changed:    bool,
}

impl Sanitized {
    fn empty() -> Self {
        Self {
            collection: Collection::default(),
            changed:    false,
        }
    }
}

/// Structural equality where numbers compare by value, so an integer `4`
/// written by another tool equals the `4.0` a float field serializes to.
fn same_data(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| same_data(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(key, x)| y.get(key).is_some_and(|y| same_data(x, y)))
        }
        _ => a == b,
    }
}

/// Turns stored bytes into a collection. Garbage reads as empty; only an
/// unknown schema version is an error, so newer data is never discarded.
pub(crate) fn sanitize(raw: &str) -> Result<Sanitized> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Stored collection is not valid JSON, starting from an empty one");
            return Ok(Sanitized::empty());
        }
    };
    let Some(payload) = value.as_object() else {
        warn!("Stored collection is not a JSON object, starting from an empty one");
        return Ok(Sanitized::empty());
    };

    match payload.get("version") {
        None | Some(Value::Null) => {}
        Some(Value::Number(version)) if version.as_f64() == Some(1.0) => {}
        Some(version) => return Err(Error::UnsupportedVersion(version.to_string())),
    }

    let stored = match payload.get("books") {
        Some(Value::Array(books)) => books.as_slice(),
        _ => &[],
    };
    let books: Vec<BookRecord> = stored
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let book = sanitize_book(raw);
            if book.is_none() {
                warn!(index, "Dropping malformed book from stored collection");
            }
            book
        })
        .collect();

    let collection = Collection {
        version: Collection::CURRENT_VERSION,
        books,
    };
    let changed = !same_data(&serde_json::to_value(&collection)?, &value);
    Ok(Sanitized {
        collection,
        changed,
    })
}
