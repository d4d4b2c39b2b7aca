use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::{
    error::{Error, Result},
    types::{isbn::is_valid_isbn13, timestamp::Timestamp},
};

/// Most subjects a record keeps.
pub const MAX_SUBJECTS: usize = 10;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingStatus {
    #[default]
    ToRead,
    Reading,
    Read,
}

impl ReadingStatus {
    pub const ALL: [ReadingStatus; 3] = [Self::ToRead, Self::Reading, Self::Read];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToRead => "to-read",
            Self::Reading => "reading",
            Self::Read => "read",
        }
    }
}

impl FromStr for ReadingStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::validation(format!("unknown status '{s}'")))
    }
}

impl Display for ReadingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a record's metadata came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    OpenLibrary,
    GoogleBooks,
    Manual,
}

impl Source {
    pub const ALL: [Source; 3] = [Self::OpenLibrary, Self::GoogleBooks, Self::Manual];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenLibrary => "openlibrary",
            Self::GoogleBooks => "googlebooks",
            Self::Manual => "manual",
        }
    }
}

impl FromStr for Source {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| Error::validation(format!("unknown source '{s}'")))
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A book in the collection.
///
/// Only built through [BookDraft::into_record] or by the store's load-time
/// sanitizer, so every instance carries a valid set of required fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub id:           String,
    pub isbn13:       String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn10:       Option<String>,
    pub title:        String,
    pub authors:      Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher:    Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count:   Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language:     Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjects:     Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url:    Option<String>,
    pub status:       ReadingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating:       Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes:        Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags:         Option<Vec<String>>,
    pub date_added:   Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_read:    Option<Timestamp>,
    pub source:       Source,
}

/// Metadata resolved from an external source, not yet part of the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub isbn13:       String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn10:       Option<String>,
    pub title:        String,
    pub authors:      Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher:    Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count:   Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language:     Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjects:     Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url:    Option<String>,
    pub status:       ReadingStatus,
    pub source:       Source,
}

/// A partial book, as received from a caller. Used both to create records and
/// to patch existing ones; nothing in it is trusted until validated.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookDraft {
    /// Ignored on create and on update, ids are owned by the store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id:           Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn13:       Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn10:       Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title:        Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors:      Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher:    Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count:   Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language:     Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subjects:     Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url:    Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status:       Option<ReadingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating:       Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes:        Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags:         Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_read:    Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source:       Option<Source>,
}

fn check_isbn13(isbn13: &str) -> Result<()> {
    // Stored form is the cleaned 13 digits, not just something that cleans to it
    if isbn13.len() == 13 && is_valid_isbn13(isbn13) {
        Ok(())
    } else {
        Err(Error::validation(format!("'{isbn13}' is not a valid ISBN-13")))
    }
}

fn check_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::validation("title must not be empty"));
    }
    Ok(())
}

fn check_authors(authors: &[String]) -> Result<()> {
    if authors.is_empty() {
        return Err(Error::validation("authors must be a non-empty list"));
    }
    if authors.iter().any(|a| a.trim().is_empty()) {
        return Err(Error::validation("authors must not contain blank names"));
    }
    Ok(())
}

fn cap_subjects(subjects: Option<Vec<String>>) -> Option<Vec<String>> {
    subjects.map(|mut s| {
        s.truncate(MAX_SUBJECTS);
        s
    })
}

impl BookDraft {
    /// Validated constructor. `id` and `date_added` always come from the
    /// caller of this function (the store), never from the draft.
    pub fn into_record(self, id: String, date_added: Timestamp) -> Result<BookRecord> {
        let isbn13 = self
            .isbn13
            .ok_or_else(|| Error::validation("isbn13 is required"))?;
        check_isbn13(&isbn13)?;
        let title = self
            .title
            .ok_or_else(|| Error::validation("title is required"))?;
        check_title(&title)?;
        let authors = self
            .authors
            .ok_or_else(|| Error::validation("authors are required"))?;
        check_authors(&authors)?;
        let status = self
            .status
            .ok_or_else(|| Error::validation("status is required"))?;
        let source = self
            .source
            .ok_or_else(|| Error::validation("source is required"))?;

        Ok(BookRecord {
            id,
            isbn13,
            isbn10: self.isbn10,
            title,
            authors,
            publisher: self.publisher,
            publish_date: self.publish_date,
            publish_year: self.publish_year,
            page_count: self.page_count,
            language: self.language,
            subjects: cap_subjects(self.subjects),
            cover_url: self.cover_url,
            status,
            rating: self.rating,
            notes: self.notes,
            tags: self.tags,
            date_added,
            date_read: self.date_read,
            source,
        })
    }

    /// Merges this draft over `record`. Typed fields are validated one by one
    /// and any failure rejects the whole patch; `id` and `date_added` are
    /// kept from `record` whatever the draft says.
    pub fn apply_to(self, record: &BookRecord) -> Result<BookRecord> {
        if let Some(isbn13) = &self.isbn13 {
            check_isbn13(isbn13)?;
        }
        if let Some(title) = &self.title {
            check_title(title)?;
        }
        if let Some(authors) = &self.authors {
            check_authors(authors)?;
        }
        let old = record.clone();
        Ok(BookRecord {
            id: old.id,
            isbn13: self.isbn13.unwrap_or(old.isbn13),
            isbn10: self.isbn10.or(old.isbn10),
            title: self.title.unwrap_or(old.title),
            authors: self.authors.unwrap_or(old.authors),
            publisher: self.publisher.or(old.publisher),
            publish_date: self.publish_date.or(old.publish_date),
            publish_year: self.publish_year.or(old.publish_year),
            page_count: self.page_count.or(old.page_count),
            language: self.language.or(old.language),
            subjects: cap_subjects(self.subjects).or(old.subjects),
            cover_url: self.cover_url.or(old.cover_url),
            status: self.status.unwrap_or(old.status),
            rating: self.rating.or(old.rating),
            notes: self.notes.or(old.notes),
            tags: self.tags.or(old.tags),
            date_added: old.date_added,
            date_read: self.date_read.or(old.date_read),
            source: self.source.unwrap_or(old.source),
        })
    }
}

impl From<NewBook> for BookDraft {
    fn from(book: NewBook) -> Self {
        Self {
            isbn13: Some(book.isbn13),
            isbn10: book.isbn10,
            title: Some(book.title),
            authors: Some(book.authors),
            publisher: book.publisher,
            publish_date: book.publish_date,
            publish_year: book.publish_year,
            page_count: book.page_count,
            language: book.language,
            subjects: book.subjects,
            cover_url: book.cover_url,
            status: Some(book.status),
            source: Some(book.source),
            ..Self::default()
        }
    }
}
