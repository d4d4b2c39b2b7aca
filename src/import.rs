//! Importing books from files written by this crate's exports or by hand.
//!
//! Rows are read loosely: both the JSON field names (`isbn13`, `title`, ...)
//! and the CSV export headers (`ISBN-13`, `Title`, ...) are understood, and
//! numbers may be numbers or numeric strings. A row without a usable ISBN or
//! title is dropped; everything else falls back to a default.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    lookup::Endpoints,
    openlibrary::UNKNOWN_AUTHOR,
    store::{Backend, CollectionStore},
    types::{
        book::{BookDraft, ReadingStatus, Source},
        isbn::{clean_isbn, to_isbn13},
        timestamp::Timestamp,
    },
};

type Row = Map<String, Value>;

/// First value under any of `keys` that is neither `null` nor `""`.
fn field<'a>(row: &'a Row, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| row.get(*k))
        .find(|v| !v.is_null() && v.as_str() != Some(""))
}

fn string(row: &Row, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| row.get(*k)?.as_str())
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn number(row: &Row, keys: &[&str]) -> Option<f64> {
    match field(row, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn whole_number<T: TryFrom<i64>>(row: &Row, keys: &[&str]) -> Option<T> {
    let n = number(row, keys)?;
    if n.fract() != 0.0 {
        return None;
    }
    T::try_from(n as i64).ok()
}

fn authors(row: &Row) -> Vec<String> {
    let parsed = match field(row, &["authors", "Authors", "Author"]) {
        Some(Value::String(s)) => s
            .split([';', ','])
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect(),
        Some(value) => string_list(value).unwrap_or_default(),
        None => Vec::new(),
    };
    if parsed.is_empty() {
        vec![UNKNOWN_AUTHOR.to_string()]
    } else {
        parsed
    }
}

fn tags(row: &Row) -> Option<Vec<String>> {
    let tags: Vec<String> = match field(row, &["tags", "Tags"])? {
        Value::String(s) => s
            .split(';')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        value => string_list(value)?,
    };
    (!tags.is_empty()).then_some(tags)
}

fn cover_url(row: &Row) -> Option<String> {
    if let Some(url) = string(row, &["coverUrl", "Cover URL"]) {
        return Some(url);
    }
    if let Some(id) = whole_number::<i64>(row, &["cover_i"]).filter(|id| *id > 0) {
        return Some(Endpoints::default().cover_by_id(id));
    }
    let thumbnail = row.get("imageLinks")?.get("thumbnail")?.as_str()?;
    match thumbnail.strip_prefix("http://") {
        Some(rest) => Some(format!("https://{rest}")),
        None => Some(thumbnail.to_string()),
    }
}

/// RFC 3339 when `dateparser` recognizes the date, the raw text otherwise.
fn date(row: &Row, keys: &[&str]) -> Option<Timestamp> {
    let raw = string(row, keys)?;
    match dateparser::parse(&raw) {
        Ok(parsed) => Some(Timestamp::from(parsed)),
        Err(_) => Some(Timestamp(raw)),
    }
}

/// One imported row as a draft, or `None` if it has no valid ISBN or title.
pub fn normalize_row(row: &Row) -> Option<BookDraft> {
    let isbn13 = to_isbn13(&clean_isbn(&string(row, &["isbn13", "ISBN-13", "isbn"])?))?;
    let title = string(row, &["title", "Title"])?.trim().to_string();
    if title.is_empty() {
        return None;
    }

    let status = string(row, &["status", "Status"])
        .and_then(|s| s.parse::<ReadingStatus>().ok())
        .unwrap_or_default();
    let source = string(row, &["source"])
        .and_then(|s| s.parse::<Source>().ok())
        .unwrap_or(Source::Manual);
    let subjects = row.get("subjects").and_then(string_list);

    Some(BookDraft {
        isbn13: Some(isbn13),
        isbn10: string(row, &["isbn10", "ISBN-10"]),
        title: Some(title),
        authors: Some(authors(row)),
        publisher: string(row, &["publisher", "Publisher"]),
        publish_date: string(row, &["publishDate", "Publish Date"]),
        publish_year: whole_number(row, &["publishYear", "Year"]),
        page_count: whole_number(row, &["pageCount", "Pages"]),
        language: string(row, &["language", "Language"]),
        subjects,
        cover_url: cover_url(row),
        status: Some(status),
        rating: number(row, &["rating", "Rating"]),
        notes: string(row, &["notes", "Notes"]),
        tags: tags(row),
        date_read: date(row, &["dateRead", "Date Read"]),
        source: Some(source),
        ..BookDraft::default()
    })
}

fn normalize_rows(rows: impl IntoIterator<Item = Value>) -> Vec<BookDraft> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let draft = value.as_object().and_then(normalize_row);
            if draft.is_none() {
                debug!(index, "Skipping import row without a valid ISBN or title");
            }
            draft
        })
        .collect()
}

fn parse_json(content: &str) -> Result<Vec<BookDraft>> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| Error::InvalidImport(format!("not valid JSON ({e})")))?;
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(mut collection) => match collection.remove("books") {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    Ok(normalize_rows(rows))
}

fn parse_csv(content: &str) -> Result<Vec<BookDraft>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());
    let headers = rdr.headers()?.clone();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let cell = record.get(i).unwrap_or_default();
                (header.to_string(), Value::String(cell.to_string()))
            })
            .collect();
        rows.push(Value::Object(row));
    }
    if rows.is_empty() {
        return Err(Error::InvalidImport("CSV needs a header row and at least one book".into()));
    }
    Ok(normalize_rows(rows))
}

/// Parses an import file, picking the format from `file_name`'s extension.
pub fn parse_imported_books(content: &str, file_name: &str) -> Result<Vec<BookDraft>> {
    let name = file_name.to_lowercase();
    if name.ends_with(".json") {
        parse_json(content)
    } else if name.ends_with(".csv") || name.ends_with(".css") {
        parse_csv(content)
    } else {
        Err(Error::UnsupportedImport)
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub total:   usize,
    pub added:   usize,
    /// Already in the collection, or repeated within the import.
    pub skipped: usize,
    /// Rejected by validation.
    pub failed:  usize,
}

/// Adds `drafts` to `store`, skipping ISBNs it already holds.
pub fn import_into<B: Backend>(store: &CollectionStore<B>, drafts: Vec<BookDraft>) -> Result<ImportSummary> {
    let mut seen: HashSet<String> = store.books()?.into_iter().map(|b| b.isbn13).collect();
    let mut summary = ImportSummary {
        total: drafts.len(),
        ..ImportSummary::default()
    };

    for draft in drafts {
        let isbn13 = draft.isbn13.clone().unwrap_or_default();
        if seen.contains(&isbn13) {
            summary.skipped += 1;
            continue;
        }
        match store.add(draft) {
            Ok(_) => {
                summary.added += 1;
                seen.insert(isbn13);
            }
            Err(Error::Validation(reason)) => {
                warn!(%isbn13, %reason, "Imported book rejected");
                summary.failed += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        total = summary.total,
        added = summary.added,
        skipped = summary.skipped,
        failed = summary.failed,
        "Import finished"
    );
    Ok(summary)
}
