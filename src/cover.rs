//! Cover image URLs to try for a book, best first.

use reqwest::Url;

use crate::{lookup::Endpoints, types::book::BookRecord};

const OPEN_LIBRARY_COVERS_HOST: &str = "covers.openlibrary.org";

/// Normalizes a stored cover URL to `https`, or `None` if it cannot be used.
///
/// Accepts spreadsheet formulas of the form `="https://..."` (left behind by
/// exported sheets), protocol-relative `//host/...` and plain `http://`.
/// Open Library cover URLs get `default=false` so a missing cover is a 404
/// instead of a blank placeholder.
pub fn normalize_cover_url(raw: &str) -> Option<String> {
    let mut value = raw.trim();
    if let Some(inner) = value
        .strip_prefix('=')
        .map(str::trim_start)
        .and_then(|v| v.strip_prefix('"'))
        .and_then(|v| v.strip_suffix('"'))
    {
        value = inner.trim();
    }
    if value.is_empty() {
        return None;
    }

    let value = if let Some(rest) = value.strip_prefix("//") {
        format!("https://{rest}")
    } else if let Some(rest) = value.strip_prefix("http://") {
        format!("https://{rest}")
    } else if value.starts_with("https://") {
        value.to_string()
    } else {
        return None;
    };

    let mut url = Url::parse(&value).ok()?;
    if url.host_str() == Some(OPEN_LIBRARY_COVERS_HOST)
        && !url.query_pairs().any(|(key, _)| key == "default")
    {
        url.query_pairs_mut().append_pair("default", "false");
    }
    Some(url.to_string())
}

/// The normalized stored cover, then Open Library's by-ISBN covers, without
/// duplicates.
pub fn cover_candidates(book: &BookRecord, endpoints: &Endpoints) -> Vec<String> {
    let candidates = [
        book.cover_url.as_deref().and_then(normalize_cover_url),
        Some(endpoints.cover_by_isbn(&book.isbn13)),
        book.isbn10.as_deref().map(|isbn| endpoints.cover_by_isbn(isbn)),
    ];
    let mut unique: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates.into_iter().flatten() {
        if !unique.contains(&candidate) {
            unique.push(candidate);
        }
    }
    unique
}
