//! Open Library, the primary metadata source.

use tracing::debug;

use crate::{
    lookup::{extract_year, fetch_object, Endpoints, Fetch},
    openlib_schema::{author::Author, edition::Edition, work::Work},
    types::book::{NewBook, ReadingStatus, Source, MAX_SUBJECTS},
};

pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Resolves `isbn` (already cleaned) through the edition document and its
/// author and work references. `None` means the edition itself was
/// unavailable; author and work failures only thin out the result.
pub async fn lookup<F: Fetch>(
    fetcher: &F,
    endpoints: &Endpoints,
    isbn: &str,
    isbn13: &str,
) -> Option<NewBook> {
    let edition: Edition = fetch_object(fetcher, &endpoints.open_library_isbn(isbn)).await?;

    let mut authors = Vec::new();
    for key in edition.author_keys() {
        match fetch_object::<_, Author>(fetcher, &endpoints.open_library_key(key)).await {
            Some(author) => authors.push(author.name.unwrap_or_else(|| UNKNOWN_AUTHOR.into())),
            None => debug!(key, "Skipping unresolved author"),
        }
    }

    let subjects = match edition.work_key() {
        Some(key) => fetch_object::<_, Work>(fetcher, &endpoints.open_library_key(key))
            .await
            .map(|work| work.subjects(MAX_SUBJECTS))
            .filter(|subjects| !subjects.is_empty()),
        None => None,
    };

    let isbn10 = if isbn.len() == 10 {
        Some(isbn.to_string())
    } else {
        edition.first_isbn_10().map(str::to_string)
    };

    Some(NewBook {
        isbn13: isbn13.to_string(),
        isbn10,
        title: edition
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.into()),
        authors,
        publisher: edition.first_publisher().map(str::to_string),
        publish_year: edition.publish_date.as_deref().and_then(extract_year),
        publish_date: edition.publish_date.clone().filter(|d| !d.is_empty()),
        page_count: edition.number_of_pages.filter(|n| *n > 0),
        language: edition.language_code().map(str::to_string),
        subjects,
        cover_url: edition.cover_id().map(|id| endpoints.cover_by_id(id)),
        status: ReadingStatus::ToRead,
        source: Source::OpenLibrary,
    })
}
