//! ISBN metadata resolution across Open Library and Google Books.
//!
//! Open Library is asked first and wins for every field. When it has the book
//! but no language, Google Books is asked for the language alone. When Open
//! Library has nothing usable, Google Books is the full fallback. Sources are
//! tried strictly one after another and a failed request is never retried.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{future::Future, sync::OnceLock, time::Duration};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    googlebooks, openlibrary,
    types::{
        book::NewBook,
        isbn::{clean_isbn, to_isbn13},
    },
};

const USER_AGENT: &str = concat!("shelfmark/", env!("CARGO_PKG_VERSION"));

/// Why a single request produced nothing. Never leaves the resolver.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid JSON: {0}")]
    Decode(String),
}

/// Fetches a JSON document by URL.
pub trait Fetch {
    fn get_json(&self, url: &str) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

impl<T: Fetch + Sync> Fetch for &T {
    fn get_json(&self, url: &str) -> impl Future<Output = Result<Value, FetchError>> + Send {
        (**self).get_json(url)
    }
}

/// [Fetch] over HTTP, every request bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Transport(e.to_string())
            }
        };
        let resp = self.client.get(url).send().await.map_err(classify)?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }
        let body = resp.text().await.map_err(classify)?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Base URLs of the metadata sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub open_library: String,
    pub covers:       String,
    pub google_books: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            open_library: "https://openlibrary.org".into(),
            covers:       "https://covers.openlibrary.org".into(),
            google_books: "https://www.googleapis.com/books/v1".into(),
        }
    }
}

impl Endpoints {
    pub fn open_library_isbn(&self, isbn: &str) -> String {
        format!("{}/isbn/{isbn}.json", self.open_library)
    }

    /// `key` is an Open Library path such as `/authors/OL23919A`.
    pub fn open_library_key(&self, key: &str) -> String {
        format!("{}{key}.json", self.open_library)
    }

    pub fn cover_by_id(&self, cover_id: i64) -> String {
        format!("{}/b/id/{cover_id}-L.jpg", self.covers)
    }

    /// Open Library answers 404 instead of a placeholder image when asked
    /// with `default=false`.
    pub fn cover_by_isbn(&self, isbn: &str) -> String {
        format!("{}/b/isbn/{isbn}-L.jpg?default=false", self.covers)
    }

    pub fn google_books_volumes(&self, isbn: &str) -> String {
        format!("{}/volumes?q=isbn:{isbn}", self.google_books)
    }
}

/// Fetches and decodes `url`, logging and swallowing any failure.
pub(crate) async fn fetch_document<F: Fetch>(fetcher: &F, url: &str) -> Option<Value> {
    match fetcher.get_json(url).await {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(url, error = %e, "Source request failed");
            None
        }
    }
}

/// Fetches `url` and decodes it as `T`. The document must be a JSON object;
/// anything else counts as an unusable response.
pub(crate) async fn fetch_object<F: Fetch, T: DeserializeOwned>(fetcher: &F, url: &str) -> Option<T> {
    let value = fetch_document(fetcher, url).await?;
    if !value.is_object() {
        debug!(url, "Source returned a non-object document");
        return None;
    }
    match serde_json::from_value(value) {
        Ok(doc) => Some(doc),
        Err(e) => {
            debug!(url, error = %e, "Source document did not decode");
            None
        }
    }
}

/// First run of four digits in a free-form date, e.g. "March 2004" -> 2004.
pub fn extract_year(date: &str) -> Option<i32> {
    static YEAR: OnceLock<Option<Regex>> = OnceLock::new();
    let year = YEAR.get_or_init(|| Regex::new(r"\d{4}").ok()).as_ref()?;
    year.find(date)?.as_str().parse().ok()
}

pub struct MetadataResolver<F> {
    fetcher:   F,
    endpoints: Endpoints,
}

impl<F: Fetch + Sync> MetadataResolver<F> {
    pub fn new(fetcher: F, endpoints: Endpoints) -> Self {
        Self { fetcher, endpoints }
    }

    /// Metadata for `isbn`, or `None` if no source knows it. The input must
    /// convert to an ISBN-13; anything else resolves to `None` without a
    /// single request.
    pub async fn lookup(&self, isbn: &str) -> Option<NewBook> {
        let cleaned = clean_isbn(isbn);
        let isbn13 = to_isbn13(&cleaned)?;

        if let Some(mut book) =
            openlibrary::lookup(&self.fetcher, &self.endpoints, &cleaned, &isbn13).await
        {
            if book.language.is_none() {
                book.language =
                    googlebooks::lookup_language(&self.fetcher, &self.endpoints, &cleaned).await;
            }
            info!(%isbn13, source = %book.source, "Resolved book");
            return Some(book);
        }

        let book = googlebooks::lookup(&self.fetcher, &self.endpoints, &cleaned, &isbn13).await;
        match &book {
            Some(book) => info!(%isbn13, source = %book.source, "Resolved book"),
            None => info!(%isbn13, "No source knows this ISBN"),
        }
        book
    }
}
