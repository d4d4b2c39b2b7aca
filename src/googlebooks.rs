//! Google Books, the fallback source. Also asked for the language alone when
//! Open Library has the book but not its language.

use serde::Deserialize;
use serde_with::{serde_as, DefaultOnError};

use crate::{
    lookup::{extract_year, fetch_object, Endpoints, Fetch},
    openlibrary::UNKNOWN_TITLE,
    types::book::{NewBook, ReadingStatus, Source, MAX_SUBJECTS},
};

#[serde_as]
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct Volumes {
    #[serde_as(as = "DefaultOnError<Vec<DefaultOnError>>")]
    #[serde(default)]
    pub items: Vec<Option<Volume>>,
}

#[serde_as]
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct Volume {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default, rename = "volumeInfo")]
    pub volume_info: Option<VolumeInfo>,
}

#[serde_as]
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub title:                Option<String>,
    #[serde_as(as = "DefaultOnError<Vec<DefaultOnError>>")]
    #[serde(default)]
    pub authors:              Vec<Option<String>>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub publisher:            Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub published_date:       Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub page_count:           Option<u32>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub language:             Option<String>,
    #[serde_as(as = "DefaultOnError<Vec<DefaultOnError>>")]
    #[serde(default)]
    pub categories:           Vec<Option<String>>,
    #[serde_as(as = "DefaultOnError<Vec<DefaultOnError>>")]
    #[serde(default)]
    pub industry_identifiers: Vec<Option<IndustryIdentifier>>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub image_links:          Option<ImageLinks>,
}

#[serde_as]
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct IndustryIdentifier {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default, rename = "type")]
    pub kind:       Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub identifier: Option<String>,
}

#[serde_as]
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct ImageLinks {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl Volumes {
    /// Volume info of the first search hit. `None` when there are no hits; a
    /// hit without `volumeInfo` reads as an empty one.
    pub fn first_info(self) -> Option<VolumeInfo> {
        let first = self.items.into_iter().next()?;
        Some(first.and_then(|v| v.volume_info).unwrap_or_default())
    }
}

impl VolumeInfo {
    fn isbn10(&self) -> Option<String> {
        self.industry_identifiers
            .iter()
            .flatten()
            .find(|id| id.kind.as_deref() == Some("ISBN_10"))
            .and_then(|id| id.identifier.clone())
    }

    fn cover_url(&self) -> Option<String> {
        let thumbnail = self.image_links.as_ref()?.thumbnail.as_deref()?;
        match thumbnail.strip_prefix("http://") {
            Some(rest) => Some(format!("https://{rest}")),
            None => Some(thumbnail.to_string()),
        }
    }
}

async fn first_volume<F: Fetch>(fetcher: &F, endpoints: &Endpoints, isbn: &str) -> Option<VolumeInfo> {
    fetch_object::<_, Volumes>(fetcher, &endpoints.google_books_volumes(isbn))
        .await?
        .first_info()
}

/// Full lookup of `isbn` (already cleaned).
pub async fn lookup<F: Fetch>(
    fetcher: &F,
    endpoints: &Endpoints,
    isbn: &str,
    isbn13: &str,
) -> Option<NewBook> {
    let info = first_volume(fetcher, endpoints, isbn).await?;

    let subjects: Vec<String> = info
        .categories
        .iter()
        .flatten()
        .take(MAX_SUBJECTS)
        .cloned()
        .collect();

    Some(NewBook {
        isbn13: isbn13.to_string(),
        isbn10: info.isbn10(),
        cover_url: info.cover_url(),
        title: info
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.into()),
        authors: info.authors.iter().flatten().cloned().collect(),
        publisher: info.publisher.clone().filter(|p| !p.is_empty()),
        publish_year: info.published_date.as_deref().and_then(extract_year),
        publish_date: info.published_date.clone().filter(|d| !d.is_empty()),
        page_count: info.page_count.filter(|n| *n > 0),
        language: info.language.clone().filter(|l| !l.is_empty()),
        subjects: (!subjects.is_empty()).then_some(subjects),
        status: ReadingStatus::ToRead,
        source: Source::GoogleBooks,
    })
}

/// Only the language of the first hit, for enriching another source's result.
pub async fn lookup_language<F: Fetch>(
    fetcher: &F,
    endpoints: &Endpoints,
    isbn: &str,
) -> Option<String> {
    first_volume(fetcher, endpoints, isbn)
        .await?
        .language
        .filter(|l| !l.is_empty())
}
