use serde::Deserialize;
use serde_with::{serde_as, DefaultOnError};

use super::Reference;

/// `/isbn/<isbn>.json`
#[serde_as]
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct Edition {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub title:           Option<String>,
    #[serde_as(as = "DefaultOnError<Vec<DefaultOnError>>")]
    #[serde(default)]
    pub authors:         Vec<Option<Reference>>,
    #[serde_as(as = "DefaultOnError<Vec<DefaultOnError>>")]
    #[serde(default)]
    pub publishers:      Vec<Option<String>>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub publish_date:    Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub number_of_pages: Option<u32>,
    #[serde_as(as = "DefaultOnError<Vec<DefaultOnError>>")]
    #[serde(default)]
    pub isbn_10:         Vec<Option<String>>,
    #[serde_as(as = "DefaultOnError<Vec<DefaultOnError>>")]
    #[serde(default)]
    pub covers:          Vec<Option<i64>>,
    #[serde_as(as = "DefaultOnError<Vec<DefaultOnError>>")]
    #[serde(default)]
    pub languages:       Vec<Option<Reference>>,
    #[serde_as(as = "DefaultOnError<Vec<DefaultOnError>>")]
    #[serde(default)]
    pub works:           Vec<Option<Reference>>,
}

impl Edition {
    pub fn author_keys(&self) -> impl Iterator<Item = &str> {
        self.authors
            .iter()
            .filter_map(|a| a.as_ref()?.key.as_deref())
    }

    pub fn first_publisher(&self) -> Option<&str> {
        self.publishers.iter().flatten().next().map(String::as_str)
    }

    pub fn first_isbn_10(&self) -> Option<&str> {
        self.isbn_10.iter().flatten().next().map(String::as_str)
    }

    /// Only the first entry counts, and Open Library uses non-positive ids for
    /// "no cover".
    pub fn cover_id(&self) -> Option<i64> {
        self.covers.first().copied().flatten().filter(|id| *id > 0)
    }

    /// Language code of the first listed language, without the `/languages/`
    /// namespace.
    pub fn language_code(&self) -> Option<&str> {
        let key = self.languages.first()?.as_ref()?.key.as_deref()?;
        let code = key.strip_prefix("/languages/").unwrap_or(key);
        (!code.is_empty()).then_some(code)
    }

    pub fn work_key(&self) -> Option<&str> {
        self.works.first()?.as_ref()?.key.as_deref()
    }
}
