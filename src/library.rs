//! Sorting and searching the collection for display.

use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt::Display, str::FromStr};

use crate::{
    error::{Error, Result},
    types::book::BookRecord,
};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    #[default]
    TitleAsc,
    TitleDesc,
    AuthorAsc,
    YearAsc,
    YearDesc,
    Recent,
}

impl SortMode {
    pub const ALL: [SortMode; 6] = [
        Self::TitleAsc,
        Self::TitleDesc,
        Self::AuthorAsc,
        Self::YearAsc,
        Self::YearDesc,
        Self::Recent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TitleAsc => "title-asc",
            Self::TitleDesc => "title-desc",
            Self::AuthorAsc => "author-asc",
            Self::YearAsc => "year-asc",
            Self::YearDesc => "year-desc",
            Self::Recent => "recent",
        }
    }
}

impl FromStr for SortMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| Error::validation(format!("unknown sort mode '{s}'")))
    }
}

impl Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn title_key(book: &BookRecord) -> String {
    book.title.to_lowercase()
}

fn author_key(book: &BookRecord) -> String {
    book.authors.first().map(|a| a.to_lowercase()).unwrap_or_default()
}

fn year_key(book: &BookRecord) -> i32 {
    book.publish_year.unwrap_or(0)
}

fn added_key(book: &BookRecord) -> i64 {
    book.date_added
        .parse()
        .map(|d| d.timestamp_millis())
        .unwrap_or(0)
}

/// A sorted copy of `books`. Equal keys keep their collection order.
pub fn sort_books(books: &[BookRecord], mode: SortMode) -> Vec<BookRecord> {
    let mut sorted = books.to_vec();
    let compare: fn(&BookRecord, &BookRecord) -> Ordering = match mode {
        SortMode::TitleAsc => |a, b| title_key(a).cmp(&title_key(b)),
        SortMode::TitleDesc => |a, b| title_key(b).cmp(&title_key(a)),
        SortMode::AuthorAsc => |a, b| author_key(a).cmp(&author_key(b)),
        SortMode::YearAsc => |a, b| year_key(a).cmp(&year_key(b)),
        SortMode::YearDesc => |a, b| year_key(b).cmp(&year_key(a)),
        SortMode::Recent => |a, b| added_key(b).cmp(&added_key(a)),
    };
    sorted.sort_by(compare);
    sorted
}

/// Case-insensitive substring search over title, authors, ISBN-13, publisher
/// and tags. A blank query matches everything.
pub fn matches_query(book: &BookRecord, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    let fields = [
        book.title.clone(),
        book.authors.join(" "),
        book.isbn13.clone(),
        book.publisher.clone().unwrap_or_default(),
        book.tags.as_deref().unwrap_or_default().join(" "),
    ];
    fields.iter().any(|f| f.to_lowercase().contains(&query))
}

pub fn filter_books<'a>(books: &'a [BookRecord], query: &'a str) -> impl Iterator<Item = &'a BookRecord> {
    books.iter().filter(move |b| matches_query(b, query))
}
