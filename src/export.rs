use serde::Serialize;
use std::{fmt::Display, str::FromStr};

use crate::{
    error::{Error, Result},
    store::Collection,
    types::{
        book::{BookRecord, ReadingStatus},
        timestamp::Timestamp,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Goodreads,
    LibraryThing,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [Self::Csv, Self::Goodreads, Self::LibraryThing, Self::Json];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Goodreads => "goodreads",
            Self::LibraryThing => "librarything",
            Self::Json => "json",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Csv => "books.csv",
            Self::Goodreads => "goodreads-import.csv",
            Self::LibraryThing => "librarything-import.tsv",
            Self::Json => "books.json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv | Self::Goodreads => "text/csv; charset=utf-8",
            Self::LibraryThing => "text/tab-separated-values; charset=utf-8",
            Self::Json => "application/json",
        }
    }

    pub fn render(&self, collection: &Collection) -> Result<String> {
        match self {
            Self::Csv => to_csv(&collection.books),
            Self::Goodreads => to_goodreads_csv(&collection.books),
            Self::LibraryThing => to_librarything_tsv(&collection.books),
            Self::Json => to_json(collection),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| Error::validation(format!("unknown export format '{s}'")))
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const CSV_HEADER: [&str; 15] = [
    "Title",
    "Authors",
    "ISBN-13",
    "ISBN-10",
    "Publisher",
    "Publish Date",
    "Year",
    "Pages",
    "Language",
    "Status",
    "Rating",
    "Date Added",
    "Date Read",
    "Tags",
    "Notes",
];

const GOODREADS_HEADER: [&str; 11] = [
    "Title",
    "Author",
    "ISBN",
    "ISBN13",
    "My Rating",
    "Number of Pages",
    "Year Published",
    "Date Read",
    "Date Added",
    "Exclusive Shelf",
    "My Review",
];

const LIBRARYTHING_HEADER: [&str; 10] = [
    "Title",
    "Author (First, Last)",
    "Date",
    "ISBN",
    "Rating",
    "Tags",
    "Review",
    "Page Count",
    "Publication",
    "Date Read",
];

#[derive(Serialize)]
struct CsvRow {
    title:        String,
    authors:      String,
    isbn13:       String,
    isbn10:       String,
    publisher:    String,
    publish_date: String,
    year:         String,
    pages:        String,
    language:     String,
    status:       &'static str,
    rating:       String,
    date_added:   String,
    date_read:    String,
    tags:         String,
    notes:        String,
}

#[derive(Serialize)]
struct GoodreadsRow {
    title:           String,
    author:          String,
    isbn:            String,
    isbn13:          String,
    my_rating:       String,
    number_of_pages: String,
    year_published:  String,
    date_read:       String,
    date_added:      String,
    exclusive_shelf: &'static str,
    my_review:       String,
}

#[derive(Serialize)]
struct LibraryThingRow {
    title:       String,
    author:      String,
    date:        String,
    isbn:        String,
    rating:      String,
    tags:        String,
    review:      String,
    page_count:  String,
    publication: String,
    date_read:   String,
}

/// Prefixes values a spreadsheet would evaluate as a formula with `'`.
pub fn formula_safe(value: &str) -> String {
    match value.trim_start().chars().next() {
        Some('=' | '+' | '-' | '@') => format!("'{value}"),
        _ => value.to_string(),
    }
}

fn text(value: Option<&str>) -> String {
    formula_safe(value.unwrap_or_default())
}

fn number<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Goodreads shelf for a reading status.
pub fn goodreads_shelf(status: ReadingStatus) -> &'static str {
    match status {
        ReadingStatus::ToRead => "to-read",
        ReadingStatus::Reading => "currently-reading",
        ReadingStatus::Read => "read",
    }
}

fn goodreads_date(timestamp: &Timestamp) -> String {
    timestamp
        .parse()
        .map(|d| d.format("%Y/%m/%d").to_string())
        .unwrap_or_default()
}

fn into_string(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = wtr.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Writes `header` and then `rows`, with `\n` line endings. `quote` decides
/// whether the csv crate quotes cells itself.
fn write_table<R: Serialize>(
    delimiter: u8,
    quote: csv::QuoteStyle,
    header: &[&str],
    rows: impl IntoIterator<Item = R>,
) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(quote)
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(header)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    into_string(wtr)
}

/// `value` as one comma separated cell, quoted and escaped only when needed.
fn csv_cell(value: &str) -> Result<String> {
    if value.is_empty() {
        return Ok(String::new());
    }
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record([value])?;
    let cell = into_string(wtr)?;
    Ok(cell.strip_suffix('\n').unwrap_or(&cell).to_string())
}

/// `="<isbn>"`, left unquoted so spreadsheets read it as a text formula.
fn goodreads_isbn(isbn: &str) -> String {
    format!("=\"{isbn}\"")
}

/// Everything this crate knows about each book, one row per book.
pub fn to_csv(books: &[BookRecord]) -> Result<String> {
    let rows = books.iter().map(|b| CsvRow {
        title:        formula_safe(&b.title),
        authors:      formula_safe(&b.authors.join("; ")),
        isbn13:       b.isbn13.clone(),
        isbn10:       b.isbn10.clone().unwrap_or_default(),
        publisher:    text(b.publisher.as_deref()),
        publish_date: text(b.publish_date.as_deref()),
        year:         number(b.publish_year),
        pages:        number(b.page_count),
        language:     text(b.language.as_deref()),
        status:       b.status.as_str(),
        rating:       number(b.rating),
        date_added:   b.date_added.to_string(),
        date_read:    number(b.date_read.as_ref()),
        tags:         formula_safe(&b.tags.as_deref().unwrap_or_default().join("; ")),
        notes:        text(b.notes.as_deref()),
    });
    write_table(b',', csv::QuoteStyle::Necessary, &CSV_HEADER, rows)
}

/// CSV in the shape of a Goodreads library export, so Goodreads can import
/// it. Only the first author is kept and ISBNs are written as bare `="..."`
/// cells to stop spreadsheets from turning them into numbers. The writer never
/// quotes; free-text cells are escaped one by one beforehand.
pub fn to_goodreads_csv(books: &[BookRecord]) -> Result<String> {
    let rows = books
        .iter()
        .map(|b| {
            Ok(GoodreadsRow {
                title:           csv_cell(&formula_safe(&b.title))?,
                author:          csv_cell(&text(b.authors.first().map(String::as_str)))?,
                isbn:            goodreads_isbn(b.isbn10.as_deref().unwrap_or_default()),
                isbn13:          goodreads_isbn(&b.isbn13),
                my_rating:       b.rating.map(|r| r.to_string()).unwrap_or_else(|| "0".into()),
                number_of_pages: number(b.page_count),
                year_published:  number(b.publish_year),
                date_read:       b.date_read.as_ref().map(goodreads_date).unwrap_or_default(),
                date_added:      goodreads_date(&b.date_added),
                exclusive_shelf: goodreads_shelf(b.status),
                my_review:       csv_cell(&text(b.notes.as_deref()))?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    write_table(b',', csv::QuoteStyle::Never, &GOODREADS_HEADER, rows)
}

/// Tab separated, as LibraryThing's importer expects.
pub fn to_librarything_tsv(books: &[BookRecord]) -> Result<String> {
    let rows = books.iter().map(|b| LibraryThingRow {
        title:       formula_safe(&b.title),
        author:      text(b.authors.first().map(String::as_str)),
        date:        b.date_added.date_part().to_string(),
        isbn:        b.isbn13.clone(),
        rating:      number(b.rating),
        tags:        formula_safe(&b.tags.as_deref().unwrap_or_default().join(", ")),
        review:      text(b.notes.as_deref()),
        page_count:  number(b.page_count),
        publication: text(b.publisher.as_deref()),
        date_read:   b.date_read.as_ref().map(|d| d.date_part().to_string()).unwrap_or_default(),
    });
    write_table(b'\t', csv::QuoteStyle::Necessary, &LIBRARYTHING_HEADER, rows)
}

pub fn to_json(collection: &Collection) -> Result<String> {
    Ok(serde_json::to_string_pretty(collection)?)
}
