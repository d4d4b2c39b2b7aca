use chrono_humanize::HumanTime;
use shelfmark::{
    config::DisplayConfig,
    types::{
        book::{BookRecord, NewBook, ReadingStatus},
        isbn::hyphenated,
        timestamp::Timestamp,
    },
};

fn isbn(isbn13: &str) -> String {
    hyphenated(isbn13).unwrap_or_else(|| isbn13.to_string())
}

fn added(date_added: &Timestamp) -> String {
    match date_added.parse() {
        Some(ts) => format!("added {}", HumanTime::from(ts)),
        None => format!("added {date_added}"),
    }
}

fn status(status: ReadingStatus, c: &DisplayConfig) -> String {
    match status {
        ReadingStatus::Read => c.read.paint(status),
        _ => c.details.paint(status),
    }
}

/// `Title by Author (year) [status]`, plus the id for follow-up commands.
pub fn book_line(book: &BookRecord, c: &DisplayConfig) -> String {
    let mut line = format!(
        "{} by {}",
        c.title.paint(&book.title),
        c.author.paint(book.authors.join(" and "))
    );
    if let Some(year) = book.publish_year {
        line.push_str(&format!(" ({year})"));
    }
    line.push_str(&format!(" [{}]", status(book.status, c)));
    if let Some(rating) = book.rating {
        line.push_str(&format!(" {}", c.rating.paint(format!("{rating}/5"))));
    }
    line.push_str(&format!(" {}", c.details.paint(&book.id)));
    line
}

#[allow(clippy::too_many_arguments)]
fn metadata_lines(
    isbn13: &str,
    isbn10: Option<&str>,
    publisher: Option<&str>,
    publish_date: Option<&str>,
    page_count: Option<u32>,
    language: Option<&str>,
    subjects: Option<&[String]>,
    c: &DisplayConfig,
) -> Vec<String> {
    let mut lines = vec![format!("ISBN-13: {}", isbn(isbn13))];
    let optional = [
        ("ISBN-10", isbn10.map(str::to_string)),
        ("Publisher", publisher.map(str::to_string)),
        ("Published", publish_date.map(str::to_string)),
        ("Pages", page_count.map(|p| p.to_string())),
        ("Language", language.map(str::to_string)),
        ("Subjects", subjects.map(|s| s.join(", "))),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            lines.push(format!("{} {value}", c.details.paint(format!("{label}:"))));
        }
    }
    lines
}

pub fn book_details(book: &BookRecord, covers: &[String], c: &DisplayConfig) -> String {
    let mut lines = vec![book_line(book, c)];
    lines.extend(metadata_lines(
        &book.isbn13,
        book.isbn10.as_deref(),
        book.publisher.as_deref(),
        book.publish_date.as_deref(),
        book.page_count,
        book.language.as_deref(),
        book.subjects.as_deref(),
        c,
    ));
    if let Some(tags) = &book.tags {
        lines.push(format!("{} {}", c.details.paint("Tags:"), tags.join(", ")));
    }
    if let Some(notes) = &book.notes {
        lines.push(format!("{} {notes}", c.details.paint("Notes:")));
    }
    if let Some(date_read) = &book.date_read {
        lines.push(format!("{} {}", c.details.paint("Read:"), date_read.date_part()));
    }
    lines.push(c.details.paint(format!("{}, from {}", added(&book.date_added), book.source)));
    for cover in covers {
        lines.push(format!("{} {cover}", c.details.paint("Cover:")));
    }
    lines.join("\n")
}

pub fn new_book_details(book: &NewBook, c: &DisplayConfig) -> String {
    let mut lines = vec![format!(
        "{} by {}",
        c.title.paint(&book.title),
        c.author.paint(book.authors.join(" and "))
    )];
    lines.extend(metadata_lines(
        &book.isbn13,
        book.isbn10.as_deref(),
        book.publisher.as_deref(),
        book.publish_date.as_deref(),
        book.page_count,
        book.language.as_deref(),
        book.subjects.as_deref(),
        c,
    ));
    if let Some(cover) = &book.cover_url {
        lines.push(format!("{} {cover}", c.details.paint("Cover:")));
    }
    lines.push(c.details.paint(format!("from {}", book.source)));
    lines.join("\n")
}
