use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use shelfmark::{
    export::to_csv,
    import::*,
    store::{CollectionStore, MemoryBackend},
    types::{
        book::{BookDraft, ReadingStatus, Source},
        timestamp::Timestamp,
    },
    Error,
};

fn row(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn walden() -> Value {
    json!({ "isbn13": "9780804429573", "title": "Walden", "authors": ["Henry David Thoreau"] })
}

#[test]
fn json_row_with_native_names() {
    let draft = normalize_row(&row(json!({
        "id": "ignored",
        "isbn13": "9780141439518",
        "isbn10": "0141439513",
        "title": "  Pride and Prejudice ",
        "authors": ["Jane Austen"],
        "publisher": "Penguin Classics",
        "publishDate": "2002-12-31",
        "publishYear": 2002,
        "pageCount": "480",
        "language": "en",
        "subjects": ["Fiction"],
        "status": "read",
        "rating": 4.5,
        "notes": "A masterpiece",
        "tags": ["classic", "romance"],
        "dateAdded": "2001-01-01T00:00:00.000Z",
        "dateRead": "2025-07-01T12:00:00Z",
        "source": "openlibrary"
    })))
    .unwrap();

    assert_eq!(
        draft,
        BookDraft {
            id:           None,
            isbn13:       Some("9780141439518".into()),
            isbn10:       Some("0141439513".into()),
            title:        Some("Pride and Prejudice".into()),
            authors:      Some(vec!["Jane Austen".into()]),
            publisher:    Some("Penguin Classics".into()),
            publish_date: Some("2002-12-31".into()),
            publish_year: Some(2002),
            page_count:   Some(480),
            language:     Some("en".into()),
            subjects:     Some(vec!["Fiction".into()]),
            cover_url:    None,
            status:       Some(ReadingStatus::Read),
            rating:       Some(4.5),
            notes:        Some("A masterpiece".into()),
            tags:         Some(vec!["classic".into(), "romance".into()]),
            date_read:    Some(Timestamp("2025-07-01T12:00:00.000Z".into())),
            source:       Some(Source::OpenLibrary),
        }
    );
}

#[test]
fn loose_rows_get_defaults() {
    let draft = normalize_row(&row(json!({
        "isbn": "0-14-143951-3",
        "title": "Pride and Prejudice",
        "authors": "Jane Austen, Another Author",
        "status": "abandoned",
        "source": "somewhere",
        "pageCount": 12.5,
        "dateRead": "whenever"
    })))
    .unwrap();

    assert_eq!(draft.isbn13.as_deref(), Some("9780141439518"));
    assert_eq!(draft.authors.unwrap(), vec!["Jane Austen", "Another Author"]);
    assert_eq!(draft.status, Some(ReadingStatus::ToRead));
    assert_eq!(draft.source, Some(Source::Manual));
    assert_eq!(draft.page_count, None);
    assert_eq!(draft.date_read, Some(Timestamp("whenever".into())));
}

#[test]
fn missing_authors_become_unknown() {
    for authors in [json!(null), json!(""), json!([]), json!(" ; ")] {
        let draft = normalize_row(&row(json!({
            "isbn13": "9780141439518",
            "title": "Pride and Prejudice",
            "authors": authors
        })))
        .unwrap();
        assert_eq!(draft.authors.unwrap(), vec!["Unknown Author"]);
    }
}

#[test]
fn rows_without_isbn_or_title_are_dropped() {
    let cases = [
        json!({ "title": "No ISBN" }),
        json!({ "isbn13": "9780141439519", "title": "Bad check digit" }),
        json!({ "isbn13": "9780141439518" }),
        json!({ "isbn13": "9780141439518", "title": "   " }),
    ];
    for case in cases {
        assert_eq!(normalize_row(&row(case.clone())), None, "{case}");
    }
}

#[test]
fn cover_sources() {
    let base = json!({ "isbn13": "9780141439518", "title": "Pride and Prejudice" });
    let with = |key: &str, value: Value| {
        let mut r = row(base.clone());
        r.insert(key.into(), value);
        normalize_row(&r).unwrap().cover_url
    };

    assert_eq!(
        with("coverUrl", json!("https://example.com/c.jpg")).as_deref(),
        Some("https://example.com/c.jpg")
    );
    assert_eq!(
        with("cover_i", json!(8739161)).as_deref(),
        Some("https://covers.openlibrary.org/b/id/8739161-L.jpg")
    );
    assert_eq!(with("cover_i", json!(-1)), None);
    assert_eq!(
        with("imageLinks", json!({ "thumbnail": "http://books.google.com/c?id=1" })).as_deref(),
        Some("https://books.google.com/c?id=1")
    );
}

#[test]
fn json_array_and_collection_shapes() {
    let array = json!([walden(), { "title": "dropped" }]).to_string();
    let drafts = parse_imported_books(&array, "books.json").unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].title.as_deref(), Some("Walden"));

    let collection = json!({ "version": 1, "books": [walden()] }).to_string();
    assert_eq!(parse_imported_books(&collection, "BOOKS.JSON").unwrap(), drafts);

    assert_eq!(parse_imported_books("42", "books.json").unwrap(), vec![]);
}

#[test]
fn invalid_json_is_an_import_error() {
    let result = parse_imported_books("{\"books\": [", "books.json");
    assert!(matches!(result, Err(Error::InvalidImport(_))));
}

#[test]
fn csv_with_export_headers() {
    let content = "Title,Authors,ISBN-13,Status,Rating,Tags,Year,Pages\n\
                   Walden,Henry David Thoreau,9780804429573,reading,4,nature; essays,1854,352\n\
                   ,,,,,,,\n";
    let drafts = parse_imported_books(content, "library.csv").unwrap();
    assert_eq!(drafts.len(), 1);

    let walden = &drafts[0];
    assert_eq!(walden.authors.as_deref(), Some(&["Henry David Thoreau".to_string()][..]));
    assert_eq!(walden.status, Some(ReadingStatus::Reading));
    assert_eq!(walden.rating, Some(4.0));
    assert_eq!(walden.tags.as_deref(), Some(&["nature".to_string(), "essays".to_string()][..]));
    assert_eq!(walden.publish_year, Some(1854));
    assert_eq!(walden.page_count, Some(352));
}

#[test]
fn css_extension_is_read_as_csv() {
    let content = "Title,ISBN-13\nWalden,9780804429573\n";
    assert_eq!(parse_imported_books(content, "export.css").unwrap().len(), 1);
}

#[test]
fn header_only_csv_is_an_import_error() {
    let result = parse_imported_books("Title,ISBN-13\n", "books.csv");
    assert!(matches!(result, Err(Error::InvalidImport(_))));
}

#[test]
fn unknown_extension_is_unsupported() {
    for name in ["books.txt", "books", "books.tsv"] {
        assert!(matches!(
            parse_imported_books("[]", name),
            Err(Error::UnsupportedImport)
        ));
    }
}

#[test]
fn exported_csv_reads_back() {
    let store = CollectionStore::new(MemoryBackend::new());
    let book = store
        .add(BookDraft {
            isbn13: Some("9780141439518".into()),
            title: Some("Pride and Prejudice".into()),
            authors: Some(vec!["Jane Austen".into(), "Vivien Jones".into()]),
            status: Some(ReadingStatus::Read),
            rating: Some(5.0),
            tags: Some(vec!["classic".into()]),
            source: Some(Source::Manual),
            ..BookDraft::default()
        })
        .unwrap();

    let csv = to_csv(&store.books().unwrap()).unwrap();
    let drafts = parse_imported_books(&csv, "books.csv").unwrap();
    let back = drafts[0].clone();

    assert_eq!(back.isbn13, Some(book.isbn13));
    assert_eq!(back.title, Some(book.title));
    assert_eq!(back.authors, Some(book.authors));
    assert_eq!(back.status, Some(book.status));
    assert_eq!(back.rating, book.rating);
    assert_eq!(back.tags, book.tags);
}

#[test]
fn import_into_counts_each_outcome() {
    let store = CollectionStore::new(MemoryBackend::new());
    let existing = normalize_row(&row(json!({
        "isbn13": "9780141439518",
        "title": "Pride and Prejudice"
    })))
    .unwrap();
    store.add(existing.clone()).unwrap();

    let invalid = BookDraft {
        title: None,
        ..normalize_row(&row(json!({ "isbn13": "9780306406157", "title": "x" }))).unwrap()
    };
    let walden = normalize_row(&row(walden())).unwrap();
    let drafts = vec![existing, walden.clone(), walden, invalid];

    let summary = import_into(&store, drafts).unwrap();
    assert_eq!(
        summary,
        ImportSummary {
            total:   4,
            added:   1,
            skipped: 2,
            failed:  1,
        }
    );
    assert_eq!(store.books().unwrap().len(), 2);
}

#[test]
fn import_into_empty_batch() {
    let store = CollectionStore::new(MemoryBackend::new());
    assert_eq!(import_into(&store, vec![]).unwrap(), ImportSummary::default());
}
