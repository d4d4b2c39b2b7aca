use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::{sync::Arc, thread};

use shelfmark::{
    store::{Backend, Collection, CollectionStore, FileBackend, MemoryBackend},
    types::book::{BookDraft, ReadingStatus, Source},
    Error,
};

fn draft(isbn13: &str, title: &str) -> BookDraft {
    BookDraft {
        isbn13: Some(isbn13.into()),
        title: Some(title.into()),
        authors: Some(vec!["Jane Austen".into()]),
        status: Some(ReadingStatus::ToRead),
        source: Some(Source::Manual),
        ..BookDraft::default()
    }
}

fn stored_book(id: &str) -> Value {
    json!({
        "id": id,
        "isbn13": "9780141439518",
        "title": "Pride and Prejudice",
        "authors": ["Jane Austen"],
        "status": "read",
        "dateAdded": "2025-06-15T12:00:00.000Z",
        "source": "openlibrary"
    })
}

fn stored(store: &CollectionStore<MemoryBackend>) -> Value {
    serde_json::from_str(&store.backend().contents().expect("something was written")).unwrap()
}

#[test]
fn missing_data_loads_empty() {
    let store = CollectionStore::new(MemoryBackend::new());
    assert_eq!(store.load().unwrap(), Collection::default());
    assert_eq!(store.backend().contents(), None);
}

#[test]
fn unparsable_bytes_load_empty_and_are_left_alone() {
    let store = CollectionStore::new(MemoryBackend::with_contents("{not json"));
    assert_eq!(store.load().unwrap(), Collection::default());
    assert_eq!(store.backend().contents().as_deref(), Some("{not json"));
}

#[test]
fn malformed_book_is_dropped_not_the_whole_load() {
    let mut broken = stored_book("b");
    broken.as_object_mut().unwrap().remove("authors");
    let payload = json!({ "version": 1, "books": [stored_book("a"), broken] });
    let store = CollectionStore::new(MemoryBackend::with_contents(payload.to_string()));

    let books = store.books().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id, "a");
    // the normalized collection is written back right away
    assert_eq!(stored(&store)["books"].as_array().unwrap().len(), 1);
}

#[test]
fn clean_payload_is_not_rewritten() {
    let payload = serde_json::to_string(&json!({ "version": 1, "books": [stored_book("a")] })).unwrap();
    let store = CollectionStore::new(MemoryBackend::with_contents(payload.clone()));
    assert_eq!(store.books().unwrap().len(), 1);
    assert_eq!(store.backend().contents(), Some(payload));
}

#[test]
fn missing_version_migrates_to_v1() {
    let payload = json!({ "books": [stored_book("a")] });
    let store = CollectionStore::new(MemoryBackend::with_contents(payload.to_string()));
    assert_eq!(store.load().unwrap().version, 1);
    assert_eq!(stored(&store)["version"], json!(1));
}

#[test]
fn unknown_version_is_refused_and_kept() {
    let payload = json!({ "version": 2, "books": [stored_book("a")] }).to_string();
    let store = CollectionStore::new(MemoryBackend::with_contents(payload.clone()));
    assert!(matches!(store.load(), Err(Error::UnsupportedVersion(v)) if v == "2"));
    assert!(store.add(draft("9780804429573", "Walden")).is_err());
    assert_eq!(store.backend().contents(), Some(payload));
}

#[test]
fn float_version_one_loads_and_accepts_writes() {
    let payload = json!({ "version": 1.0, "books": [stored_book("a")] }).to_string();
    let store = CollectionStore::new(MemoryBackend::with_contents(payload));
    assert_eq!(store.load().unwrap().books.len(), 1);
    store.add(draft("9780804429573", "Walden")).unwrap();
    assert_eq!(stored(&store)["books"].as_array().unwrap().len(), 2);
}

#[test]
fn integer_numbers_do_not_trigger_a_rewrite() {
    let mut book = stored_book("a");
    book["rating"] = json!(4);
    book["pageCount"] = json!(480);
    let payload = json!({ "version": 1, "books": [book] }).to_string();
    let store = CollectionStore::new(MemoryBackend::with_contents(payload.clone()));

    assert_eq!(store.books().unwrap()[0].rating, Some(4.0));
    assert_eq!(store.backend().contents(), Some(payload));
}

#[test]
fn save_replaces_everything() {
    let payload = json!({ "version": 1, "books": [stored_book("a"), stored_book("b")] }).to_string();
    let store = CollectionStore::new(MemoryBackend::with_contents(payload));
    assert_eq!(store.books().unwrap().len(), 2);

    let replacement = store.load().unwrap().books.into_iter().take(1).collect();
    store
        .save(&Collection {
            version: 7,
            books:   replacement,
        })
        .unwrap();

    assert_eq!(store.books().unwrap().len(), 1);
    assert_eq!(store.books().unwrap()[0].id, "a");
    let written = stored(&store);
    assert_eq!(written["version"], json!(1));
    assert_eq!(written["books"].as_array().unwrap().len(), 1);
    assert_eq!(written["books"][0]["id"], json!("a"));
}

#[test]
fn save_to_file_is_pretty_and_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.json");
    let store = CollectionStore::new(FileBackend::new(&path));
    store.add(draft("9780804429573", "Walden")).unwrap();
    let kept = store.add(draft("9780141439518", "Pride and Prejudice")).unwrap();

    store
        .save(&Collection {
            version: 1,
            books:   vec![kept.clone()],
        })
        .unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("{\n  \"version\": 1"));
    assert_eq!(store.books().unwrap(), vec![kept.clone()]);
    let reopened = CollectionStore::new(FileBackend::new(&path));
    assert_eq!(reopened.books().unwrap(), vec![kept]);
}

#[test]
fn add_assigns_id_and_date() {
    let store = CollectionStore::new(MemoryBackend::new());
    let mut input = draft("9780141439518", "Pride and Prejudice");
    input.id = Some("chosen-by-caller".into());
    let book = store.add(input).unwrap();

    assert_ne!(book.id, "chosen-by-caller");
    assert!(book.date_added.parse().is_some());
    assert_eq!(store.books().unwrap(), vec![book.clone()]);
    assert_eq!(stored(&store)["books"][0]["id"], json!(book.id));
}

#[test]
fn add_validates_required_fields() {
    let store = CollectionStore::new(MemoryBackend::new());
    let cases = [
        BookDraft {
            title: None,
            ..draft("9780141439518", "x")
        },
        BookDraft {
            authors: Some(vec![]),
            ..draft("9780141439518", "x")
        },
        BookDraft {
            status: None,
            ..draft("9780141439518", "x")
        },
        BookDraft {
            source: None,
            ..draft("9780141439518", "x")
        },
        draft("9780141439519", "Wrong check digit"),
        draft("9780141439518", "   "),
    ];
    for case in cases {
        assert!(matches!(store.add(case), Err(Error::Validation(_))));
    }
    assert_eq!(store.books().unwrap(), vec![]);
}

#[test]
fn add_does_not_reject_duplicate_isbn() {
    let store = CollectionStore::new(MemoryBackend::new());
    store.add(draft("9780141439518", "First")).unwrap();
    store.add(draft("9780141439518", "Second")).unwrap();
    assert_eq!(store.books().unwrap().len(), 2);
}

#[test]
fn subjects_are_capped() {
    let store = CollectionStore::new(MemoryBackend::new());
    let book = store
        .add(BookDraft {
            subjects: Some((0..15).map(|i| format!("subject {i}")).collect()),
            ..draft("9780141439518", "Pride and Prejudice")
        })
        .unwrap();
    assert_eq!(book.subjects.unwrap().len(), 10);
}

#[test]
fn update_keeps_id_and_date_added() {
    let store = CollectionStore::new(MemoryBackend::new());
    let book = store.add(draft("9780141439518", "Pride and Prejudice")).unwrap();

    let updated = store
        .update(
            &book.id,
            BookDraft {
                id: Some("other".into()),
                status: Some(ReadingStatus::Read),
                rating: Some(4.5),
                ..BookDraft::default()
            },
        )
        .unwrap();

    assert_eq!(updated.id, book.id);
    assert_eq!(updated.date_added, book.date_added);
    assert_eq!(updated.status, ReadingStatus::Read);
    assert_eq!(updated.rating, Some(4.5));
    assert_eq!(updated.title, "Pride and Prejudice");
    assert_eq!(store.find_by_id(&book.id).unwrap(), Some(updated));
}

#[test]
fn update_rejects_invalid_fields_whole() {
    let store = CollectionStore::new(MemoryBackend::new());
    let book = store.add(draft("9780141439518", "Pride and Prejudice")).unwrap();
    let result = store.update(
        &book.id,
        BookDraft {
            notes: Some("should not stick".into()),
            authors: Some(vec![" ".into()]),
            ..BookDraft::default()
        },
    );
    assert!(matches!(result, Err(Error::Validation(_))));
    assert_eq!(store.find_by_id(&book.id).unwrap(), Some(book));
}

#[test]
fn update_unknown_id() {
    let store = CollectionStore::new(MemoryBackend::new());
    let result = store.update("missing", BookDraft::default());
    assert!(matches!(result, Err(Error::RecordNotFound(id)) if id == "missing"));
}

#[test]
fn remove_and_clear() {
    let store = CollectionStore::new(MemoryBackend::new());
    let a = store.add(draft("9780141439518", "Pride and Prejudice")).unwrap();
    let b = store.add(draft("9780804429573", "Walden")).unwrap();

    assert!(!store.remove("missing").unwrap());
    assert!(store.remove(&a.id).unwrap());
    assert_eq!(store.books().unwrap(), vec![b]);

    store.clear().unwrap();
    assert_eq!(store.books().unwrap(), vec![]);
    assert_eq!(stored(&store), json!({ "version": 1, "books": [] }));
}

#[test]
fn find_by_isbn13() {
    let store = CollectionStore::new(MemoryBackend::new());
    let book = store.add(draft("9780141439518", "Pride and Prejudice")).unwrap();
    assert_eq!(store.find_by_isbn13("9780141439518").unwrap(), Some(book));
    assert_eq!(store.find_by_isbn13("9780804429573").unwrap(), None);
}

#[test]
fn concurrent_adds_are_all_kept() {
    let store = Arc::new(CollectionStore::new(MemoryBackend::new()));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                store
                    .add(draft("9780141439518", &format!("Copy {i}")))
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.books().unwrap().len(), 8);
    assert_eq!(stored(&store)["books"].as_array().unwrap().len(), 8);
}

#[test]
fn file_backend_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("books.json");

    let store = CollectionStore::new(FileBackend::new(&path));
    let book = store.add(draft("9780141439518", "Pride and Prejudice")).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("\n  \"books\""), "file store writes pretty JSON");

    let reopened = CollectionStore::new(FileBackend::new(&path));
    assert_eq!(reopened.books().unwrap(), vec![book]);
}

#[test]
fn file_backend_missing_file_reads_none() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FileBackend::new(dir.path().join("books.json"));
    assert_eq!(backend.read().unwrap(), None);
}
