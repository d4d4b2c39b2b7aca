use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid ISBN format")]
    InvalidIsbn,

    /// A book field is missing, blank, or holds a value outside its allowed set
    #[error("Invalid book: {0}")]
    Validation(String),

    /// None of the metadata sources know this ISBN
    #[error("Book not found")]
    BookNotFound,

    #[error("A book with ISBN {0} is already in the collection")]
    DuplicateIsbn(String),

    #[error("No book with id {0}")]
    RecordNotFound(String),

    #[error("Unsupported collection version {0}")]
    UnsupportedVersion(String),

    #[error("Unsupported file type. Use JSON or CSV.")]
    UnsupportedImport,

    #[error("Invalid import file: {0}")]
    InvalidImport(String),

    #[error("{0}")]
    Webhook(String),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
