pub mod config;
pub mod cover;
pub mod error;
pub mod export;
pub mod googlebooks;
pub mod import;
pub mod library;
pub mod lookup;
pub mod openlib_schema;
pub mod openlibrary;
pub mod scan;
pub mod store;
pub mod types;
pub mod webhook;

pub use error::{Error, Result};
