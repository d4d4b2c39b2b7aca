//! Open Library JSON documents, as far as this crate reads them.
//!
//! Every field decodes on its own: a value of an unexpected type reads as
//! absent instead of failing the whole document.

pub mod author;
pub mod edition;
pub mod work;

use serde::Deserialize;
use serde_with::{serde_as, DefaultOnError};

/// `{"key": "/authors/OL23919A"}` and friends.
#[serde_as]
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct Reference {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub key: Option<String>,
}
