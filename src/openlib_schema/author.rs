use serde::Deserialize;
use serde_with::{serde_as, DefaultOnError};

/// `/authors/<id>.json`
#[serde_as]
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct Author {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub name: Option<String>,
}
