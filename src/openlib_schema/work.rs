use serde::Deserialize;
use serde_with::{serde_as, DefaultOnError};

/// `/works/<id>.json`
#[serde_as]
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct Work {
    #[serde_as(as = "DefaultOnError<Vec<DefaultOnError>>")]
    #[serde(default)]
    pub subjects: Vec<Option<String>>,
}

impl Work {
    pub fn subjects(&self, limit: usize) -> Vec<String> {
        self.subjects.iter().flatten().take(limit).cloned().collect()
    }
}
