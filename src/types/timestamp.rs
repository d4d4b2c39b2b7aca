use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// ISO-8601 timestamp as persisted in the collection.
///
/// Kept as the literal string that was stored, so records written by other
/// tools survive a load/save cycle byte for byte. [Timestamp::parse] gives
/// the typed view when one is needed.
#[derive(Default, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub String);

impl Timestamp {
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    pub fn parse(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.0)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }

    /// Calendar date part, i.e. everything before the `T`.
    pub fn date_part(&self) -> &str {
        self.0.split('T').next().unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(ts: DateTime<Utc>) -> Self {
        Self(ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
