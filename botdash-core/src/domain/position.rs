//! OpenPosition: a position the bot currently holds.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::lenient;
use super::trade::parse_timestamp;

/// Open position as stored in the snapshot, keyed by symbol in the parent map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub entry: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub stop: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub target: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub reason: Option<String>,
}

impl OpenPosition {
    pub fn opened_at(&self) -> Option<NaiveDateTime> {
        self.time.as_deref().and_then(parse_timestamp)
    }
}
