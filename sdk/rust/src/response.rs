//! Result rows

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// One row of a broker response.
///
/// `groupBy` rows carry their values under `event`, `timeseries` and `topN`
/// rows under `result`. [`ResponseRow::get`] looks in both before falling
/// back to the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseRow(Map<String, JsonValue>);

impl ResponseRow {
    pub fn new(row: Map<String, JsonValue>) -> Self {
        Self(row)
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.0.get("timestamp").and_then(JsonValue::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        ["event", "result"]
            .iter()
            .filter_map(|key| self.0.get(*key).and_then(JsonValue::as_object))
            .find_map(|inner| inner.get(field))
            .or_else(|| self.0.get(field))
    }

    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, JsonValue> {
        self.0
    }
}
