//! Lowering of filter trees to the broker's filter JSON
//!
//! - predicate: `{"type": "selector", "dimension": .., "value": ..}`
//! - and / or: `{"type": "and" | "or", "fields": [..]}`
//! - not: `{"type": "not", "field": ..}`
//!
//! Object keys keep insertion order (`serde_json/preserve_order`), so the
//! same tree always lowers to byte-identical text.

use serde_json::{Map, Value as JsonValue};

use crate::error::FilterError;

use super::expression::{FilterExpression, Operator, OperatorKind};
use super::predicate::Predicate;

impl FilterExpression {
    /// Lower this tree to its wire representation
    pub fn to_json(&self) -> Result<JsonValue, FilterError> {
        match self {
            Self::Predicate(p) => p.to_json(),
            Self::Operator(op) => op.to_json(),
        }
    }

    /// Compact JSON text of [`Self::to_json`]
    pub fn to_json_string(&self) -> Result<String, FilterError> {
        Ok(self.to_json()?.to_string())
    }
}

impl Predicate {
    fn to_json(&self) -> Result<JsonValue, FilterError> {
        let value = self.value().ok_or_else(|| FilterError::MissingValue {
            dimension: self.dimension().to_string(),
        })?;

        let mut obj = Map::with_capacity(3);
        obj.insert("type".into(), "selector".into());
        obj.insert("dimension".into(), self.dimension().into());
        obj.insert("value".into(), value.into());
        Ok(JsonValue::Object(obj))
    }
}

impl Operator {
    fn to_json(&self) -> Result<JsonValue, FilterError> {
        let mut obj = Map::with_capacity(2);
        obj.insert("type".into(), self.kind().as_str().into());

        match self.kind() {
            OperatorKind::Not => {
                let field = self
                    .children()
                    .first()
                    .ok_or_else(|| FilterError::invalid("negation without operand"))?;
                obj.insert("field".into(), field.to_json()?);
            }
            OperatorKind::And | OperatorKind::Or => {
                let fields = self
                    .children()
                    .iter()
                    .map(FilterExpression::to_json)
                    .collect::<Result<Vec<_>, _>>()?;
                obj.insert("fields".into(), JsonValue::Array(fields));
            }
        }
        Ok(JsonValue::Object(obj))
    }
}
