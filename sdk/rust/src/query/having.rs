//! Having clauses
//!
//! Filters on aggregated values of a `groupBy` query. Lowered to the broker's
//! `havingSpec` JSON: comparisons carry `aggregation` and `value`, `and`/`or`
//! carry `havingSpecs`, `not` carries a single `havingSpec`.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Having {
    GreaterThan { aggregation: String, value: f64 },
    LessThan { aggregation: String, value: f64 },
    EqualTo { aggregation: String, value: f64 },
    And { having_specs: Vec<Having> },
    Or { having_specs: Vec<Having> },
    Not { having_spec: Box<Having> },
}

impl Having {
    pub fn greater_than(aggregation: impl Into<String>, value: impl Into<f64>) -> Self {
        Self::GreaterThan {
            aggregation: aggregation.into(),
            value: value.into(),
        }
    }

    pub fn less_than(aggregation: impl Into<String>, value: impl Into<f64>) -> Self {
        Self::LessThan {
            aggregation: aggregation.into(),
            value: value.into(),
        }
    }

    pub fn equal_to(aggregation: impl Into<String>, value: impl Into<f64>) -> Self {
        Self::EqualTo {
            aggregation: aggregation.into(),
            value: value.into(),
        }
    }

    /// Appends to `self` when it already is an `and`, wraps both otherwise
    pub fn and(self, other: Having) -> Self {
        match self {
            Self::And { mut having_specs } => {
                having_specs.push(other);
                Self::And { having_specs }
            }
            first => Self::And {
                having_specs: vec![first, other],
            },
        }
    }

    /// Appends to `self` when it already is an `or`, wraps both otherwise
    pub fn or(self, other: Having) -> Self {
        match self {
            Self::Or { mut having_specs } => {
                having_specs.push(other);
                Self::Or { having_specs }
            }
            first => Self::Or {
                having_specs: vec![first, other],
            },
        }
    }

    /// Negation; `not` of a `not` is its operand
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        match self {
            Self::Not { having_spec } => *having_spec,
            other => Self::Not {
                having_spec: Box::new(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn comparison_wire_shape() {
        let h = Having::greater_than("clicks", 100);
        assert_eq!(
            serde_json::to_value(&h).unwrap(),
            json!({"type": "greaterThan", "aggregation": "clicks", "value": 100.0})
        );
        assert_eq!(
            serde_json::to_value(Having::equal_to("rows", 1.5)).unwrap()["type"],
            "equalTo"
        );
    }

    #[test]
    fn and_chain_flattens() {
        let h = Having::greater_than("a", 1)
            .and(Having::less_than("b", 2))
            .and(Having::equal_to("c", 3));
        let Having::And { having_specs } = &h else {
            panic!("expected and");
        };
        assert_eq!(having_specs.len(), 3);
    }

    #[test]
    fn or_inside_and_is_not_merged() {
        let h = Having::greater_than("a", 1)
            .or(Having::less_than("a", 0))
            .and(Having::equal_to("b", 2));
        assert_eq!(
            serde_json::to_value(&h).unwrap(),
            json!({"type": "and", "havingSpecs": [
                {"type": "or", "havingSpecs": [
                    {"type": "greaterThan", "aggregation": "a", "value": 1.0},
                    {"type": "lessThan", "aggregation": "a", "value": 0.0}
                ]},
                {"type": "equalTo", "aggregation": "b", "value": 2.0}
            ]})
        );
    }

    #[test]
    fn not_shape_and_double_negation() {
        let h = Having::less_than("a", 5);
        assert_eq!(
            serde_json::to_value(h.clone().not()).unwrap(),
            json!({"type": "not", "havingSpec":
                {"type": "lessThan", "aggregation": "a", "value": 5.0}})
        );
        assert_eq!(h.clone().not().not(), h);
    }
}
