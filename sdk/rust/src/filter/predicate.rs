//! Dimension predicates
//!
//! A [`Predicate`] starts unbound (dimension only) and is bound to a value by
//! `equals`/`is_in`. Multi-value membership is lowered to an `or` of
//! single-value predicates, never to a native `in` filter.

use crate::error::FilterError;

use super::expression::{FilterExpression, Operator, OperatorKind};
use super::input::FilterInput;

/// Equality test of one dimension against one value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    dimension: String,
    value: Option<String>,
}

/// Start a predicate on `dimension`
pub fn predicate(dimension: impl Into<String>) -> Predicate {
    Predicate::new(dimension)
}

impl Predicate {
    /// Unbound predicate. Serializing it without binding a value fails.
    pub fn new(dimension: impl Into<String>) -> Self {
        Self {
            dimension: dimension.into(),
            value: None,
        }
    }

    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// `dimension == value`. A list of values is handled by [`Self::is_in`].
    pub fn equals(mut self, value: impl Into<FilterInput>) -> Result<FilterExpression, FilterError> {
        match value.into() {
            FilterInput::List(values) => self.is_in(values),
            FilterInput::Scalar(value) => {
                self.value = Some(value);
                Ok(self.into())
            }
            FilterInput::Expression(_) => Err(self.nested_expression()),
        }
    }

    /// Negation of [`Self::equals`].
    ///
    /// With several values this negates the whole `or`, i.e. the dimension
    /// matches none of them.
    pub fn not_equals(self, value: impl Into<FilterInput>) -> Result<FilterExpression, FilterError> {
        Ok(self.equals(value)?.not())
    }

    /// Set membership. Nested lists are flattened; a single value behaves
    /// exactly like [`Self::equals`].
    pub fn is_in(self, values: impl Into<FilterInput>) -> Result<FilterExpression, FilterError> {
        let mut values = values.into().flatten();

        if values.len() > 1 {
            if values
                .iter()
                .any(|v| matches!(v, FilterInput::Expression(_)))
            {
                return Err(self.nested_expression());
            }

            let children = values
                .into_iter()
                .filter_map(|v| match v {
                    FilterInput::Scalar(value) => Some(FilterExpression::Predicate(Self {
                        dimension: self.dimension.clone(),
                        value: Some(value),
                    })),
                    _ => None,
                })
                .collect();
            return Ok(FilterExpression::Operator(Operator::junction(
                OperatorKind::Or,
                children,
            )));
        }

        match values.pop() {
            Some(single) => self.equals(single),
            None => Err(FilterError::EmptyOperand {
                dimension: self.dimension,
            }),
        }
    }

    pub fn and(self, other: impl Into<FilterExpression>) -> FilterExpression {
        FilterExpression::from(self).and(other)
    }

    pub fn or(self, other: impl Into<FilterExpression>) -> FilterExpression {
        FilterExpression::from(self).or(other)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> FilterExpression {
        FilterExpression::from(self).not()
    }

    fn nested_expression(&self) -> FilterError {
        FilterError::NestedExpression {
            dimension: self.dimension.clone(),
        }
    }
}
