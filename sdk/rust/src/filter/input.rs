//! Values accepted by `equals`, `not_equals` and `is_in`

use super::expression::FilterExpression;
use super::predicate::Predicate;

/// A value handed to the filter DSL.
///
/// Lists may nest arbitrarily; they are flattened before use. Expressions are
/// accepted here only so that misuse can be reported as
/// [`FilterError::NestedExpression`](crate::FilterError::NestedExpression)
/// instead of being silently coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterInput {
    Scalar(String),
    Expression(FilterExpression),
    List(Vec<FilterInput>),
}

impl FilterInput {
    /// Flatten nested lists, keeping input order. The result holds only
    /// scalars and expressions.
    pub fn flatten(self) -> Vec<FilterInput> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<FilterInput>) {
        match self {
            Self::List(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
            other => out.push(other),
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "a scalar value",
            Self::Expression(_) => "a filter expression",
            Self::List(_) => "a list of values",
        }
    }
}

impl From<String> for FilterInput {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for FilterInput {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<&String> for FilterInput {
    fn from(value: &String) -> Self {
        Self::Scalar(value.clone())
    }
}

macro_rules! scalar_from_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FilterInput {
                fn from(value: $ty) -> Self {
                    Self::Scalar(value.to_string())
                }
            }
        )*
    };
}

scalar_from_display!(i32, i64, u32, u64, usize, f64, bool, char);

impl From<FilterExpression> for FilterInput {
    fn from(expr: FilterExpression) -> Self {
        Self::Expression(expr)
    }
}

impl From<Predicate> for FilterInput {
    fn from(predicate: Predicate) -> Self {
        Self::Expression(predicate.into())
    }
}

impl<T: Into<FilterInput>> From<Vec<T>> for FilterInput {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterInput>, const N: usize> From<[T; N]> for FilterInput {
    fn from(values: [T; N]) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<FilterInput>> From<&[T]> for FilterInput {
    fn from(values: &[T]) -> Self {
        Self::List(values.iter().cloned().map(Into::into).collect())
    }
}
