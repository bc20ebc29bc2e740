//! Entry points that build a whole filter at once

use crate::error::FilterError;

use super::expression::FilterExpression;
use super::input::FilterInput;
use super::predicate::Predicate;

/// Handed to [`build`] closures; names dimensions.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilterScope {
    _private: (),
}

impl FilterScope {
    /// Unbound predicate on `name`
    pub fn dimension(&self, name: impl Into<String>) -> Predicate {
        Predicate::new(name)
    }
}

/// Evaluate a filter-building closure.
///
/// The closure must produce a filter expression; any other value fails with
/// [`FilterError::InvalidFilter`].
///
/// ```
/// use druid_query::filter;
///
/// let expr = filter::build(|f| {
///     Ok(f.dimension("age")
///         .is_in([20, 30])?
///         .and(f.dimension("city").equals("Berlin")?))
/// })
/// .unwrap();
/// assert_eq!(expr.to_json().unwrap()["type"], "and");
/// ```
pub fn build<F, R>(builder: F) -> Result<FilterExpression, FilterError>
where
    F: FnOnce(&FilterScope) -> Result<R, FilterError>,
    R: Into<FilterInput>,
{
    match builder(&FilterScope::default())?.into() {
        FilterInput::Expression(expr) => Ok(expr),
        other => Err(FilterError::invalid(format!(
            "builder returned {}",
            other.describe()
        ))),
    }
}

/// One `is_in` per `(dimension, values)` entry, AND-ed in iteration order.
///
/// Returns `None` for an empty mapping. An entry without values fails with
/// [`FilterError::InvalidFilter`].
pub fn from_entries<I, K, V>(entries: I) -> Result<Option<FilterExpression>, FilterError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<FilterInput>,
{
    let mut combined: Option<FilterExpression> = None;

    for (dimension, values) in entries {
        let dimension = dimension.into();
        let values = values.into().flatten();
        if values.is_empty() {
            return Err(FilterError::invalid(format!(
                "empty value list for dimension '{}'",
                dimension
            )));
        }

        let filter = Predicate::new(dimension).is_in(values)?;
        combined = Some(match combined {
            Some(prev) => prev.and(filter),
            None => filter,
        });
    }

    Ok(combined)
}
