//! Filter expression algebra
//!
//! Builds boolean combinations of dimension predicates and lowers them to the
//! broker's filter JSON (`selector`, `and`, `or`, `not`).
//!
//! ## Usage
//!
//! ```
//! use druid_query::filter::predicate;
//!
//! let filter = predicate("country")
//!     .is_in(["DE", "US"])
//!     .unwrap()
//!     .and(predicate("device").equals("mobile").unwrap());
//!
//! let json = filter.to_json().unwrap();
//! assert_eq!(json["fields"][0]["type"], "or");
//! ```
//!
//! No simplification is performed beyond flattening chains of the same
//! associative operator.

mod expression;
mod input;
mod predicate;
mod scope;
mod wire;

pub use expression::{FilterExpression, Operator, OperatorKind};
pub use input::FilterInput;
pub use predicate::{Predicate, predicate};
pub use scope::{FilterScope, build, from_entries};
