//! # druid-query
//!
//! Query builder and broker client for [Apache Druid](https://druid.apache.org/).
//!
//! Filters are built from dimension predicates combined with `and`, `or` and
//! `not`, then lowered together with the rest of the query to the broker's
//! JSON format.
//!
//! ## Quick Start
//!
//! ```no_run
//! use druid_query::{Client, filter::predicate};
//!
//! # async fn run() -> Result<(), druid_query::ClientError> {
//! let client = Client::new("http://localhost:8082/druid/v2/")?;
//!
//! let query = client
//!     .query("broker/wikipedia")
//!     .group_by(["page"])
//!     .long_sum(["edits"])
//!     .granularity("day", Some("Europe/Berlin"))?
//!     .filter_with(|f| f.dimension("language").is_in(["en", "de"]))?
//!     .and_filter(predicate("robot").not_equals("true")?);
//!
//! for row in client.send(&query).await? {
//!     println!("{:?} {:?}", row.timestamp(), row.get("edits"));
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod data_source;
mod error;
pub mod filter;
pub mod query;
mod response;

pub use client::{Client, DEFAULT_TIMEOUT_SECS, DataSourceMetadata};
pub use data_source::DataSource;
pub use error::{ClientError, FilterError, QueryError};
pub use filter::{FilterExpression, Predicate, predicate};
pub use query::Query;
pub use response::ResponseRow;
