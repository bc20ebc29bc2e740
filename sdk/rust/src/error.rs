//! Error types
//!
//! One enum per layer: filter construction, query building, broker transport.

use thiserror::Error;

/// Misuse of the filter DSL. Raised where the mistake is made, never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Must provide a non-empty value list for dimension '{dimension}'")]
    EmptyOperand { dimension: String },

    #[error("Filter on dimension '{dimension}' is too complex: expressions are not allowed as values")]
    NestedExpression { dimension: String },

    #[error("Not a valid filter: {0}")]
    InvalidFilter(String),

    #[error("No value assigned to dimension '{dimension}'")]
    MissingValue { dimension: String },
}

impl FilterError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidFilter(msg.into())
    }
}

#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Invalid interval bound: {0}")]
    InvalidInterval(String),

    #[error("Unknown time zone: {0}")]
    InvalidTimeZone(String),

    #[error("Query serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid broker url: {0}")]
    InvalidBrokerUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed: {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Query(#[from] QueryError),
}

impl ClientError {
    pub fn request_failed(status: reqwest::StatusCode, body: impl Into<String>) -> Self {
        Self::RequestFailed {
            status: status.as_u16(),
            body: body.into(),
        }
    }
}

impl From<FilterError> for ClientError {
    fn from(err: FilterError) -> Self {
        Self::Query(QueryError::Filter(err))
    }
}
