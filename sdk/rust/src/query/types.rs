//! Wire types of query properties

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QueryType {
    #[serde(rename = "groupBy")]
    GroupBy,
    #[serde(rename = "topN")]
    TopN,
    #[serde(rename = "timeseries")]
    Timeseries,
    #[serde(rename = "select")]
    Select,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GroupBy => "groupBy",
            Self::TopN => "topN",
            Self::Timeseries => "timeseries",
            Self::Select => "select",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregationType {
    LongSum,
    DoubleSum,
    Count,
    Min,
    Max,
    HyperUnique,
}

/// `{"type": .., "name": .., "fieldName": ..}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    #[serde(rename = "type")]
    pub kind: AggregationType,
    pub name: String,
    pub field_name: String,
}

impl Aggregation {
    /// Aggregation whose output name equals the metric it reads
    pub fn new(kind: AggregationType, metric: impl Into<String>) -> Self {
        let metric = metric.into();
        Self {
            kind,
            name: metric.clone(),
            field_name: metric,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ascending" | "asc" => Ok(Self::Ascending),
            "descending" | "desc" => Ok(Self::Descending),
            _ => Err(format!("unknown sort direction: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderByColumn {
    pub dimension: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitSpec {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub limit: u64,
    pub columns: Vec<OrderByColumn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingSpec {
    /// Segment identifier → offset, as returned by the previous page
    pub paging_identifiers: BTreeMap<String, i64>,
    pub threshold: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_cache: Option<bool>,
}
