//! Query builder
//!
//! Accumulates query properties and one root filter, then serializes to the
//! broker's JSON query format.
//!
//! ## Usage
//!
//! ```
//! use druid_query::Query;
//!
//! let query = Query::new("analytics/events")
//!     .group_by(["country"])
//!     .long_sum(["clicks"])
//!     .filter([("device", vec!["mobile", "tablet"])])
//!     .unwrap()
//!     .interval("2024-01-01", "2024-01-08")
//!     .unwrap();
//!
//! let json = query.to_json().unwrap();
//! assert_eq!(json["queryType"], "groupBy");
//! assert_eq!(json["filter"]["type"], "or");
//! ```

mod granularity;
mod having;
mod interval;
mod post_aggregation;
mod types;

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::{FilterError, QueryError};
use crate::filter::{self, FilterExpression, FilterInput, FilterScope};

pub use granularity::{
    DEFAULT_TIME_ZONE, Granularity, GranularitySpec, SimpleGranularity, resolve_time_zone,
};
pub use having::Having;
pub use interval::{IntervalBound, format_interval, today};
pub use post_aggregation::{ArithmeticFn, PostAggregation};
pub use types::{
    Aggregation, AggregationType, Direction, LimitSpec, OrderByColumn, PagingSpec, QueryContext,
    QueryType,
};

/// Row limit of a `select` query when none is given
pub const DEFAULT_SELECT_LIMIT: u64 = 1000;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Properties {
    data_source: String,
    granularity: Granularity,
    intervals: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_type: Option<QueryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metric: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    threshold: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    paging_spec: Option<PagingSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aggregations: Option<Vec<Aggregation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    post_aggregations: Option<Vec<PostAggregation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    having: Option<Having>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit_spec: Option<LimitSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<QueryContext>,
}

/// A broker query under construction.
///
/// Setters consume and return the query. Those that can fail return
/// `Result<Self, _>` so chains read `query.filter(..)?.interval(..)?`.
#[derive(Debug, Clone)]
pub struct Query {
    service: String,
    properties: Properties,
    filter: Option<FilterExpression>,
}

impl Query {
    /// New query on `source` (`"service/datasource"` or a bare data source).
    ///
    /// Defaults: granularity `all`, interval from today's midnight (UTC) to now.
    pub fn new(source: &str) -> Self {
        let now = Utc::now().fixed_offset();
        let query = Self {
            service: String::new(),
            properties: Properties {
                data_source: String::new(),
                granularity: Granularity::default(),
                intervals: Vec::new(),
                query_type: None,
                dimensions: None,
                dimension: None,
                metric: None,
                threshold: None,
                metrics: None,
                paging_spec: None,
                aggregations: None,
                post_aggregations: None,
                having: None,
                limit_spec: None,
                context: None,
            },
            filter: None,
        };
        query.data_source(source).default_interval(today(), now)
    }

    fn default_interval(mut self, from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> Self {
        self.properties.intervals = vec![format!(
            "{}/{}",
            interval::iso8601(&from),
            interval::iso8601(&to)
        )];
        self
    }

    // =========================================================================
    // Source and type
    // =========================================================================

    /// `dataSource` is the last `/` segment, the service the first
    pub fn data_source(mut self, source: &str) -> Self {
        let mut segments = source.split('/');
        self.service = segments.next().unwrap_or_default().to_string();
        self.properties.data_source = segments
            .last()
            .unwrap_or(self.service.as_str())
            .to_string();
        self
    }

    /// `"service/datasource"`
    pub fn source(&self) -> String {
        format!("{}/{}", self.service, self.properties.data_source)
    }

    pub fn data_source_name(&self) -> &str {
        &self.properties.data_source
    }

    pub fn query_type(mut self, query_type: QueryType) -> Self {
        self.properties.query_type = Some(query_type);
        self
    }

    /// Current query type, `groupBy` when unset
    pub fn get_query_type(&self) -> QueryType {
        self.properties.query_type.unwrap_or(QueryType::GroupBy)
    }

    pub fn group_by<I, S>(mut self, dimensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties.dimensions = Some(dimensions.into_iter().map(Into::into).collect());
        self.query_type(QueryType::GroupBy)
    }

    pub fn topn(mut self, dimension: impl Into<String>, metric: impl Into<String>, threshold: u64) -> Self {
        self.properties.dimension = Some(dimension.into());
        self.properties.metric = Some(metric.into());
        self.properties.threshold = Some(threshold);
        self.query_type(QueryType::TopN)
    }

    pub fn time_series(self) -> Self {
        self.query_type(QueryType::Timeseries)
    }

    /// Raw row query. `paging_identifiers` is the token of the previous page.
    pub fn select<D, M>(
        mut self,
        dimensions: D,
        metrics: M,
        limit: Option<u64>,
        paging_identifiers: BTreeMap<String, i64>,
    ) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        self.properties.dimensions = Some(dimensions.into_iter().map(Into::into).collect());
        self.properties.metrics = Some(metrics.into_iter().map(Into::into).collect());
        self.properties.paging_spec = Some(PagingSpec {
            paging_identifiers,
            threshold: limit.unwrap_or(DEFAULT_SELECT_LIMIT),
        });
        self.query_type(QueryType::Select)
    }

    // =========================================================================
    // Aggregations
    // =========================================================================

    pub fn long_sum<I, S>(self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aggregate(AggregationType::LongSum, metrics)
    }

    /// Alias of [`Self::long_sum`]
    pub fn sum<I, S>(self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.long_sum(metrics)
    }

    pub fn double_sum<I, S>(self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aggregate(AggregationType::DoubleSum, metrics)
    }

    pub fn count<I, S>(self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aggregate(AggregationType::Count, metrics)
    }

    pub fn min<I, S>(self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aggregate(AggregationType::Min, metrics)
    }

    pub fn max<I, S>(self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aggregate(AggregationType::Max, metrics)
    }

    /// Appends one aggregation per metric. A metric that already has an
    /// aggregation (by `fieldName`, of any type) is skipped.
    fn aggregate<I, S>(mut self, kind: AggregationType, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties.query_type = Some(self.get_query_type());
        let aggregations = self.properties.aggregations.get_or_insert_with(Vec::new);
        for metric in metrics {
            let metric = metric.into();
            if aggregations.iter().any(|a| a.field_name == metric) {
                continue;
            }
            aggregations.push(Aggregation::new(kind, metric));
        }
        self
    }

    /// `hyperUnique` per dimension, without dedup
    pub fn distinct_count<I, S>(mut self, dimensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let aggregations = self.properties.aggregations.get_or_insert_with(Vec::new);
        aggregations.extend(
            dimensions
                .into_iter()
                .map(|d| Aggregation::new(AggregationType::HyperUnique, d)),
        );
        self
    }

    pub fn aggregations(&self) -> &[Aggregation] {
        self.properties.aggregations.as_deref().unwrap_or_default()
    }

    /// Appends a post-aggregation and `longSum`s every field it reads, so
    /// the referenced aggregations always exist.
    pub fn post_aggregation(self, post_aggregation: PostAggregation) -> Self {
        let fields = post_aggregation.field_names();
        self.push_post_aggregation(post_aggregation).long_sum(fields)
    }

    /// [`Self::post_aggregation`] with `doubleSum` fields
    pub fn post_aggregation_double(self, post_aggregation: PostAggregation) -> Self {
        let fields = post_aggregation.field_names();
        self.push_post_aggregation(post_aggregation).double_sum(fields)
    }

    fn push_post_aggregation(mut self, post_aggregation: PostAggregation) -> Self {
        self.properties
            .post_aggregations
            .get_or_insert_with(Vec::new)
            .push(post_aggregation);
        self
    }

    pub fn post_aggregations(&self) -> &[PostAggregation] {
        self.properties.post_aggregations.as_deref().unwrap_or_default()
    }

    /// AND `having` onto the current having clause
    pub fn having(mut self, having: Having) -> Self {
        self.properties.having = Some(match self.properties.having.take() {
            Some(existing) => existing.and(having),
            None => having,
        });
        self
    }

    pub fn having_clause(&self) -> Option<&Having> {
        self.properties.having.as_ref()
    }

    // =========================================================================
    // Ordering, time and context
    // =========================================================================

    pub fn limit_spec<I, S>(mut self, limit: u64, columns: I) -> Self
    where
        I: IntoIterator<Item = (S, Direction)>,
        S: Into<String>,
    {
        self.properties.limit_spec = Some(LimitSpec {
            kind: "default",
            limit,
            columns: columns
                .into_iter()
                .map(|(dimension, direction)| OrderByColumn {
                    dimension: dimension.into(),
                    direction,
                })
                .collect(),
        });
        self
    }

    pub fn interval(
        self,
        from: impl Into<IntervalBound>,
        to: impl Into<IntervalBound>,
    ) -> Result<Self, QueryError> {
        self.intervals([(from.into(), to.into())])
    }

    /// Interval from `from` until now
    pub fn interval_since(self, from: impl Into<IntervalBound>) -> Result<Self, QueryError> {
        self.interval(from, Utc::now())
    }

    /// Replace all intervals
    pub fn intervals<I>(mut self, intervals: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (IntervalBound, IntervalBound)>,
    {
        let base = today();
        self.properties.intervals = intervals
            .into_iter()
            .map(|(from, to)| format_interval(&from, &to, base))
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    pub fn intervals_wire(&self) -> &[String] {
        &self.properties.intervals
    }

    /// See [`Granularity::parse`]
    pub fn granularity(mut self, granularity: &str, time_zone: Option<&str>) -> Result<Self, QueryError> {
        self.properties.granularity = Granularity::parse(granularity, time_zone)?;
        Ok(self)
    }

    pub fn duration_granularity(
        mut self,
        duration_ms: u64,
        time_zone: Option<&str>,
    ) -> Result<Self, QueryError> {
        self.properties.granularity = Granularity::duration(duration_ms, time_zone)?;
        Ok(self)
    }

    pub fn use_cache(mut self, enabled: bool) -> Self {
        self.properties
            .context
            .get_or_insert_with(QueryContext::default)
            .use_cache = Some(enabled);
        self
    }

    /// `context.useCache`, `None` when never set
    pub fn cache_setting(&self) -> Option<bool> {
        self.properties.context.as_ref().and_then(|c| c.use_cache)
    }

    // =========================================================================
    // Filters
    // =========================================================================

    /// Equality filters over several dimensions, AND-ed in iteration order
    /// and AND-ed onto any existing filter. Each entry's values go through
    /// `is_in`, so several values for one dimension become an `or`.
    pub fn filter<I, K, V>(self, entries: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FilterInput>,
    {
        match filter::from_entries(entries)? {
            Some(expr) => Ok(self.and_filter(expr)),
            None => Ok(self),
        }
    }

    /// Filter built by a closure, AND-ed onto any existing filter.
    ///
    /// ```
    /// use druid_query::Query;
    ///
    /// let query = Query::new("events")
    ///     .filter_with(|f| {
    ///         Ok(f.dimension("age")
    ///             .is_in([20_i64, 30])?
    ///             .and(f.dimension("city").equals("Berlin")?))
    ///     })
    ///     .unwrap();
    /// assert!(query.filter_expression().is_some());
    /// ```
    pub fn filter_with<F, R>(self, builder: F) -> Result<Self, FilterError>
    where
        F: FnOnce(&FilterScope) -> Result<R, FilterError>,
        R: Into<FilterInput>,
    {
        let expr = filter::build(builder)?;
        Ok(self.and_filter(expr))
    }

    /// AND `expr` onto the current filter
    pub fn and_filter(mut self, expr: FilterExpression) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(expr),
            None => expr,
        });
        self
    }

    pub fn filter_expression(&self) -> Option<&FilterExpression> {
        self.filter.as_ref()
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    pub fn to_json(&self) -> Result<JsonValue, QueryError> {
        let mut value = serde_json::to_value(&self.properties)?;
        if let (Some(filter), JsonValue::Object(map)) = (&self.filter, &mut value) {
            map.insert("filter".to_string(), filter.to_json()?);
        }
        Ok(value)
    }

    pub fn to_json_string(&self) -> Result<String, QueryError> {
        Ok(self.to_json()?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::filter::predicate;

    fn fixed() -> Query {
        Query::new("test/test")
            .interval("2013-04-04", "2013-04-04")
            .unwrap()
    }

    #[test]
    fn new_query_minimal_json() {
        assert_eq!(
            fixed().to_json_string().unwrap(),
            r#"{"dataSource":"test","granularity":"all","intervals":["2013-04-04T00:00:00+00:00/2013-04-04T00:00:00+00:00"]}"#
        );
    }

    #[test]
    fn default_interval_starts_today() {
        let query = Query::new("test");
        let interval = &query.intervals_wire()[0];
        let start = interval::iso8601(&today());
        assert!(interval.starts_with(&format!("{}/", start)));
    }

    #[test]
    fn data_source_splits_service() {
        let query = Query::new("broker/events");
        assert_eq!(query.data_source_name(), "events");
        assert_eq!(query.source(), "broker/events");

        let bare = Query::new("events");
        assert_eq!(bare.data_source_name(), "events");
        assert_eq!(bare.source(), "events/events");
    }

    #[test]
    fn group_by_sets_type_and_dimensions() {
        let json = fixed().group_by(["a", "b"]).to_json().unwrap();
        assert_eq!(json["queryType"], "groupBy");
        assert_eq!(json["dimensions"], json!(["a", "b"]));
    }

    #[test]
    fn topn_shape() {
        let json = fixed().topn("page", "edits", 25).to_json().unwrap();
        assert_eq!(json["queryType"], "topN");
        assert_eq!(json["dimension"], "page");
        assert_eq!(json["metric"], "edits");
        assert_eq!(json["threshold"], 25);
    }

    #[test]
    fn aggregations_keep_query_type_and_dedup() {
        let query = fixed()
            .time_series()
            .long_sum(["clicks", "views"])
            .double_sum(["clicks", "revenue"])
            .sum(["views"]);

        assert_eq!(query.get_query_type(), QueryType::Timeseries);
        assert_eq!(
            query.aggregations(),
            &[
                Aggregation::new(AggregationType::LongSum, "clicks"),
                Aggregation::new(AggregationType::LongSum, "views"),
                Aggregation::new(AggregationType::DoubleSum, "revenue"),
            ]
        );
    }

    #[test]
    fn aggregation_defaults_to_group_by() {
        let json = fixed().count(["rows"]).min(["latency"]).max(["latency"]).to_json().unwrap();
        assert_eq!(json["queryType"], "groupBy");
        assert_eq!(
            json["aggregations"],
            json!([
                {"type": "count", "name": "rows", "fieldName": "rows"},
                {"type": "min", "name": "latency", "fieldName": "latency"}
            ])
        );
    }

    #[test]
    fn post_aggregation_adds_field_sums() {
        let query = fixed().double_sum(["views"]).post_aggregation(PostAggregation::arithmetic(
            "ctr",
            ArithmeticFn::Divide,
            [PostAggregation::field("clicks"), PostAggregation::field("views")],
        ));

        assert_eq!(query.get_query_type(), QueryType::GroupBy);
        assert_eq!(
            query.aggregations(),
            &[
                Aggregation::new(AggregationType::DoubleSum, "views"),
                Aggregation::new(AggregationType::LongSum, "clicks"),
            ]
        );
        assert_eq!(query.post_aggregations().len(), 1);
        let json = query.to_json().unwrap();
        assert_eq!(json["postAggregations"][0]["name"], "ctr");
        assert_eq!(json["postAggregations"][0]["fn"], "/");
    }

    #[test]
    fn post_aggregation_double_uses_double_sum() {
        let query = fixed()
            .time_series()
            .post_aggregation_double(PostAggregation::arithmetic(
                "total",
                ArithmeticFn::Add,
                [PostAggregation::field("a"), PostAggregation::constant("one", 1)],
            ));
        assert_eq!(query.get_query_type(), QueryType::Timeseries);
        assert_eq!(
            query.aggregations(),
            &[Aggregation::new(AggregationType::DoubleSum, "a")]
        );
    }

    #[test]
    fn having_first_clause_is_kept_as_is() {
        let query = fixed().having(Having::greater_than("clicks", 10));
        assert_eq!(query.having_clause(), Some(&Having::greater_than("clicks", 10)));
        assert_eq!(
            query.to_json().unwrap()["having"],
            json!({"type": "greaterThan", "aggregation": "clicks", "value": 10.0})
        );
    }

    #[test]
    fn having_wraps_non_and_clause() {
        let first = Having::greater_than("a", 1).or(Having::less_than("a", -1));
        let query = fixed()
            .having(first.clone())
            .having(Having::equal_to("b", 2));
        assert_eq!(
            query.having_clause(),
            Some(&Having::And {
                having_specs: vec![first, Having::equal_to("b", 2)],
            })
        );
    }

    #[test]
    fn having_appends_to_existing_and() {
        let query = fixed()
            .having(Having::greater_than("a", 1).and(Having::less_than("b", 2)))
            .having(Having::equal_to("c", 3));
        assert_eq!(
            query.having_clause(),
            Some(&Having::And {
                having_specs: vec![
                    Having::greater_than("a", 1),
                    Having::less_than("b", 2),
                    Having::equal_to("c", 3),
                ],
            })
        );
    }

    #[test]
    fn distinct_count_does_not_dedup() {
        let query = fixed().distinct_count(["user", "user"]);
        assert_eq!(query.aggregations().len(), 2);
        assert_eq!(query.aggregations()[0].kind, AggregationType::HyperUnique);
    }

    #[test]
    fn select_paging_spec() {
        let mut token = BTreeMap::new();
        token.insert("segment_1".to_string(), 4);
        let json = fixed()
            .select(["a"], ["m"], None, token)
            .to_json()
            .unwrap();
        assert_eq!(json["queryType"], "select");
        assert_eq!(
            json["pagingSpec"],
            json!({"pagingIdentifiers": {"segment_1": 4}, "threshold": 1000})
        );
    }

    #[test]
    fn limit_spec_shape() {
        let json = fixed()
            .limit_spec(10, [("clicks", Direction::Descending)])
            .to_json()
            .unwrap();
        assert_eq!(
            json["limitSpec"],
            json!({
                "type": "default",
                "limit": 10,
                "columns": [{"dimension": "clicks", "direction": "descending"}]
            })
        );
    }

    #[test]
    fn multiple_intervals() {
        let query = fixed()
            .intervals([
                ("2013-01-01".into(), "2013-01-02".into()),
                ("2013-02-01".into(), "2013-02-02".into()),
            ])
            .unwrap();
        assert_eq!(query.intervals_wire().len(), 2);
        assert_eq!(
            query.intervals_wire()[1],
            "2013-02-01T00:00:00+00:00/2013-02-02T00:00:00+00:00"
        );
    }

    #[test]
    fn granularity_setter() {
        let json = fixed().granularity("day", Some("UTC")).unwrap().to_json().unwrap();
        assert_eq!(
            json["granularity"],
            json!({"type": "period", "period": "P1D", "timeZone": "UTC"})
        );
    }

    #[test]
    fn use_cache_sets_context() {
        let query = fixed().use_cache(false);
        assert_eq!(query.cache_setting(), Some(false));
        assert_eq!(query.to_json().unwrap()["context"], json!({"useCache": false}));
        assert_eq!(fixed().cache_setting(), None);
    }

    #[test]
    fn map_filter_wire_shape() {
        let entries: Vec<(&str, FilterInput)> = vec![
            ("city", vec!["Berlin", "Munich"].into()),
            ("country", "DE".into()),
        ];
        let json = fixed().filter(entries).unwrap().to_json().unwrap();
        assert_eq!(
            json["filter"],
            json!({
                "type": "and",
                "fields": [
                    {"type": "or", "fields": [
                        {"type": "selector", "dimension": "city", "value": "Berlin"},
                        {"type": "selector", "dimension": "city", "value": "Munich"}
                    ]},
                    {"type": "selector", "dimension": "country", "value": "DE"}
                ]
            })
        );
    }

    #[test]
    fn filters_merge_with_and() {
        let query = fixed()
            .filter([("a", "1")])
            .unwrap()
            .filter_with(|f| f.dimension("b").equals("2"))
            .unwrap()
            .filter([("c", "3")])
            .unwrap();

        let expected = predicate("a")
            .equals("1")
            .unwrap()
            .and(predicate("b").equals("2").unwrap())
            .and(predicate("c").equals("3").unwrap());
        assert_eq!(query.filter_expression(), Some(&expected));
    }

    #[test]
    fn filter_with_non_expression_fails() {
        let err = fixed().filter_with(|_| Ok(42_i64)).unwrap_err();
        assert!(matches!(err, FilterError::InvalidFilter(_)));
    }

    #[test]
    fn empty_entries_leave_filter_unset() {
        let entries: Vec<(&str, &str)> = Vec::new();
        let query = fixed().filter(entries).unwrap();
        assert!(query.filter_expression().is_none());
        assert!(query.to_json().unwrap().get("filter").is_none());
    }

    #[test]
    fn unbound_filter_fails_serialization() {
        let query = fixed().and_filter(predicate("city").into());
        let err = query.to_json().unwrap_err();
        assert!(matches!(
            err,
            QueryError::Filter(FilterError::MissingValue { .. })
        ));
    }
}
