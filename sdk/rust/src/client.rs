//! Broker HTTP client

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::Deserialize;

use crate::error::ClientError;
use crate::query::Query;
use crate::response::ResponseRow;

/// HTTP read timeout in seconds when none is given
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Broker error caused by a stale group-by cache entry
const NULL_RESULT_ERROR: &str = "Cannot have a null result!";

const USER_AGENT: &str = concat!("druid-query/", env!("CARGO_PKG_VERSION"));

/// Dimensions and metrics of a data source
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DataSourceMetadata {
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<String>,
}

/// Client of one broker endpoint, e.g. `http://broker:8082/druid/v2/`.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(broker_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(broker_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// `read_timeout` bounds each read from the broker, not the whole request
    pub fn with_timeout(broker_url: &str, read_timeout: Duration) -> Result<Self, ClientError> {
        let url = Url::parse(broker_url)
            .map_err(|e| ClientError::InvalidBrokerUrl(format!("{}: {}", broker_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ClientError::InvalidBrokerUrl(broker_url.to_string()));
        }

        let http = reqwest::Client::builder()
            .read_timeout(read_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        tracing::debug!(url = %url, read_timeout_secs = read_timeout.as_secs(), "Broker client initialized");
        Ok(Self { url, http })
    }

    pub fn broker_url(&self) -> &Url {
        &self.url
    }

    /// New query on `source`, see [`Query::new`]
    pub fn query(&self, source: &str) -> Query {
        Query::new(source)
    }

    /// POST the query and parse the result rows.
    ///
    /// A stale cache error (500 with `Cannot have a null result!`) is retried
    /// once with `useCache=false`, unless the query already disabled caching.
    pub async fn send(&self, query: &Query) -> Result<Vec<ResponseRow>, ClientError> {
        match self.post_query(query).await {
            Err(ClientError::RequestFailed { status: 500, body })
                if body.contains(NULL_RESULT_ERROR) && query.cache_setting() != Some(false) =>
            {
                tracing::warn!(
                    source = %query.source(),
                    "Broker returned a cache error, retrying without cache"
                );
                let uncached = query.clone().use_cache(false);
                self.post_query(&uncached).await
            }
            result => result,
        }
    }

    /// Names of all data sources
    pub async fn data_sources(&self) -> Result<Vec<String>, ClientError> {
        let body = self.get_metadata(&[]).await?;
        serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Metadata of `source` (`"service/name"` or `"name"`)
    pub async fn data_source(&self, source: &str) -> Result<DataSourceMetadata, ClientError> {
        let name = source.rsplit('/').next().unwrap_or(source);
        let body = self.get_metadata(&[name]).await?;
        serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    async fn post_query(&self, query: &Query) -> Result<Vec<ResponseRow>, ClientError> {
        let payload = query.to_json()?;
        tracing::debug!(
            url = %self.url,
            source = %query.source(),
            query_type = %query.get_query_type(),
            "Sending query"
        );

        let resp = self.http.post(self.url.clone()).json(&payload).send().await?;
        let body = read_body(resp).await?;

        let rows: Vec<ResponseRow> = serde_json::from_str(&body)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        tracing::debug!(rows = rows.len(), "Query completed");
        Ok(rows)
    }

    /// GET `<broker path>/datasources[/<segments>]`
    async fn get_metadata(&self, segments: &[&str]) -> Result<String, ClientError> {
        let mut path = format!("{}/datasources", self.url.path().trim_end_matches('/'));
        for segment in segments {
            path.push('/');
            path.push_str(segment);
        }
        let mut url = self.url.clone();
        url.set_path(&path);
        url.set_query(None);

        tracing::debug!(url = %url, "Fetching metadata");
        let resp = self.http.get(url).send().await?;
        read_body(resp).await
    }
}

async fn read_body(resp: reqwest::Response) -> Result<String, ClientError> {
    let status = resp.status();
    let body = resp.text().await?;
    if status != StatusCode::OK {
        return Err(ClientError::request_failed(status, body));
    }
    Ok(body)
}
