//! Data source handle

use tokio::sync::OnceCell;

use crate::client::{Client, DataSourceMetadata};
use crate::error::ClientError;
use crate::query::Query;
use crate::response::ResponseRow;

/// A named data source on a broker. Metadata is fetched on first use and
/// cached for the lifetime of the handle.
#[derive(Debug)]
pub struct DataSource {
    name: String,
    client: Client,
    metadata: OnceCell<DataSourceMetadata>,
}

impl DataSource {
    /// `source` may be `"service/name"`; only the last segment is kept
    pub fn new(source: &str, client: Client) -> Self {
        let name = source.rsplit('/').next().unwrap_or(source).to_string();
        Self {
            name,
            client,
            metadata: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn metadata(&self) -> Result<&DataSourceMetadata, ClientError> {
        self.metadata
            .get_or_try_init(|| self.client.data_source(&self.name))
            .await
    }

    pub async fn dimensions(&self) -> Result<&[String], ClientError> {
        Ok(&self.metadata().await?.dimensions)
    }

    pub async fn metrics(&self) -> Result<&[String], ClientError> {
        Ok(&self.metadata().await?.metrics)
    }

    /// Send `query` against this data source, whatever source it was built on
    pub async fn query(&self, query: Query) -> Result<Vec<ResponseRow>, ClientError> {
        let query = query.data_source(&self.name);
        self.client.send(&query).await
    }
}
