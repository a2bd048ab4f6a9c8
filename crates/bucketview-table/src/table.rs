//! The bucket table: one bucket, one cached client, many scans.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::cache::{ClientCache, Connector};
use crate::listing::{RowStream, listing_stream};
use crate::query::Query;
use crate::row::Row;
use crate::schema::TableSchema;
use crate::sink::RowSink;
use crate::tags::TagHydrator;
use crate::{Error, Result, TRACING_TARGET_SCAN};

/// Which bucket the table reads and what it is called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Bucket backing the table.
    pub bucket: String,
    /// Table name; defaults to the bucket name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
}

impl TableConfig {
    /// Creates a configuration for `bucket`.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            table_name: None,
        }
    }

    /// Overrides the table name.
    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    /// Effective table name.
    pub fn table_name(&self) -> &str {
        self.table_name.as_deref().unwrap_or(&self.bucket)
    }
}

/// Outcome of [`BucketTable::scan_into`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Rows handed to the sink.
    pub rows: u64,
    /// Listing pages fetched.
    pub pages: usize,
}

/// A bucket exposed as a table.
///
/// The storage client is created on the first scan and shared by every scan
/// that follows, including concurrent ones.
pub struct BucketTable<C: Connector> {
    config: TableConfig,
    schema: TableSchema,
    connector: C,
    cache: ClientCache<C::Storage>,
}

impl<C: Connector> BucketTable<C> {
    /// Creates a table. No connection is made until the first scan.
    pub fn new(config: TableConfig, connector: C) -> Self {
        let schema = TableSchema::new(config.table_name());
        Self {
            config,
            schema,
            connector,
            cache: ClientCache::new(),
        }
    }

    /// Table name.
    pub fn name(&self) -> &str {
        self.config.table_name()
    }

    /// Bucket backing the table.
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Table schema.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Returns whether the storage client has been created.
    pub fn is_connected(&self) -> bool {
        self.cache.is_connected()
    }

    /// Returns the shared storage client, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the client cannot be created.
    pub async fn client(&self) -> Result<Arc<C::Storage>> {
        self.cache.get_or_connect(&self.connector).await
    }

    /// Starts a scan and returns its rows as a stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the client cannot be created and
    /// [`Error::Cancelled`] if `cancel` fires while connecting. Later failures
    /// are items of the stream.
    pub async fn scan(&self, query: &Query, cancel: CancellationToken) -> Result<RowStream> {
        self.start(query, cancel, Arc::default()).await
    }

    /// Runs a scan to completion, handing every row to `sink`.
    ///
    /// Rows accepted before a failure stay with the sink.
    ///
    /// # Errors
    ///
    /// Returns the first error of the scan or of the sink.
    #[instrument(skip_all, target = TRACING_TARGET_SCAN, fields(table = %self.name()))]
    pub async fn scan_into<K>(
        &self,
        query: &Query,
        sink: &mut K,
        cancel: CancellationToken,
    ) -> Result<ScanSummary>
    where
        K: RowSink + ?Sized,
    {
        let pages = Arc::new(AtomicUsize::new(0));
        let mut stream = self.start(query, cancel, Arc::clone(&pages)).await?;

        let mut rows = 0u64;
        while let Some(row) = stream.next().await {
            sink.accept(row?).await?;
            rows += 1;
        }

        let summary = ScanSummary {
            rows,
            pages: pages.load(Ordering::Relaxed),
        };
        info!(
            target: TRACING_TARGET_SCAN,
            rows = summary.rows,
            pages = summary.pages,
            "Scan delivered"
        );

        Ok(summary)
    }

    /// Fetches and attaches the tags of one row's object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] or [`Error::TagHydration`].
    pub async fn hydrate_tags(&self, row: &mut Row) -> Result<()> {
        let storage = self.client().await?;
        TagHydrator::new(storage, self.bucket())
            .hydrate_row(row)
            .await
    }

    async fn start(
        &self,
        query: &Query,
        cancel: CancellationToken,
        pages: Arc<AtomicUsize>,
    ) -> Result<RowStream> {
        let storage = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            client = self.client() => client,
        }?;

        Ok(listing_stream(
            storage,
            self.config.bucket.clone(),
            query.clone(),
            cancel,
            pages,
        ))
    }
}

impl<C: Connector> std::fmt::Debug for BucketTable<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketTable")
            .field("name", &self.name())
            .field("bucket", &self.bucket())
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_name_defaults_to_bucket() {
        let config = TableConfig::new("audit-docs");
        assert_eq!(config.table_name(), "audit-docs");

        let config = config.with_table_name("documents");
        assert_eq!(config.table_name(), "documents");
        assert_eq!(config.bucket, "audit-docs");
    }

    #[test]
    fn config_deserializes_without_table_name() {
        let config: TableConfig = serde_json::from_str(r#"{"bucket":"docs"}"#).unwrap();
        assert_eq!(config, TableConfig::new("docs"));
    }
}
