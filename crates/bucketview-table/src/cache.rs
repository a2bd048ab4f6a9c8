//! Lazily created, shared storage client.

use std::sync::Arc;
use std::time::Instant;

use bucketview_storage::{MinioClient, MinioConfig, ObjectStorage};
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::{Error, Result, TRACING_TARGET_CONNECTION};

/// Something that can open a storage client.
#[async_trait::async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Client type produced by this connector.
    type Storage: ObjectStorage;

    /// Creates a new client.
    async fn connect(&self) -> bucketview_storage::Result<Self::Storage>;
}

#[async_trait::async_trait]
impl Connector for MinioConfig {
    type Storage = MinioClient;

    async fn connect(&self) -> bucketview_storage::Result<MinioClient> {
        MinioClient::new(self.clone())
    }
}

/// Holds at most one client for the lifetime of a table.
///
/// Concurrent first callers share a single connection attempt. A failed
/// attempt leaves the cache empty, so the next caller tries again.
#[derive(Debug)]
pub struct ClientCache<S> {
    cell: OnceCell<Arc<S>>,
}

impl<S: ObjectStorage> ClientCache<S> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Creates a cache already holding `client`.
    pub fn with_client(client: Arc<S>) -> Self {
        Self {
            cell: OnceCell::new_with(Some(client)),
        }
    }

    /// Returns whether a client has been created.
    pub fn is_connected(&self) -> bool {
        self.cell.initialized()
    }

    /// Returns the cached client, creating it with `connector` on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the client cannot be created.
    pub async fn get_or_connect<C>(&self, connector: &C) -> Result<Arc<S>>
    where
        C: Connector<Storage = S>,
    {
        let client = self
            .cell
            .get_or_try_init(|| async {
                let start = Instant::now();
                match connector.connect().await {
                    Ok(client) => {
                        info!(
                            target: TRACING_TARGET_CONNECTION,
                            elapsed = ?start.elapsed(),
                            "Storage client created"
                        );
                        Ok(Arc::new(client))
                    }
                    Err(e) => {
                        error!(
                            target: TRACING_TARGET_CONNECTION,
                            error = %e,
                            "Failed to create storage client"
                        );
                        Err(Error::Connection(e))
                    }
                }
            })
            .await?;

        Ok(Arc::clone(client))
    }
}

impl<S: ObjectStorage> Default for ClientCache<S> {
    fn default() -> Self {
        Self::new()
    }
}
