//! Storage client built on the MinIO SDK.

use std::sync::Arc;
use std::time::Duration;

use minio::s3::Client;
use minio::s3::creds::StaticProvider;
use minio::s3::http::BaseUrl;
use tracing::{error, info, instrument};

use super::retry::ThrottleState;
use crate::operations::ObjectOperations;
use crate::types::{ListPage, ListRequest, ObjectStorage, TagSet};
use crate::{Error, MinioConfig, Result, TRACING_TARGET_CLIENT};

/// Cloneable handle to an S3-compatible service.
///
/// Cloning is cheap; all clones share the SDK client, its connection pool
/// and the throttling state that paces retries.
#[derive(Clone)]
pub struct MinioClient {
    inner: Client,
    config: Arc<MinioConfig>,
    throttle: Arc<ThrottleState>,
}

impl MinioClient {
    /// Creates a client from a configuration.
    ///
    /// No request is made; connectivity problems surface on the first call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if validation fails or the SDK rejects the endpoint.
    #[instrument(skip(config), target = TRACING_TARGET_CLIENT, fields(endpoint = %config.endpoint_masked()))]
    pub fn new(config: MinioConfig) -> Result<Self> {
        config.validate().inspect_err(|e| {
            error!(target: TRACING_TARGET_CLIENT, error = %e, "Configuration validation failed");
        })?;

        let provider = StaticProvider::from(config.credentials());

        let mut base_url: BaseUrl = config.endpoint().as_str().parse().map_err(|e| {
            error!(target: TRACING_TARGET_CLIENT, error = %e, "Invalid endpoint URL");
            Error::Config(format!("Invalid endpoint URL: {e}"))
        })?;
        base_url.virtual_style = !config.path_style;

        let inner = Client::new(base_url, Some(Box::new(provider)), None, None).map_err(|e| {
            error!(target: TRACING_TARGET_CLIENT, error = %e, "Failed to create storage client");
            Error::Config(format!("Failed to build storage client: {e}"))
        })?;

        info!(
            target: TRACING_TARGET_CLIENT,
            endpoint = %config.endpoint_masked(),
            region = ?config.region,
            path_style = config.path_style,
            max_attempts = config.retry.max_attempts,
            "Storage client initialized"
        );

        Ok(Self {
            inner,
            config: Arc::new(config),
            throttle: Arc::new(ThrottleState::new()),
        })
    }

    /// Returns the configuration the client was built from.
    #[inline]
    pub fn config(&self) -> &MinioConfig {
        &self.config
    }

    /// Creates object operations bound to this client.
    pub fn object_operations(&self) -> ObjectOperations {
        ObjectOperations::new(self.clone())
    }

    #[inline]
    pub(crate) fn as_inner(&self) -> &Client {
        &self.inner
    }

    #[inline]
    pub(crate) fn region(&self) -> Option<String> {
        self.config.region.clone()
    }

    #[inline]
    pub(crate) fn request_timeout(&self) -> Duration {
        self.config.request_timeout
    }
}

#[async_trait::async_trait]
impl ObjectStorage for MinioClient {
    async fn list_page(&self, request: &ListRequest) -> Result<ListPage> {
        let operations = self.object_operations();
        self.config
            .retry
            .execute("list_objects", &self.throttle, || {
                operations.list_page(request)
            })
            .await
    }

    async fn object_tags(&self, bucket: &str, key: &str) -> Result<TagSet> {
        let operations = self.object_operations();
        self.config
            .retry
            .execute("get_object_tagging", &self.throttle, || {
                operations.object_tags(bucket, key)
            })
            .await
    }
}

impl std::fmt::Debug for MinioClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MinioClient")
            .field("endpoint", &self.config.endpoint_masked())
            .field("region", &self.config.region)
            .field("path_style", &self.config.path_style)
            .field("request_timeout", &self.config.request_timeout)
            .field("throttle_pressure", &self.throttle.pressure())
            .field("access_key", &self.config.credentials().access_key_masked())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::MinioCredentials;

    fn config(access: &str, secret: &str) -> MinioConfig {
        let endpoint = Url::parse("https://localhost:9000").unwrap();
        MinioConfig::new(endpoint, MinioCredentials::new(access, secret)).unwrap()
    }

    #[test]
    fn creation_succeeds_with_valid_config() {
        assert!(MinioClient::new(config("minioadmin", "minioadmin")).is_ok());
    }

    #[test]
    fn creation_fails_with_empty_credentials() {
        let result = MinioClient::new(config("", ""));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn debug_masks_credentials() {
        let client = MinioClient::new(config("AKIAEXAMPLE", "supersecret")).unwrap();
        let debug = format!("{client:?}");

        assert!(debug.contains("MinioClient"));
        assert!(debug.contains("localhost:9000"));
        assert!(!debug.contains("supersecret"));
        assert!(!debug.contains("AKIAEXAMPLE"));
    }
}
