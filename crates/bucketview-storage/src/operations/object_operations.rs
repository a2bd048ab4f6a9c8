//! Single-attempt object operations against the MinIO SDK.
//!
//! Every call here is one network request bounded by the client's request
//! timeout. Retries are layered on top by [`MinioClient`].

use std::future::Future;

use futures::StreamExt;
use minio::s3::types::{S3Api, ToStream};
use tracing::{debug, error, instrument};

use crate::types::{ListPage, ListRequest, ObjectEntry, TagSet};
use crate::{Error, MinioClient, Result, TRACING_TARGET_OBJECTS};

/// Object operations bound to one [`MinioClient`].
#[derive(Debug, Clone)]
pub struct ObjectOperations {
    client: MinioClient,
}

impl ObjectOperations {
    /// Creates object operations for a client.
    pub fn new(client: MinioClient) -> Self {
        Self { client }
    }

    /// Requests one page of the bucket listing.
    ///
    /// Listing is always recursive: keys are returned whole, never rolled up
    /// into common prefixes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or times out.
    #[instrument(
        skip(self, request),
        target = TRACING_TARGET_OBJECTS,
        fields(bucket = %request.bucket, prefix = ?request.prefix, max_keys = request.max_keys)
    )]
    pub async fn list_page(&self, request: &ListRequest) -> Result<ListPage> {
        if request.bucket.is_empty() {
            return Err(Error::InvalidRequest("Bucket name cannot be empty".into()));
        }

        debug!(
            target: TRACING_TARGET_OBJECTS,
            start_after = ?request.start_after,
            "Listing objects"
        );

        let start = std::time::Instant::now();

        let builder = self
            .client
            .as_inner()
            .list_objects(&request.bucket)
            .region(self.client.region())
            .recursive(true)
            .prefix(request.prefix.clone())
            .start_after(request.start_after.clone())
            .max_keys(Some(request.max_keys));

        // The SDK stream follows continuations by itself; only its first
        // page is taken so the caller keeps control of pagination.
        let result = self
            .bounded(async move {
                let mut stream = builder.to_stream().await;
                stream.next().await
            })
            .await?;

        let elapsed = start.elapsed();

        match result {
            Some(Ok(response)) => {
                let objects: Vec<ObjectEntry> = response
                    .contents
                    .into_iter()
                    .map(|entry| ObjectEntry {
                        key: entry.name,
                        etag: entry.etag.unwrap_or_default(),
                        size: entry.size.unwrap_or(0),
                    })
                    .collect();

                let page = ListPage::new(objects, response.is_truncated);

                debug!(
                    target: TRACING_TARGET_OBJECTS,
                    count = page.objects.len(),
                    has_more = page.has_more(),
                    elapsed = ?elapsed,
                    "Listed page"
                );

                Ok(page)
            }
            Some(Err(e)) => {
                error!(
                    target: TRACING_TARGET_OBJECTS,
                    bucket = %request.bucket,
                    prefix = ?request.prefix,
                    error = %e,
                    elapsed = ?elapsed,
                    "Failed to list objects"
                );
                Err(Error::from_sdk(e))
            }
            None => {
                debug!(
                    target: TRACING_TARGET_OBJECTS,
                    elapsed = ?elapsed,
                    "No objects found"
                );
                Ok(ListPage::default())
            }
        }
    }

    /// Fetches the tag set of one object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object does not exist, access is denied or the
    /// request times out.
    #[instrument(skip(self), target = TRACING_TARGET_OBJECTS, fields(bucket = %bucket, key = %key))]
    pub async fn object_tags(&self, bucket: &str, key: &str) -> Result<TagSet> {
        if key.is_empty() {
            return Err(Error::InvalidRequest("Object key cannot be empty".into()));
        }

        let start = std::time::Instant::now();

        let result = self
            .bounded(
                self.client
                    .as_inner()
                    .get_object_tagging(bucket, key)
                    .region(self.client.region())
                    .send(),
            )
            .await?;

        let elapsed = start.elapsed();

        match result {
            Ok(response) => {
                let tags: TagSet = response.tags.into_iter().collect();

                debug!(
                    target: TRACING_TARGET_OBJECTS,
                    count = tags.len(),
                    elapsed = ?elapsed,
                    "Fetched object tags"
                );

                Ok(tags)
            }
            Err(e) => {
                error!(
                    target: TRACING_TARGET_OBJECTS,
                    bucket = %bucket,
                    key = %key,
                    error = %e,
                    elapsed = ?elapsed,
                    "Failed to fetch object tags"
                );
                Err(Error::from_sdk(e))
            }
        }
    }

    /// Applies the client's request timeout to one request.
    async fn bounded<T>(&self, request: impl Future<Output = T>) -> Result<T> {
        let timeout = self.client.request_timeout();
        tokio::time::timeout(timeout, request)
            .await
            .map_err(|_| Error::Timeout { timeout })
    }
}
