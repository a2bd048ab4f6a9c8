//! The storage seam the table engine is written against.

use std::collections::BTreeMap;

use super::list::{ListPage, ListRequest};
use crate::Result;

/// Tag set of one object, keyed by tag name.
pub type TagSet = BTreeMap<String, String>;

/// Operations the table engine needs from object storage.
///
/// Implemented by [`MinioClient`](crate::MinioClient) for real buckets and by
/// `mock::MockStorage` in tests. Implementations apply their own retry policy;
/// an error returned here is final for that request.
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync + 'static {
    /// Fetches one page of objects.
    async fn list_page(&self, request: &ListRequest) -> Result<ListPage>;

    /// Fetches the tag set of a single object.
    async fn object_tags(&self, bucket: &str, key: &str) -> Result<TagSet>;
}

#[async_trait::async_trait]
impl<S: ObjectStorage + ?Sized> ObjectStorage for std::sync::Arc<S> {
    async fn list_page(&self, request: &ListRequest) -> Result<ListPage> {
        (**self).list_page(request).await
    }

    async fn object_tags(&self, bucket: &str, key: &str) -> Result<TagSet> {
        (**self).object_tags(bucket, key).await
    }
}
