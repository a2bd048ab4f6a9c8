//! In-memory storage double for tests.
//!
//! [`MockStorage`] behaves like a single bucket: it honours prefix, page size
//! and start-after cursors, records every listing request and counts tag
//! fetches. Failures can be injected on a given page or key.
//!
//! ```toml
//! [dev-dependencies]
//! bucketview-storage = { workspace = true, features = ["test-utils"] }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::types::{ListPage, ListRequest, ObjectEntry, ObjectStorage, TagSet};
use crate::{Error, Result};

#[derive(Debug, Clone)]
struct StoredObject {
    entry: ObjectEntry,
    tags: TagSet,
}

/// In-memory bucket implementing [`ObjectStorage`].
#[derive(Debug)]
pub struct MockStorage {
    bucket: String,
    objects: BTreeMap<String, StoredObject>,
    requests: Mutex<Vec<ListRequest>>,
    tag_requests: Mutex<Vec<String>>,
    pages_served: AtomicUsize,
    fail_page: Option<usize>,
    fail_tags: BTreeSet<String>,
    latency: Option<Duration>,
}

impl MockStorage {
    /// Creates an empty bucket.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: BTreeMap::new(),
            requests: Mutex::new(Vec::new()),
            tag_requests: Mutex::new(Vec::new()),
            pages_served: AtomicUsize::new(0),
            fail_page: None,
            fail_tags: BTreeSet::new(),
            latency: None,
        }
    }

    /// Adds an object whose size is the key length and whose etag is the key
    /// with separators replaced.
    pub fn with_object(self, key: &str) -> Self {
        let etag = format!("\"{}\"", key.replace('/', "-"));
        self.with_entry(ObjectEntry::new(key, etag, key.len() as u64), TagSet::new())
    }

    /// Adds an object with explicit attributes and tags.
    pub fn with_entry(mut self, entry: ObjectEntry, tags: TagSet) -> Self {
        self.objects
            .insert(entry.key.clone(), StoredObject { entry, tags });
        self
    }

    /// Sets the tags of an already added object.
    pub fn with_tags<I, K, V>(mut self, key: &str, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        if let Some(object) = self.objects.get_mut(key) {
            object.tags = tags.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        }
        self
    }

    /// Makes the listing fail when page `page` (0-based) is requested.
    pub fn failing_page(mut self, page: usize) -> Self {
        self.fail_page = Some(page);
        self
    }

    /// Makes the tag fetch for `key` fail.
    pub fn failing_tags(mut self, key: &str) -> Self {
        self.fail_tags.insert(key.to_string());
        self
    }

    /// Delays every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns every listing request received so far.
    pub fn list_requests(&self) -> Vec<ListRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Returns the keys whose tags were requested, in request order.
    pub fn tag_requests(&self) -> Vec<String> {
        self.tag_requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait::async_trait]
impl ObjectStorage for MockStorage {
    async fn list_page(&self, request: &ListRequest) -> Result<ListPage> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        self.simulate_latency().await;

        if request.bucket != self.bucket {
            return Err(Error::NotFound(format!("NoSuchBucket: {}", request.bucket)));
        }

        let page_index = self.pages_served.fetch_add(1, Ordering::SeqCst);
        if self.fail_page == Some(page_index) {
            return Err(Error::ServerError {
                message: "AccessDenied".to_string(),
                status_code: 403,
            });
        }

        let prefix = request.prefix.as_deref().unwrap_or("");
        let mut matching = self
            .objects
            .values()
            .filter(|o| o.entry.key.starts_with(prefix))
            .filter(|o| {
                request
                    .start_after
                    .as_deref()
                    .is_none_or(|cursor| o.entry.key.as_str() > cursor)
            })
            .map(|o| o.entry.clone());

        let objects: Vec<ObjectEntry> = matching
            .by_ref()
            .take(usize::from(request.max_keys))
            .collect();
        let is_truncated = matching.next().is_some();

        Ok(ListPage::new(objects, is_truncated))
    }

    async fn object_tags(&self, bucket: &str, key: &str) -> Result<TagSet> {
        if let Ok(mut requests) = self.tag_requests.lock() {
            requests.push(key.to_string());
        }

        self.simulate_latency().await;

        if bucket != self.bucket {
            return Err(Error::NotFound(format!("NoSuchBucket: {bucket}")));
        }

        if self.fail_tags.contains(key) {
            return Err(Error::ServerError {
                message: "AccessDenied".to_string(),
                status_code: 403,
            });
        }

        self.objects
            .get(key)
            .map(|o| o.tags.clone())
            .ok_or_else(|| Error::NotFound(format!("NoSuchKey: {key}")))
    }
}
