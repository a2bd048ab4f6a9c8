//! Per-row tag hydration.

use std::sync::Arc;
use std::time::Instant;

use bucketview_storage::{ObjectStorage, TagSet};
use tracing::{debug, error};

use crate::row::Row;
use crate::{Error, Result, TRACING_TARGET_TAGS};

/// Fetches the tag set of single objects in one bucket.
#[derive(Debug)]
pub struct TagHydrator<S> {
    storage: Arc<S>,
    bucket: String,
}

impl<S> Clone for TagHydrator<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            bucket: self.bucket.clone(),
        }
    }
}

impl<S: ObjectStorage> TagHydrator<S> {
    /// Creates a hydrator for `bucket`.
    pub fn new(storage: Arc<S>, bucket: impl Into<String>) -> Self {
        Self {
            storage,
            bucket: bucket.into(),
        }
    }

    /// Fetches the tags of the object stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TagHydration`] if the fetch fails.
    pub async fn hydrate(&self, key: &str) -> Result<TagSet> {
        let start = Instant::now();

        match self.storage.object_tags(&self.bucket, key).await {
            Ok(tags) => {
                debug!(
                    target: TRACING_TARGET_TAGS,
                    key = %key,
                    count = tags.len(),
                    elapsed = ?start.elapsed(),
                    "Hydrated tags"
                );
                Ok(tags)
            }
            Err(source) => {
                error!(
                    target: TRACING_TARGET_TAGS,
                    bucket = %self.bucket,
                    key = %key,
                    severity = ?source.severity(),
                    error = %source,
                    "Failed to hydrate tags"
                );
                Err(Error::TagHydration {
                    key: key.to_string(),
                    source,
                })
            }
        }
    }

    /// Fetches the tags of `row`'s object and attaches them to the row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TagHydration`] if the fetch fails; the row is left
    /// without tags.
    pub async fn hydrate_row(&self, row: &mut Row) -> Result<()> {
        let tags = self.hydrate(row.key()).await?;
        row.set_tags(tags);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bucketview_storage::mock::MockStorage;

    use super::*;

    fn hydrator() -> TagHydrator<MockStorage> {
        let storage = MockStorage::new("docs")
            .with_object("P1/C1/a.pdf/ingest/out")
            .with_tags("P1/C1/a.pdf/ingest/out", [("status", "final"), ("owner", "ops")])
            .with_object("P1/C1/b.pdf/ingest/out")
            .failing_tags("P1/C1/b.pdf/ingest/out");
        TagHydrator::new(Arc::new(storage), "docs")
    }

    #[tokio::test]
    async fn hydrates_row_tags() {
        let hydrator = hydrator();
        let mut row = Row::from_key("P1/C1/a.pdf/ingest/out", "\"e\"", 1);

        hydrator.hydrate_row(&mut row).await.unwrap();

        let tags = row.tags().unwrap();
        assert_eq!(tags.get("status").map(String::as_str), Some("final"));
        assert_eq!(tags.len(), 2);
    }

    #[tokio::test]
    async fn untagged_object_gets_empty_set() {
        let storage = MockStorage::new("docs").with_object("k/1");
        let hydrator = TagHydrator::new(Arc::new(storage), "docs");
        assert!(hydrator.hydrate("k/1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failure_names_the_key() {
        let hydrator = hydrator();
        let mut row = Row::from_key("P1/C1/b.pdf/ingest/out", "\"e\"", 1);

        let err = hydrator.hydrate_row(&mut row).await.unwrap_err();
        assert!(matches!(&err, Error::TagHydration { key, .. } if key == "P1/C1/b.pdf/ingest/out"));
        assert!(row.tags().is_none());
    }
}
