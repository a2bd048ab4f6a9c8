//! Listing request and page types.

use serde::{Deserialize, Serialize};

/// One call to the bucket listing endpoint.
///
/// Listing is cursor based: the first page has no `start_after`, and each
/// following page starts after the last key of the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRequest {
    /// Bucket to list.
    pub bucket: String,
    /// Server-side key prefix, if any.
    pub prefix: Option<String>,
    /// Maximum number of objects in the returned page.
    pub max_keys: u16,
    /// Only keys strictly after this one are returned.
    pub start_after: Option<String>,
}

impl ListRequest {
    /// Creates a request for the first page of `bucket`.
    pub fn new(bucket: impl Into<String>, max_keys: u16) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: None,
            max_keys,
            start_after: None,
        }
    }

    /// Restricts the listing to keys starting with `prefix`.
    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Returns the request for the page following `page`, or `None` when
    /// `page` was the last one.
    pub fn next(&self, page: &ListPage) -> Option<Self> {
        let cursor = page.next_start_after.clone()?;
        Some(Self {
            start_after: Some(cursor),
            ..self.clone()
        })
    }
}

/// Standard attributes of one listed object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Full object key.
    pub key: String,
    /// Entity tag as returned by the service, quotes included.
    pub etag: String,
    /// Content length in bytes.
    pub size: u64,
}

impl ObjectEntry {
    /// Creates an entry.
    pub fn new(key: impl Into<String>, etag: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            etag: etag.into(),
            size,
        }
    }
}

/// One page of listing results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Objects in key order.
    pub objects: Vec<ObjectEntry>,
    /// Cursor for the next page; `None` when the listing is complete.
    pub next_start_after: Option<String>,
}

impl ListPage {
    /// Builds a page, deriving the cursor from the last key when the service
    /// reported more results.
    pub fn new(objects: Vec<ObjectEntry>, is_truncated: bool) -> Self {
        let next_start_after = if is_truncated {
            objects.last().map(|o| o.key.clone())
        } else {
            None
        };

        Self {
            objects,
            next_start_after,
        }
    }

    /// Returns whether more pages follow this one.
    pub fn has_more(&self) -> bool {
        self.next_start_after.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_page_points_at_last_key() {
        let page = ListPage::new(
            vec![ObjectEntry::new("a/1", "\"e1\"", 1), ObjectEntry::new("a/2", "\"e2\"", 2)],
            true,
        );
        assert!(page.has_more());

        let first = ListRequest::new("bucket", 2).with_prefix(Some("a/".into()));
        let second = first.next(&page).unwrap();
        assert_eq!(second.start_after.as_deref(), Some("a/2"));
        assert_eq!(second.prefix.as_deref(), Some("a/"));
        assert_eq!(second.max_keys, 2);
    }

    #[test]
    fn final_page_has_no_successor() {
        let page = ListPage::new(vec![ObjectEntry::new("a/1", "\"e1\"", 1)], false);
        assert!(!page.has_more());
        assert!(ListRequest::new("bucket", 10).next(&page).is_none());
    }

    #[test]
    fn empty_truncated_page_ends_listing() {
        let page = ListPage::new(Vec::new(), true);
        assert!(!page.has_more());
    }
}
