//! Error taxonomy of a table scan.

use bucketview_storage::Error as StorageError;

/// Type alias for results of table operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that end a table scan.
///
/// A key that does not fit the path convention is never an error; it is
/// decoded as far as its segments go.
#[derive(Debug, thiserror::Error)]
#[must_use = "errors should be handled appropriately"]
pub enum Error {
    /// The storage client could not be created. No row was produced.
    #[error("failed to connect to storage: {0}")]
    Connection(#[source] StorageError),

    /// A listing page could not be fetched. Rows already emitted stand.
    #[error("failed to list bucket '{bucket}' with prefix {prefix:?}: {source}")]
    Listing {
        /// Bucket being listed.
        bucket: String,
        /// Prefix the listing was scoped to.
        prefix: Option<String>,
        /// Storage failure that survived the retry policy.
        #[source]
        source: StorageError,
    },

    /// The tag set of one object could not be fetched.
    #[error("failed to fetch tags of '{key}': {source}")]
    TagHydration {
        /// Object whose tags were requested.
        key: String,
        /// Storage failure that survived the retry policy.
        #[source]
        source: StorageError,
    },

    /// The scan was cancelled before it completed.
    #[error("scan cancelled")]
    Cancelled,

    /// The row consumer stopped accepting rows.
    #[error("row sink closed: {0}")]
    Sink(String),

    /// The query asked for something the table cannot do.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl Error {
    /// Returns whether the scan ended because it was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Returns the storage error behind this one, if any.
    pub fn storage_error(&self) -> Option<&StorageError> {
        match self {
            Error::Connection(source)
            | Error::Listing { source, .. }
            | Error::TagHydration { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_failures_expose_their_source() {
        let error = Error::TagHydration {
            key: "P1/C1/a.pdf".into(),
            source: StorageError::RateLimited { retry_after: None },
        };
        assert!(error.storage_error().is_some_and(StorageError::is_retryable));
        assert!(!error.is_cancelled());

        assert!(Error::Cancelled.is_cancelled());
        assert!(Error::Cancelled.storage_error().is_none());
        assert!(Error::Sink("closed".into()).storage_error().is_none());
    }
}
