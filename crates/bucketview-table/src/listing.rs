//! Paginated listing turned into a stream of rows.
//!
//! Pages are fetched strictly one after another: the next page is only
//! requested once every row of the current page has been taken by the
//! consumer. When the query wants tags, each row is hydrated right before it
//! is yielded.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_stream::try_stream;
use bucketview_storage::{ListRequest, ObjectStorage};
use futures::Stream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::decoder::decode_key;
use crate::query::Query;
use crate::row::Row;
use crate::tags::TagHydrator;
use crate::{Error, Result, TRACING_TARGET_SCAN};

/// Rows of one scan. The stream ends after the first error.
pub type RowStream = Pin<Box<dyn Stream<Item = Result<Row>> + Send>>;

/// Streams every row of `bucket` matching the pushed-down part of `query`.
///
/// Filters that cannot be pushed down are not applied here. Cancelling
/// `cancel` stops the scan at the next page or tag fetch with
/// [`Error::Cancelled`].
pub fn list_rows<S: ObjectStorage>(
    storage: Arc<S>,
    bucket: impl Into<String>,
    query: &Query,
    cancel: CancellationToken,
) -> RowStream {
    listing_stream(storage, bucket.into(), query.clone(), cancel, Arc::default())
}

/// Same as [`list_rows`], counting fetched pages into `pages`.
pub(crate) fn listing_stream<S: ObjectStorage>(
    storage: Arc<S>,
    bucket: String,
    query: Query,
    cancel: CancellationToken,
    pages: Arc<AtomicUsize>,
) -> RowStream {
    Box::pin(try_stream! {
        let prefix = query.prefix();
        let page_size = query.page_size();
        let hydrator = query
            .wants_tags()
            .then(|| TagHydrator::new(Arc::clone(&storage), bucket.clone()));

        info!(
            target: TRACING_TARGET_SCAN,
            bucket = %bucket,
            prefix = ?prefix,
            page_size,
            hydrate_tags = hydrator.is_some(),
            "Starting bucket scan"
        );

        let mut next = Some(ListRequest::new(bucket.clone(), page_size).with_prefix(prefix.clone()));
        let mut page_number = 0usize;
        let mut rows = 0u64;

        while let Some(request) = next.take() {
            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(cancelled(&bucket, rows)),
                result = storage.list_page(&request) => result.map_err(|source| {
                    error!(
                        target: TRACING_TARGET_SCAN,
                        bucket = %bucket,
                        prefix = ?prefix,
                        page = page_number,
                        start_after = ?request.start_after,
                        severity = ?source.severity(),
                        error = %source,
                        "Failed to list page"
                    );
                    Error::Listing {
                        bucket: bucket.clone(),
                        prefix: prefix.clone(),
                        source,
                    }
                }),
            };
            let page = fetched?;

            page_number += 1;
            pages.fetch_add(1, Ordering::Relaxed);
            debug!(
                target: TRACING_TARGET_SCAN,
                page = page_number,
                count = page.objects.len(),
                has_more = page.has_more(),
                "Received page"
            );

            next = request.next(&page);

            for entry in page.objects {
                let decoded = decode_key(&entry.key);
                if !decoded.is_complete() {
                    debug!(
                        target: TRACING_TARGET_SCAN,
                        key = %entry.key,
                        segments = decoded.segment_count(),
                        "Key does not follow the path convention"
                    );
                }

                let mut row = Row::from_parts(entry, decoded);

                if let Some(hydrator) = &hydrator {
                    let hydrated = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => Err(cancelled(&bucket, rows)),
                        result = hydrator.hydrate_row(&mut row) => result,
                    };
                    hydrated?;
                }

                rows += 1;
                yield row;
            }
        }

        info!(
            target: TRACING_TARGET_SCAN,
            bucket = %bucket,
            rows,
            pages = page_number,
            "Bucket scan finished"
        );
    })
}

fn cancelled(bucket: &str, rows: u64) -> Error {
    info!(
        target: TRACING_TARGET_SCAN,
        bucket = %bucket,
        rows,
        "Bucket scan cancelled"
    );
    Error::Cancelled
}
