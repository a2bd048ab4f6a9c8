#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for listing and row emission.
pub const TRACING_TARGET_SCAN: &str = "bucketview_table::scan";

/// Tracing target for tag hydration.
pub const TRACING_TARGET_TAGS: &str = "bucketview_table::tags";

/// Tracing target for storage client creation.
pub const TRACING_TARGET_CONNECTION: &str = "bucketview_table::connection";

mod cache;
mod error;
mod sink;

pub mod convention;
pub mod decoder;
pub mod listing;
pub mod prefix;
pub mod query;
pub mod row;
pub mod schema;
pub mod table;
pub mod tags;

pub use bucketview_storage::{ObjectStorage, TagSet};

pub use crate::cache::{ClientCache, Connector};
pub use crate::convention::{Column, KeyLayout, SEPARATOR};
pub use crate::decoder::{DecodedKey, decode_key};
pub use crate::error::{Error, Result};
pub use crate::listing::{RowStream, list_rows};
pub use crate::prefix::{Filters, build_prefix};
pub use crate::query::{DEFAULT_PAGE_SIZE, Query, QueryBuilder, TAGGED_PAGE_SIZE};
pub use crate::row::Row;
pub use crate::schema::{ColumnDef, ColumnType, TableSchema};
pub use crate::sink::RowSink;
pub use crate::table::{BucketTable, ScanSummary, TableConfig};
pub use crate::tags::TagHydrator;
