//! The fixed key convention: which path segment holds which column.
//!
//! Keys look like `provider_id/icn/filename/process/sub_file`. When a
//! processing step produced an intermediate result the key gains one more
//! segment, `provider_id/icn/filename/process/sub_process/sub_file`, so the
//! meaning of the fifth segment depends on how many segments the key has.
//! That choice is made once per key by [`KeyLayout::for_segment_count`].

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Path separator between key segments.
pub const SEPARATOR: char = '/';

/// A column of the bucket table.
///
/// The first six variants come from key segments, the rest from object
/// attributes. Variant order is the table's column order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    /// Healthcare provider identifier.
    ProviderId,
    /// Claim identifier.
    Icn,
    /// Name of the stored file.
    Filename,
    /// Pipeline task that uploaded the file.
    Process,
    /// Additional task that produced an intermediate file.
    SubProcess,
    /// File derived from the output of a task.
    SubFile,
    /// Entity tag of the object.
    Etag,
    /// Content length, as a decimal string.
    Size,
    /// Full object key.
    S3Key,
    /// Object tags, fetched per object on demand.
    Tags,
}

impl Column {
    /// Returns the column name as it appears in the table schema.
    #[inline]
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Layout of a five-segment key.
const SHORT_LAYOUT: [Column; 5] = [
    Column::ProviderId,
    Column::Icn,
    Column::Filename,
    Column::Process,
    Column::SubFile,
];

/// Layout of a key with six or more segments.
const LONG_LAYOUT: [Column; 6] = [
    Column::ProviderId,
    Column::Icn,
    Column::Filename,
    Column::Process,
    Column::SubProcess,
    Column::SubFile,
];

/// Leading columns whose segment position never depends on key length.
///
/// Only these can be turned into a listing prefix.
pub const POSITIONAL_COLUMNS: [Column; 4] = [
    Column::ProviderId,
    Column::Icn,
    Column::Filename,
    Column::Process,
];

/// Segment-to-column mapping for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyLayout {
    /// `provider_id/icn/filename/process/sub_file`.
    Short,
    /// `provider_id/icn/filename/process/sub_process/sub_file`.
    Long,
}

impl KeyLayout {
    /// Picks the layout from the number of segments alone.
    ///
    /// Anything longer than five segments is a long key; shorter keys use the
    /// short layout and simply leave trailing columns unset.
    pub fn for_segment_count(segments: usize) -> Self {
        if segments > SHORT_LAYOUT.len() {
            KeyLayout::Long
        } else {
            KeyLayout::Short
        }
    }

    /// Columns of this layout in segment order.
    pub fn columns(self) -> &'static [Column] {
        match self {
            KeyLayout::Short => &SHORT_LAYOUT,
            KeyLayout::Long => &LONG_LAYOUT,
        }
    }

    /// Column stored at segment `index`, or `None` past the layout's end.
    pub fn column_at(self, index: usize) -> Option<Column> {
        self.columns().get(index).copied()
    }

    /// Number of segments a key with this layout is expected to have.
    pub fn arity(self) -> usize {
        self.columns().len()
    }
}
