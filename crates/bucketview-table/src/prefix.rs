//! Equality filters and their translation into a listing prefix.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

use crate::convention::{Column, POSITIONAL_COLUMNS, SEPARATOR};
use crate::row::Row;

/// Equality filters of one query, keyed by column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(BTreeMap<Column, String>);

impl Filters {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the filter on `column`.
    pub fn insert(&mut self, column: Column, value: impl Into<String>) -> Option<String> {
        self.0.insert(column, value.into())
    }

    /// Builder form of [`Filters::insert`].
    pub fn with(mut self, column: Column, value: impl Into<String>) -> Self {
        self.insert(column, value);
        self
    }

    /// Value the query requires for `column`, if any.
    pub fn get(&self, column: Column) -> Option<&str> {
        self.0.get(&column).map(String::as_str)
    }

    /// Returns whether the query has no filters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of filters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Filters in column order.
    pub fn iter(&self) -> btree_map::Iter<'_, Column, String> {
        self.0.iter()
    }

    /// Returns whether `row` satisfies every filter.
    ///
    /// A row without a value for a filtered column does not match.
    pub fn matches(&self, row: &Row) -> bool {
        self.0
            .iter()
            .all(|(column, expected)| row.get(*column) == Some(expected.as_str()))
    }
}

impl FromIterator<(Column, String)> for Filters {
    fn from_iter<I: IntoIterator<Item = (Column, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Filters {
    type IntoIter = btree_map::Iter<'a, Column, String>;
    type Item = (&'a Column, &'a String);

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Builds the listing prefix for `filters`.
///
/// Walks the positional columns in segment order and appends each filtered
/// value followed by the separator, stopping at the first column without a
/// filter. The walk never goes past [`POSITIONAL_COLUMNS`]: the fifth segment
/// holds `sub_file` or `sub_process` depending on key length, so a filter on
/// either is left to the caller even when every earlier column is filtered. Values are used verbatim, separators included. Returns `None` when
/// no leading column is filtered, meaning the whole bucket must be listed.
pub fn build_prefix(filters: &Filters) -> Option<String> {
    let mut prefix = String::new();

    for column in POSITIONAL_COLUMNS {
        let Some(value) = filters.get(column) else {
            break;
        };
        prefix.push_str(value);
        prefix.push(SEPARATOR);
    }

    (!prefix.is_empty()).then_some(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_have_no_prefix() {
        assert_eq!(build_prefix(&Filters::new()), None);
    }

    #[test]
    fn leading_run_becomes_prefix() {
        let filters = Filters::new()
            .with(Column::ProviderId, "P123")
            .with(Column::Icn, "C456");
        assert_eq!(build_prefix(&filters).as_deref(), Some("P123/C456/"));

        let filters = filters
            .with(Column::Filename, "report.pdf")
            .with(Column::Process, "ingest");
        assert_eq!(
            build_prefix(&filters).as_deref(),
            Some("P123/C456/report.pdf/ingest/")
        );
    }

    #[test]
    fn gap_stops_the_prefix() {
        let filters = Filters::new()
            .with(Column::ProviderId, "P123")
            .with(Column::Process, "ingest");
        assert_eq!(build_prefix(&filters).as_deref(), Some("P123/"));

        let filters = Filters::new().with(Column::Icn, "C456");
        assert_eq!(build_prefix(&filters), None);
    }

    #[test]
    fn polymorphic_segment_is_never_pushed_down() {
        let filters = Filters::new()
            .with(Column::ProviderId, "P")
            .with(Column::Icn, "I")
            .with(Column::Filename, "F")
            .with(Column::Process, "ingest")
            .with(Column::SubFile, "normalize")
            .with(Column::SubProcess, "ocr");
        assert_eq!(build_prefix(&filters).as_deref(), Some("P/I/F/ingest/"));
    }

    #[test]
    fn attribute_filters_do_not_contribute() {
        let filters = Filters::new()
            .with(Column::Etag, "\"abc\"")
            .with(Column::S3Key, "P/I");
        assert_eq!(build_prefix(&filters), None);
    }

    #[test]
    fn values_are_not_escaped() {
        let filters = Filters::new().with(Column::ProviderId, "P1/extra");
        assert_eq!(build_prefix(&filters).as_deref(), Some("P1/extra/"));
    }

    #[test]
    fn matches_checks_every_filter() {
        let row = Row::from_key("P1/C1/a.pdf/ingest/out", "\"e\"", 10);

        assert!(Filters::new().matches(&row));
        assert!(
            Filters::new()
                .with(Column::ProviderId, "P1")
                .with(Column::SubFile, "out")
                .matches(&row)
        );
        assert!(!Filters::new().with(Column::Process, "ocr").matches(&row));
        assert!(!Filters::new().with(Column::SubProcess, "ocr").matches(&row));
        assert!(Filters::new().with(Column::Size, "10").matches(&row));
    }
}
