//! Object key to column values.

use std::collections::BTreeMap;

use crate::convention::{Column, KeyLayout, SEPARATOR};

/// Convention columns recovered from one object key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedKey {
    layout: KeyLayout,
    segments: usize,
    fields: BTreeMap<Column, String>,
}

impl DecodedKey {
    /// Layout chosen for the key.
    pub fn layout(&self) -> KeyLayout {
        self.layout
    }

    /// Number of segments the key was split into.
    pub fn segment_count(&self) -> usize {
        self.segments
    }

    /// Value of one convention column, if the key had a segment for it.
    pub fn get(&self, column: Column) -> Option<&str> {
        self.fields.get(&column).map(String::as_str)
    }

    /// Decoded columns in column order.
    pub fn fields(&self) -> &BTreeMap<Column, String> {
        &self.fields
    }

    /// Whether the key has exactly as many segments as its layout expects.
    pub fn is_complete(&self) -> bool {
        self.segments == self.layout.arity()
    }

    /// Segments beyond the layout that were not mapped to any column.
    pub fn dropped_segments(&self) -> usize {
        self.segments.saturating_sub(self.layout.arity())
    }

    pub(crate) fn into_fields(self) -> BTreeMap<Column, String> {
        self.fields
    }
}

/// Splits `key` on [`SEPARATOR`] and maps each segment to its column.
///
/// Keys of unexpected length still decode: missing trailing columns are left
/// unset and segments past the last column are dropped. The empty key
/// decodes to no columns at all.
pub fn decode_key(key: &str) -> DecodedKey {
    if key.is_empty() {
        return DecodedKey {
            layout: KeyLayout::Short,
            segments: 0,
            fields: BTreeMap::new(),
        };
    }

    let segments: Vec<&str> = key.split(SEPARATOR).collect();
    let layout = KeyLayout::for_segment_count(segments.len());

    let fields = segments
        .iter()
        .enumerate()
        .map_while(|(index, segment)| {
            layout
                .column_at(index)
                .map(|column| (column, (*segment).to_string()))
        })
        .collect();

    DecodedKey {
        layout,
        segments: segments.len(),
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(decoded: &DecodedKey) -> Vec<(&'static str, &str)> {
        decoded
            .fields()
            .iter()
            .map(|(column, value)| (column.name(), value.as_str()))
            .collect()
    }

    #[test]
    fn short_key() {
        let decoded = decode_key("P123/C456/report.pdf/ingest/normalize");

        assert_eq!(decoded.layout(), KeyLayout::Short);
        assert!(decoded.is_complete());
        assert_eq!(
            values(&decoded),
            vec![
                ("provider_id", "P123"),
                ("icn", "C456"),
                ("filename", "report.pdf"),
                ("process", "ingest"),
                ("sub_file", "normalize"),
            ]
        );
        assert_eq!(decoded.get(Column::SubProcess), None);
    }

    #[test]
    fn long_key() {
        let decoded = decode_key("P123/C456/report.pdf/ingest/ocr/normalize");

        assert_eq!(decoded.layout(), KeyLayout::Long);
        assert!(decoded.is_complete());
        assert_eq!(decoded.get(Column::SubProcess), Some("ocr"));
        assert_eq!(decoded.get(Column::SubFile), Some("normalize"));
        assert_eq!(decoded.get(Column::Process), Some("ingest"));
    }

    #[test]
    fn three_segments_leave_trailing_columns_unset() {
        let decoded = decode_key("P1/C1/file.txt");

        assert!(!decoded.is_complete());
        assert_eq!(
            values(&decoded),
            vec![("provider_id", "P1"), ("icn", "C1"), ("filename", "file.txt")]
        );
    }

    #[test]
    fn seventh_segment_is_dropped() {
        let decoded = decode_key("a/b/c/d/e/f/g");

        assert_eq!(decoded.layout(), KeyLayout::Long);
        assert_eq!(decoded.fields().len(), 6);
        assert_eq!(decoded.get(Column::SubProcess), Some("e"));
        assert_eq!(decoded.get(Column::SubFile), Some("f"));
        assert_eq!(decoded.dropped_segments(), 1);
        assert!(!decoded.fields().values().any(|v| v == "g"));
    }

    #[test]
    fn empty_key_decodes_to_nothing() {
        let decoded = decode_key("");
        assert!(decoded.fields().is_empty());
        assert_eq!(decoded.segment_count(), 0);
    }

    #[test]
    fn empty_segments_are_kept_verbatim() {
        let decoded = decode_key("P1//file/");
        assert_eq!(decoded.get(Column::Icn), Some(""));
        assert_eq!(decoded.get(Column::Process), Some(""));
        assert_eq!(decoded.segment_count(), 4);
    }

    #[test]
    fn joined_values_round_trip() {
        let short = ["p", "i", "f", "proc", "sf"];
        let decoded = decode_key(&short.join("/"));
        let expected: Vec<&str> = short.to_vec();
        let actual: Vec<&str> = KeyLayout::Short
            .columns()
            .iter()
            .filter_map(|c| decoded.get(*c))
            .collect();
        assert_eq!(actual, expected);

        let long = ["p", "i", "f", "proc", "sp", "sf"];
        let decoded = decode_key(&long.join("/"));
        let actual: Vec<&str> = KeyLayout::Long
            .columns()
            .iter()
            .filter_map(|c| decoded.get(*c))
            .collect();
        assert_eq!(actual, long.to_vec());

        assert_eq!(decode_key(&long.join("/")), decoded);
    }
}
