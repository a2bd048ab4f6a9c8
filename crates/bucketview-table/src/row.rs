//! One decoded object.

use std::collections::BTreeMap;

use bucketview_storage::{ObjectEntry, TagSet};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::convention::Column;
use crate::decoder::{DecodedKey, decode_key};

/// One row of the bucket table.
///
/// `s3_key`, `etag` and `size` are always present. Convention columns are
/// present only when the key had a segment for them, and `tags` only after
/// hydration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    values: BTreeMap<Column, String>,
    tags: Option<TagSet>,
}

impl Row {
    /// Builds a row from a listed object and its already decoded key.
    pub fn from_parts(entry: ObjectEntry, decoded: DecodedKey) -> Self {
        let mut values = decoded.into_fields();
        values.insert(Column::Etag, entry.etag);
        values.insert(Column::Size, entry.size.to_string());
        values.insert(Column::S3Key, entry.key);

        Self { values, tags: None }
    }

    /// Builds a row from a listed object, decoding its key.
    pub fn from_entry(entry: ObjectEntry) -> Self {
        let decoded = decode_key(&entry.key);
        Self::from_parts(entry, decoded)
    }

    /// Builds a row from raw object attributes.
    pub fn from_key(key: impl Into<String>, etag: impl Into<String>, size: u64) -> Self {
        Self::from_entry(ObjectEntry::new(key, etag, size))
    }

    /// Full object key.
    pub fn key(&self) -> &str {
        self.get(Column::S3Key).unwrap_or_default()
    }

    /// String value of `column`. Always `None` for [`Column::Tags`].
    pub fn get(&self, column: Column) -> Option<&str> {
        self.values.get(&column).map(String::as_str)
    }

    /// Hydrated tags, if they were requested and fetched.
    pub fn tags(&self) -> Option<&TagSet> {
        self.tags.as_ref()
    }

    /// Attaches the object's tags.
    pub fn set_tags(&mut self, tags: TagSet) {
        self.tags = Some(tags);
    }

    /// Returns whether `column` has a value in this row.
    pub fn contains(&self, column: Column) -> bool {
        match column {
            Column::Tags => self.tags.is_some(),
            other => self.values.contains_key(&other),
        }
    }

    /// Renders the requested columns as a JSON object.
    ///
    /// Columns without a value are omitted. Tags render as a nested object.
    pub fn project(&self, columns: &[Column]) -> Value {
        let mut object = Map::with_capacity(columns.len());

        for column in columns {
            let value = match column {
                Column::Tags => self.tags.as_ref().map(|tags| {
                    Value::Object(
                        tags.iter()
                            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                            .collect(),
                    )
                }),
                other => self.get(*other).map(|v| Value::String(v.to_string())),
            };

            if let Some(value) = value {
                object.insert(column.name().to_string(), value);
            }
        }

        Value::Object(object)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.values.len() + usize::from(self.tags.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (column, value) in &self.values {
            map.serialize_entry(column.name(), value)?;
        }
        if let Some(tags) = &self.tags {
            map.serialize_entry(Column::Tags.name(), tags)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn standard_attributes_are_always_present() {
        let row = Row::from_key("P1/C1/a.pdf", "\"etag\"", 1024);

        assert_eq!(row.key(), "P1/C1/a.pdf");
        assert_eq!(row.get(Column::Etag), Some("\"etag\""));
        assert_eq!(row.get(Column::Size), Some("1024"));
        assert_eq!(row.get(Column::Filename), Some("a.pdf"));
        assert!(!row.contains(Column::Process));
        assert!(!row.contains(Column::Tags));
    }

    #[test]
    fn empty_key_still_has_attributes() {
        let row = Row::from_key("", "\"e\"", 0);
        assert_eq!(row.key(), "");
        assert_eq!(row.get(Column::Size), Some("0"));
        assert_eq!(row.get(Column::ProviderId), None);
    }

    #[test]
    fn projection_keeps_requested_columns() {
        let mut row = Row::from_key("P1/C1/a.pdf/ingest/out", "\"e\"", 7);
        row.set_tags(TagSet::from([("status".to_string(), "final".to_string())]));

        let projected = row.project(&[Column::Icn, Column::SubProcess, Column::Tags]);
        assert_eq!(projected, json!({ "icn": "C1", "tags": { "status": "final" } }));
    }

    #[test]
    fn serializes_every_present_column() {
        let row = Row::from_key("P1/C1/a.pdf/ingest/ocr/out", "\"e\"", 3);
        let value = serde_json::to_value(&row).unwrap();

        assert_eq!(
            value,
            json!({
                "provider_id": "P1",
                "icn": "C1",
                "filename": "a.pdf",
                "process": "ingest",
                "sub_process": "ocr",
                "sub_file": "out",
                "etag": "\"e\"",
                "size": "3",
                "s3_key": "P1/C1/a.pdf/ingest/ocr/out",
            })
        );
    }
}
