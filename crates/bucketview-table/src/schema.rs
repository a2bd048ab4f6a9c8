//! Table definition exposed to query engines.

use serde::{Deserialize, Serialize};
use strum::{Display, IntoEnumIterator};

use crate::convention::{Column, POSITIONAL_COLUMNS};

/// Value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ColumnType {
    /// Plain string. `size` is a decimal string too.
    String,
    /// JSON object.
    Json,
}

/// One column of the table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    /// Column identity.
    pub column: Column,
    /// Value type.
    #[serde(rename = "type")]
    pub kind: ColumnType,
    /// Human readable description.
    pub description: &'static str,
    /// Whether an equality filter on this column can become a key prefix.
    pub pushdown: bool,
}

impl ColumnDef {
    fn for_column(column: Column) -> Self {
        let kind = match column {
            Column::Tags => ColumnType::Json,
            _ => ColumnType::String,
        };

        Self {
            column,
            kind,
            description: describe(column),
            pushdown: POSITIONAL_COLUMNS.contains(&column),
        }
    }

    /// Column name.
    pub fn name(&self) -> &'static str {
        self.column.name()
    }
}

fn describe(column: Column) -> &'static str {
    match column {
        Column::ProviderId => "A unique identifier for the healthcare provider.",
        Column::Icn => "A unique identifier for the medical claim.",
        Column::Filename => "The title of the file stored in S3.",
        Column::Process => "The data pipeline processing task that uploaded this file to S3.",
        Column::SubProcess => {
            "An additional processing task performed during the creation of this file."
        }
        Column::SubFile => {
            "The title of a file derived from an existing file produced by a data pipeline \
             processing task."
        }
        Column::Etag => "The ETag of the S3 Object.",
        Column::Size => "The memory size of the S3 Object.",
        Column::S3Key => "The unique key of the S3 Object.",
        Column::Tags => "The tags of the S3 Object populated by the GetObjectTagging API.",
    }
}

/// Schema of one bucket table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Columns in table order.
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Builds the schema of a table named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Column::iter().map(ColumnDef::for_column).collect(),
        }
    }

    /// Looks a column up by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|def| def.name() == name)
    }

    /// Columns eligible for prefix pushdown, in segment order.
    pub fn pushdown_columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns.iter().filter(|def| def.pushdown).map(|def| def.column)
    }
}
