//! What a caller asks of the table: output columns and equality filters.

use std::str::FromStr;

use strum::IntoEnumIterator;

use crate::convention::Column;
use crate::prefix::{Filters, build_prefix};
use crate::{Error, Result};

/// Listing page size when tags are not requested.
pub const DEFAULT_PAGE_SIZE: u16 = 1000;

/// Listing page size when every row costs an extra tag fetch.
pub const TAGGED_PAGE_SIZE: u16 = 100;

/// A validated table query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    columns: Vec<Column>,
    filters: Filters,
    wants_tags: bool,
}

impl Query {
    /// Starts building a query.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    /// Query for every column with no filters.
    pub fn all() -> Self {
        Self::new(Column::iter().collect(), Filters::new())
    }

    fn new(columns: Vec<Column>, filters: Filters) -> Self {
        let wants_tags = columns.contains(&Column::Tags);
        Self {
            columns,
            filters,
            wants_tags,
        }
    }

    /// Requested output columns, in request order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Equality filters.
    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Returns whether rows need their tags hydrated.
    #[inline]
    pub fn wants_tags(&self) -> bool {
        self.wants_tags
    }

    /// Listing page size for this query.
    pub fn page_size(&self) -> u16 {
        if self.wants_tags {
            TAGGED_PAGE_SIZE
        } else {
            DEFAULT_PAGE_SIZE
        }
    }

    /// Key prefix the listing is scoped to, if any filter can be pushed down.
    pub fn prefix(&self) -> Option<String> {
        build_prefix(&self.filters)
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::all()
    }
}

/// Builder for [`Query`].
///
/// With no columns selected the query returns every column.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    columns: Vec<Column>,
    filters: Filters,
    unknown: Vec<String>,
}

impl QueryBuilder {
    /// Adds an output column.
    pub fn column(mut self, column: Column) -> Self {
        if !self.columns.contains(&column) {
            self.columns.push(column);
        }
        self
    }

    /// Adds several output columns.
    pub fn columns(self, columns: impl IntoIterator<Item = Column>) -> Self {
        columns.into_iter().fold(self, Self::column)
    }

    /// Adds output columns by name. Unknown names fail [`QueryBuilder::build`].
    pub fn column_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref().trim();
            match Column::from_str(name) {
                Ok(column) => self = self.column(column),
                Err(_) => self.unknown.push(name.to_string()),
            }
        }
        self
    }

    /// Adds an equality filter.
    pub fn filter(mut self, column: Column, value: impl Into<String>) -> Self {
        self.filters.insert(column, value);
        self
    }

    /// Adds an equality filter when `value` is present.
    pub fn filter_opt(self, column: Column, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.filter(column, value),
            None => self,
        }
    }

    /// Validates and builds the query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] for unknown column names and for a
    /// filter on `tags`, which has no string value to compare against.
    pub fn build(self) -> Result<Query> {
        if !self.unknown.is_empty() {
            return Err(Error::InvalidQuery(format!(
                "unknown column(s): {}",
                self.unknown.join(", ")
            )));
        }

        if self.filters.get(Column::Tags).is_some() {
            return Err(Error::InvalidQuery(
                "equality filters on 'tags' are not supported".into(),
            ));
        }

        let columns = if self.columns.is_empty() {
            Column::iter().collect()
        } else {
            self.columns
        };

        Ok(Query::new(columns, self.filters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_depends_on_tags() {
        let plain = Query::builder().column(Column::S3Key).build().unwrap();
        assert!(!plain.wants_tags());
        assert_eq!(plain.page_size(), DEFAULT_PAGE_SIZE);

        let tagged = Query::builder()
            .columns([Column::S3Key, Column::Tags])
            .build()
            .unwrap();
        assert!(tagged.wants_tags());
        assert_eq!(tagged.page_size(), TAGGED_PAGE_SIZE);
    }

    #[test]
    fn no_columns_means_all_columns() {
        let query = Query::builder().build().unwrap();
        assert_eq!(query.columns().len(), 10);
        assert!(query.wants_tags());
        assert_eq!(query, Query::all());
    }

    #[test]
    fn unknown_column_names_are_rejected() {
        let err = Query::builder()
            .column_names(["icn", "bucket", "owner"])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(msg) if msg.contains("bucket, owner")));
    }

    #[test]
    fn column_names_are_deduplicated() {
        let query = Query::builder()
            .column_names(["icn", " s3_key ", "icn"])
            .build()
            .unwrap();
        assert_eq!(query.columns(), &[Column::Icn, Column::S3Key]);
    }

    #[test]
    fn tags_filter_is_rejected() {
        let result = Query::builder().filter(Column::Tags, "x").build();
        assert!(matches!(result, Err(Error::InvalidQuery(_))));
    }

    #[test]
    fn prefix_comes_from_filters() {
        let query = Query::builder()
            .filter(Column::ProviderId, "P123")
            .filter_opt(Column::Icn, Some("C456"))
            .filter_opt(Column::Filename, None::<String>)
            .build()
            .unwrap();
        assert_eq!(query.prefix().as_deref(), Some("P123/C456/"));
    }
}
