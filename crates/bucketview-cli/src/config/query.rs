//! Filters, output columns and limits of a query.

use std::time::Duration;

use anyhow::Context;
use bucketview_table::{Column, Query};
use clap::Args;

use crate::TRACING_TARGET_CONFIG;

/// Equality filters, one option per key column.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Only rows of this healthcare provider.
    #[arg(long)]
    pub provider_id: Option<String>,

    /// Only rows of this claim.
    #[arg(long)]
    pub icn: Option<String>,

    /// Only rows of this file.
    #[arg(long)]
    pub filename: Option<String>,

    /// Only rows uploaded by this pipeline task.
    #[arg(long)]
    pub process: Option<String>,

    /// Only rows produced by this intermediate task.
    #[arg(long)]
    pub sub_process: Option<String>,

    /// Only rows of this derived file.
    #[arg(long)]
    pub sub_file: Option<String>,
}

/// What to select and how long to wait for it.
#[derive(Debug, Clone, Args)]
pub struct QueryArgs {
    #[clap(flatten)]
    pub filters: FilterArgs,

    /// Comma separated output columns; all columns when omitted.
    #[arg(long, value_delimiter = ',', env = "BUCKETVIEW_COLUMNS")]
    pub columns: Vec<String>,

    /// Stop after printing this many rows.
    #[arg(long)]
    pub limit: Option<u64>,

    /// Cancel the scan after this many seconds.
    #[arg(long, env = "BUCKETVIEW_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

impl QueryArgs {
    /// Builds the table query.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown column names.
    pub fn query(&self) -> anyhow::Result<Query> {
        let filters = &self.filters;
        Query::builder()
            .column_names(&self.columns)
            .filter_opt(Column::ProviderId, filters.provider_id.as_deref())
            .filter_opt(Column::Icn, filters.icn.as_deref())
            .filter_opt(Column::Filename, filters.filename.as_deref())
            .filter_opt(Column::Process, filters.process.as_deref())
            .filter_opt(Column::SubProcess, filters.sub_process.as_deref())
            .filter_opt(Column::SubFile, filters.sub_file.as_deref())
            .build()
            .context("invalid query")
    }

    /// Scan deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            filters = ?self.filters,
            columns = ?self.columns,
            limit = ?self.limit,
            timeout_secs = ?self.timeout_secs,
            "Query configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(columns: &[&str], filters: FilterArgs) -> QueryArgs {
        QueryArgs {
            filters,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            limit: None,
            timeout_secs: None,
        }
    }

    #[test]
    fn filters_map_to_columns() {
        let filters = FilterArgs {
            provider_id: Some("P1".into()),
            icn: Some("C1".into()),
            sub_file: Some("out".into()),
            ..Default::default()
        };
        let query = args(&["s3_key"], filters).query().unwrap();

        assert_eq!(query.prefix().as_deref(), Some("P1/C1/"));
        assert_eq!(query.filters().get(Column::SubFile), Some("out"));
        assert_eq!(query.columns(), &[Column::S3Key]);
        assert!(!query.wants_tags());
    }

    #[test]
    fn unknown_column_fails() {
        assert!(args(&["nope"], FilterArgs::default()).query().is_err());
    }
}
