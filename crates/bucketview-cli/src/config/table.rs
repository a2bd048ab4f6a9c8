//! Which bucket backs the table.

use bucketview_table::TableConfig;
use clap::Args;

use crate::TRACING_TARGET_CONFIG;

/// Table identity.
#[derive(Debug, Clone, Args)]
pub struct TableArgs {
    /// Bucket exposed as the table.
    #[arg(long, env = "BUCKETVIEW_BUCKET")]
    pub bucket: String,

    /// Table name; defaults to the bucket name.
    #[arg(long, env = "BUCKETVIEW_TABLE_NAME")]
    pub table_name: Option<String>,
}

impl TableArgs {
    /// Builds the table configuration.
    pub fn table_config(&self) -> TableConfig {
        let config = TableConfig::new(&self.bucket);
        match &self.table_name {
            Some(name) => config.with_table_name(name),
            None => config,
        }
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            bucket = %self.bucket,
            table = ?self.table_name,
            "Table configuration"
        );
    }
}
