//! `bucketview schema`.

use std::io::Write;

use anyhow::Context;
use bucketview_table::TableSchema;

use crate::config::SchemaCommand;

/// Prints the table schema as pretty JSON on stdout.
pub fn schema(cmd: SchemaCommand) -> anyhow::Result<()> {
    let config = cmd.table.table_config();
    let schema = TableSchema::new(config.table_name());

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &schema).context("failed to encode schema")?;
    writeln!(stdout).context("failed to write schema")?;
    Ok(())
}
