//! `bucketview query`.

use std::io::{BufWriter, Write};

use anyhow::Context;
use bucketview_table::{BucketTable, Error, Query, Row};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::TRACING_TARGET_OUTPUT;
use crate::config::QueryCommand;
use crate::signal::cancel_on_interrupt;

/// Runs the scan and prints rows that pass every filter as JSON lines.
///
/// Filters that were not pushed down into the listing prefix are applied
/// here, before the limit.
pub async fn query(cmd: QueryCommand) -> anyhow::Result<()> {
    let query = cmd.query.query()?;
    let minio = cmd.storage.minio_config()?;
    let table = BucketTable::new(cmd.table.table_config(), minio);

    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone(), cmd.query.timeout());

    let result = print_rows(&table, &query, cmd.query.limit, cancel.clone()).await;
    cancel.cancel();

    let printed = result?;
    tracing::info!(
        target: TRACING_TARGET_OUTPUT,
        table = %table.name(),
        rows = printed,
        "Query complete"
    );
    Ok(())
}

async fn print_rows<C>(
    table: &BucketTable<C>,
    query: &Query,
    limit: Option<u64>,
    cancel: CancellationToken,
) -> anyhow::Result<u64>
where
    C: bucketview_table::Connector,
{
    let mut rows = table
        .scan(query, cancel)
        .await
        .inspect_err(report_scan_error)
        .context("failed to start scan")?;

    let mut out = BufWriter::new(std::io::stdout());
    let mut printed = 0u64;
    let mut skipped = 0u64;
    let reached = |printed: u64| limit.is_some_and(|limit| printed >= limit);

    while !reached(printed)
        && let Some(row) = rows.next().await
    {
        let row = row.inspect_err(report_scan_error).context("scan failed")?;
        if !query.filters().matches(&row) {
            skipped += 1;
            continue;
        }

        write_row(&mut out, &row, query)?;
        printed += 1;
    }

    out.flush().context("failed to flush output")?;
    tracing::debug!(
        target: TRACING_TARGET_OUTPUT,
        printed,
        skipped,
        "Residual filters applied"
    );

    Ok(printed)
}

/// Logs why a scan stopped, including the storage failure behind it.
fn report_scan_error(error: &Error) {
    if error.is_cancelled() {
        tracing::warn!(
            target: TRACING_TARGET_OUTPUT,
            "Scan interrupted before the listing was exhausted"
        );
        return;
    }

    if let Some(source) = error.storage_error() {
        tracing::error!(
            target: TRACING_TARGET_OUTPUT,
            severity = ?source.severity(),
            retryable = source.is_retryable(),
            not_found = source.is_not_found(),
            error = %source,
            "Storage request failed"
        );
    }
}

fn write_row(out: &mut impl Write, row: &Row, query: &Query) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, &row.project(query.columns()))
        .context("failed to encode row")?;
    writeln!(out).context("failed to write row")
}

#[cfg(test)]
mod tests {
    use bucketview_table::Column;

    use super::*;

    #[test]
    fn rows_are_written_as_json_lines() {
        let query = Query::builder()
            .columns([Column::Icn, Column::Size])
            .build()
            .unwrap();
        let mut out = Vec::new();

        write_row(&mut out, &Row::from_key("P1/C1/a.pdf", "\"e\"", 5), &query).unwrap();
        write_row(&mut out, &Row::from_key("P1/C2/b.pdf", "\"e\"", 6), &query).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "{\"icn\":\"C1\",\"size\":\"5\"}\n{\"icn\":\"C2\",\"size\":\"6\"}\n"
        );
    }
}
