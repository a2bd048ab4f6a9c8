//! Consumers of scanned rows.

use tokio::sync::mpsc;

use crate::row::Row;
use crate::{Error, Result};

/// Accepts rows one at a time.
///
/// The scan waits for `accept` to return before producing the next row, so a
/// slow sink slows the listing down.
#[async_trait::async_trait]
pub trait RowSink: Send {
    /// Takes ownership of one row.
    async fn accept(&mut self, row: Row) -> Result<()>;
}

#[async_trait::async_trait]
impl RowSink for Vec<Row> {
    async fn accept(&mut self, row: Row) -> Result<()> {
        self.push(row);
        Ok(())
    }
}

#[async_trait::async_trait]
impl RowSink for mpsc::Sender<Row> {
    async fn accept(&mut self, row: Row) -> Result<()> {
        self.send(row)
            .await
            .map_err(|_| Error::Sink("receiver dropped".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_sink_reports_closed_receiver() {
        let (mut tx, rx) = mpsc::channel(1);
        tx.accept(Row::from_key("a", "\"e\"", 1)).await.unwrap();
        drop(rx);

        let err = tx.accept(Row::from_key("b", "\"e\"", 1)).await.unwrap_err();
        assert!(matches!(err, Error::Sink(_)));
    }
}
