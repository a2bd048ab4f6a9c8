//! Scan cancellation on Ctrl-C or deadline.

use std::time::Duration;

use tokio::signal::ctrl_c;
use tokio_util::sync::CancellationToken;

use crate::TRACING_TARGET_SHUTDOWN;

/// Cancels `cancel` on Ctrl-C or once `deadline` has passed.
///
/// The watcher exits quietly when `cancel` fires for another reason.
pub fn cancel_on_interrupt(cancel: CancellationToken, deadline: Option<Duration>) {
    tokio::spawn(async move {
        let timeout = async {
            match deadline {
                Some(deadline) => tokio::time::sleep(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            () = cancel.cancelled() => return,
            result = ctrl_c() => match result {
                Ok(()) => tracing::info!(
                    target: TRACING_TARGET_SHUTDOWN,
                    "Received Ctrl+C signal, cancelling scan"
                ),
                Err(e) => {
                    tracing::error!(
                        target: TRACING_TARGET_SHUTDOWN,
                        error = %e,
                        "Failed to install Ctrl+C handler"
                    );
                    return;
                }
            },
            () = timeout => tracing::warn!(
                target: TRACING_TARGET_SHUTDOWN,
                timeout_secs = deadline.map(|d| d.as_secs()),
                "Scan deadline reached, cancelling scan"
            ),
        }

        cancel.cancel();
    });
}
