use crate::chunker::Chunk;
use crate::sink::ChunkSink;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Running delivery counters, reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    /// Chunks handed to the sink (`succeeded + failed`)
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,

    /// Chunks still queued or in flight when the run was cancelled
    pub dropped: u64,
}

/// Drains the chunk channel into the sink until the channel closes
///
/// Chunks are delivered one at a time in the order they were queued, so a
/// page's chunks reach the sink in position order. A failed delivery is logged
/// and counted; the next chunk is still attempted. Cancellation stops delivery
/// immediately, abandoning the request in flight and everything still queued.
pub async fn run_delivery(
    sink: Arc<dyn ChunkSink>,
    mut rx: mpsc::Receiver<Chunk>,
    delay: Duration,
    cancel: CancellationToken,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    loop {
        let chunk = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = rx.recv() => match next {
                Some(chunk) => chunk,
                None => return report,
            },
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                report.dropped += 1;
                break;
            }
            result = sink.deliver(&chunk) => result,
        };

        report.attempted += 1;
        match result {
            Ok(()) => {
                report.succeeded += 1;
                tracing::trace!(url = %chunk.source_url, position = chunk.position, "Chunk delivered");
            }
            Err(e) => {
                report.failed += 1;
                tracing::warn!(
                    url = %chunk.source_url,
                    position = chunk.position,
                    error = %e,
                    "Chunk delivery failed"
                );
            }
        }

        if !delay.is_zero() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    rx.close();
    while rx.try_recv().is_ok() {
        report.dropped += 1;
    }

    tracing::info!(dropped = report.dropped, "Delivery cancelled");
    report
}
