use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::pool::NumberPool;
use super::scheduler::Draw;

/// Background draw loop: draw, publish, sleep, until cancelled or the pool runs dry.
///
/// Publishing waits for room in the single-slot channel, so the loop can never
/// run ahead of its consumer. A number drawn but not yet handed over when
/// cancellation arrives goes back into the pool. `exhausted` is shared by every
/// task of one run so the end marker is delivered once.
pub(super) async fn run_draws(
    pool: Arc<NumberPool>,
    sender: mpsc::Sender<Draw>,
    cancel: CancellationToken,
    interval: Duration,
    exhausted: Arc<AtomicBool>,
) {
    debug!(interval_ms = interval.as_millis() as u64, "Draw task started");

    loop {
        if cancel.is_cancelled() {
            debug!("Draw task cancelled");
            return;
        }

        let number = match pool.draw() {
            Ok(number) => number,
            Err(_) => {
                announce_exhausted(&sender, &cancel, &exhausted).await;
                return;
            }
        };

        if !publish(&sender, &cancel, Draw::Number(number)).await {
            pool.restore(number);
            debug!(number = number, "Draw task stopped before publishing, number returned");
            return;
        }

        if pool.is_empty() {
            announce_exhausted(&sender, &cancel, &exhausted).await;
            return;
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Draw task cancelled while waiting");
                return;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

/// Publishes the end marker unless an earlier task of this run already did
async fn announce_exhausted(
    sender: &mpsc::Sender<Draw>,
    cancel: &CancellationToken,
    exhausted: &AtomicBool,
) {
    if exhausted.load(Ordering::SeqCst) {
        debug!("Pool already announced as exhausted");
        return;
    }

    if publish(sender, cancel, Draw::Exhausted).await {
        exhausted.store(true, Ordering::SeqCst);
        info!("All numbers drawn");
    }
}

/// Returns false if cancelled first or the stream has no consumer left
async fn publish(sender: &mpsc::Sender<Draw>, cancel: &CancellationToken, draw: Draw) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        sent = sender.send(draw) => sent.is_ok(),
    }
}
