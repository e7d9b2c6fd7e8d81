//! Per-partition consumption worker.

use std::sync::Arc;

use detector_core::detect_sleep_deprivation;
use kafka::MessageFeed;
use telemetry::metrics;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::countdown::Countdown;

/// Worker owning one partition's message feed.
///
/// Races the stop signal against message arrival on every iteration; a
/// worker already past its stop check may classify one in-flight message
/// after the signal fires, which is the accepted overshoot.
pub struct PartitionWorker {
    partition: i32,
    feed: Box<dyn MessageFeed>,
    countdown: Arc<Countdown>,
    stop: CancellationToken,
    threshold: f32,
}

impl PartitionWorker {
    pub fn new(
        feed: Box<dyn MessageFeed>,
        countdown: Arc<Countdown>,
        stop: CancellationToken,
        threshold: f32,
    ) -> Self {
        Self {
            partition: feed.partition(),
            feed,
            countdown,
            stop,
            threshold,
        }
    }

    /// Consumes until the stop signal fires.
    ///
    /// The feed is owned by the worker and dropped (released) on every
    /// exit path. A broker-level feed failure is fatal for the whole run:
    /// the worker fires the stop signal so its siblings exit too, and the
    /// error propagates out of the supervisor.
    pub async fn run(mut self) -> detector_core::Result<()> {
        metrics().active_workers.inc();
        info!(partition = self.partition, "partition worker started");

        let result = loop {
            // Biased: the stop check runs first on every iteration so the
            // signal is never observed with lower priority than message
            // arrival.
            tokio::select! {
                biased;
                _ = self.stop.cancelled() => break Ok(()),
                message = self.feed.next() => match message {
                    Ok(message) => {
                        // The worker watches the value it drove the
                        // countdown to itself: a saturated feed resolves
                        // immediately and the watcher task may not get
                        // scheduled for many iterations, so waiting for
                        // the stop signal alone would let every worker
                        // keep draining past the exhausted budget. This
                        // keeps overshoot within one message per
                        // partition.
                        if self.handle(&message.payload, message.offset) <= 0 {
                            break Ok(());
                        }
                    }
                    Err(e) => {
                        error!(partition = self.partition, error = %e, "feed failed");
                        self.stop.cancel();
                        break Err(e);
                    }
                },
            }
        };

        metrics().active_workers.dec();
        info!(partition = self.partition, "partition worker stopped");
        result
    }

    /// Counts one received message, then classifies it.
    ///
    /// The decrement happens before classification and regardless of the
    /// decode outcome: the message was received, so it spends budget even
    /// when it produces no verdict. Returns the remaining budget after
    /// this message so the caller can stop on exhaustion.
    fn handle(&self, payload: &[u8], offset: i64) -> i64 {
        let remaining = self.countdown.decrement();
        metrics().messages_consumed.inc();

        match detect_sleep_deprivation(payload, self.threshold) {
            Ok(true) => {
                metrics().deprivation_detected.inc();
                warn!(
                    partition = self.partition,
                    offset, "student may be sleep deprived"
                );
            }
            Ok(false) => {
                metrics().adequate_rest.inc();
                info!(partition = self.partition, offset, "student got enough sleep");
            }
            Err(e) => {
                metrics().decode_errors.inc();
                error!(
                    partition = self.partition,
                    offset,
                    error = %e,
                    "failed to classify message"
                );
            }
        }

        remaining
    }
}
