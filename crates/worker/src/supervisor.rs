//! Run supervision: one worker per partition, one completion watcher.

use std::sync::Arc;
use std::time::{Duration, Instant};

use detector_core::Result;
use kafka::FeedOpener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::countdown::Countdown;
use crate::partition::PartitionWorker;

/// Configuration for one consumption run.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub topic: String,
    pub partitions: i32,
    pub expected_messages: u64,
    pub deprivation_threshold: f32,
}

/// Summary of a completed run.
#[derive(Debug)]
pub struct RunReport {
    pub partitions: i32,
    pub expected_messages: u64,
    pub elapsed: Duration,
}

/// Orchestrates one bounded consumption run.
pub struct Supervisor {
    config: SupervisorConfig,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self { config }
    }

    /// Runs to completion: opens every partition feed, starts the watcher
    /// and all workers, and joins them.
    ///
    /// Every feed is opened before any worker starts, so a single open
    /// failure aborts the whole run with no message classified — a partial
    /// worker set would under-count the budget and never finish.
    pub async fn run(&self, connection: &dyn FeedOpener) -> Result<RunReport> {
        if self.config.partitions < 1 {
            return Err(detector_core::Error::internal(
                "partition count must be at least 1",
            ));
        }

        let start = Instant::now();

        info!(
            topic = %self.config.topic,
            partitions = self.config.partitions,
            expected_messages = self.config.expected_messages,
            "consumption run starting"
        );

        let mut feeds = Vec::with_capacity(self.config.partitions as usize);
        for partition in 0..self.config.partitions {
            feeds.push(connection.open_feed(&self.config.topic, partition).await?);
        }

        let countdown = Arc::new(Countdown::new(self.config.expected_messages));
        let stop = CancellationToken::new();

        // Watcher: waits for the budget to hit zero, then fires the stop
        // signal exactly once. Also exits if the run is aborted by a
        // worker before the budget runs out.
        let watcher = {
            let countdown = countdown.clone();
            let stop = stop.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = countdown.completed() => {
                        info!("message budget exhausted, stopping workers");
                        stop.cancel();
                    }
                    _ = stop.cancelled() => {}
                }
            })
        };

        let mut handles = Vec::with_capacity(feeds.len());
        for feed in feeds {
            let worker = PartitionWorker::new(
                feed,
                countdown.clone(),
                stop.clone(),
                self.config.deprivation_threshold,
            );
            handles.push(tokio::spawn(worker.run()));
        }

        let mut first_error = None;
        for handle in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => first_error = first_error.or(Some(e)),
                Err(e) => {
                    first_error = first_error
                        .or_else(|| Some(detector_core::Error::internal(format!("worker task failed: {e}"))))
                }
            }
        }

        watcher
            .await
            .map_err(|e| detector_core::Error::internal(format!("watcher task failed: {e}")))?;

        if let Some(e) = first_error {
            return Err(e);
        }

        let report = RunReport {
            partitions: self.config.partitions,
            expected_messages: self.config.expected_messages,
            elapsed: start.elapsed(),
        };

        info!(
            partitions = report.partitions,
            expected_messages = report.expected_messages,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "all students are processed"
        );

        Ok(report)
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }
}
