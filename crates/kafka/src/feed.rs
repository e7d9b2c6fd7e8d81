//! Per-partition message feeds.
//!
//! A feed yields one message at a time from a single partition, starting at
//! the earliest offset. The `MessageFeed`/`FeedOpener` traits are the seam
//! the worker crate consumes; tests swap in in-memory implementations.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use detector_core::{Error, Result};
use rskafka::client::partition::PartitionClient;
use tracing::{debug, warn};

/// One message pulled from a partition feed.
#[derive(Debug, Clone)]
pub struct Message {
    pub partition: i32,
    pub offset: i64,
    pub payload: Vec<u8>,
}

/// A suspending per-partition message source.
#[async_trait]
pub trait MessageFeed: Send {
    /// The partition this feed is bound to.
    fn partition(&self) -> i32;

    /// Waits for and returns the next message.
    ///
    /// Cancel-safe: a dropped `next()` call must not lose messages.
    async fn next(&mut self) -> Result<Message>;
}

/// Opens per-partition feeds from a shared broker connection.
///
/// Must support concurrent feed creation across partitions.
#[async_trait]
pub trait FeedOpener: Send + Sync {
    async fn open_feed(&self, topic: &str, partition: i32) -> Result<Box<dyn MessageFeed>>;
}

/// A partition feed backed by an rskafka partition client.
///
/// Fetches are batched under the hood; `next()` drains an internal buffer
/// and long-polls the broker when it runs dry. The read position only
/// advances once a fetch has landed in the buffer, so cancelling a pending
/// `next()` re-fetches the same records on the following call.
pub struct PartitionFeed {
    client: Arc<PartitionClient>,
    partition: i32,
    next_offset: i64,
    max_wait_ms: i32,
    max_bytes: i32,
    buffer: VecDeque<Message>,
}

impl PartitionFeed {
    pub(crate) fn new(
        client: Arc<PartitionClient>,
        partition: i32,
        start_offset: i64,
        max_wait_ms: i32,
        max_bytes: i32,
    ) -> Self {
        Self {
            client,
            partition,
            next_offset: start_offset,
            max_wait_ms,
            max_bytes,
            buffer: VecDeque::new(),
        }
    }

    /// Long-polls the broker once and moves any fetched records into the
    /// buffer. An expired poll with no records is not an error.
    async fn refill(&mut self) -> Result<()> {
        let (records, high_watermark) = self
            .client
            .fetch_records(self.next_offset, 1..self.max_bytes, self.max_wait_ms)
            .await
            .map_err(|e| Error::broker(format!("fetch failed: {e}")))?;

        if records.is_empty() {
            return Ok(());
        }

        debug!(
            partition = self.partition,
            count = records.len(),
            offset_start = self.next_offset,
            high_watermark,
            "fetched records"
        );

        for record in records {
            self.next_offset = self.next_offset.max(record.offset + 1);

            match record.record.value {
                Some(payload) => self.buffer.push_back(Message {
                    partition: self.partition,
                    offset: record.offset,
                    payload,
                }),
                None => warn!(
                    partition = self.partition,
                    offset = record.offset,
                    "skipping record with empty value"
                ),
            }
        }

        Ok(())
    }
}

#[async_trait]
impl MessageFeed for PartitionFeed {
    fn partition(&self) -> i32 {
        self.partition
    }

    async fn next(&mut self) -> Result<Message> {
        loop {
            if let Some(message) = self.buffer.pop_front() {
                return Ok(message);
            }
            self.refill().await?;
        }
    }
}
