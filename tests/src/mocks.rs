//! Mock implementations for testing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use detector_core::{Error, Result};
use kafka::{FeedOpener, Message, MessageFeed};
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// In-memory partition feed fed from an unbounded channel.
///
/// Implements the same `MessageFeed` trait as the real `PartitionFeed`,
/// so worker and supervisor code paths run unchanged without a broker.
/// When the channel is exhausted the feed stays quiet forever, like an
/// idle partition.
pub struct MockFeed {
    partition: i32,
    next_offset: i64,
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
}

#[async_trait]
impl MessageFeed for MockFeed {
    fn partition(&self) -> i32 {
        self.partition
    }

    async fn next(&mut self) -> Result<Message> {
        match self.rx.recv().await {
            Some(payload) => {
                let offset = self.next_offset;
                self.next_offset += 1;
                Ok(Message {
                    partition: self.partition,
                    offset,
                    payload,
                })
            }
            // Sender dropped: behave like a partition with no more
            // traffic rather than erroring out.
            None => std::future::pending().await,
        }
    }
}

/// Mock broker connection handing out [`MockFeed`]s.
pub struct MockConnection {
    feeds: Mutex<HashMap<i32, mpsc::UnboundedReceiver<Vec<u8>>>>,
    fail_partitions: HashSet<i32>,
    opened: Arc<Mutex<Vec<i32>>>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            feeds: Mutex::new(HashMap::new()),
            fail_partitions: HashSet::new(),
            opened: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Registers a feed for `partition` and returns the sender that
    /// delivers its messages.
    pub fn feed_sender(&self, partition: i32) -> mpsc::UnboundedSender<Vec<u8>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.feeds.lock().insert(partition, rx);
        tx
    }

    /// Makes `open_feed` fail for the given partition.
    pub fn fail_partition(mut self, partition: i32) -> Self {
        self.fail_partitions.insert(partition);
        self
    }

    /// Partitions for which a feed open was attempted, in order.
    pub fn opened_partitions(&self) -> Vec<i32> {
        self.opened.lock().clone()
    }
}

impl Default for MockConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedOpener for MockConnection {
    async fn open_feed(&self, topic: &str, partition: i32) -> Result<Box<dyn MessageFeed>> {
        self.opened.lock().push(partition);

        if self.fail_partitions.contains(&partition) {
            return Err(Error::feed_open(topic, partition, "injected open failure"));
        }

        // Unregistered partitions get a permanently quiet feed.
        let rx = self.feeds.lock().remove(&partition).unwrap_or_else(|| {
            let (_tx, rx) = mpsc::unbounded_channel();
            rx
        });

        Ok(Box::new(MockFeed {
            partition,
            next_offset: 0,
            rx,
        }))
    }
}
