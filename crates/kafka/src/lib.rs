//! Kafka-compatible broker client for the detector.
//!
//! Wraps rskafka with the pieces this system needs: one shared connection,
//! per-partition message feeds starting at the earliest offset, and a
//! producer that routes records by student id.

pub mod config;
pub mod connection;
pub mod feed;
pub mod health;
pub mod partitioner;
pub mod producer;

pub use config::*;
pub use connection::Connection;
pub use feed::{FeedOpener, Message, MessageFeed, PartitionFeed};
pub use producer::Producer;
