//! Unified error types for the detector.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the detector.
#[derive(Debug, Error)]
pub enum Error {
    /// Message payload could not be decoded into a student record.
    /// Recoverable: the worker logs it and moves to the next message.
    #[error("failed to decode student record: {0}")]
    Decode(#[source] serde_json::Error),

    /// Broker connection failure. Fatal for the whole run.
    #[error("broker error: {0}")]
    Broker(String),

    /// A per-partition feed could not be opened. Fatal for the whole run:
    /// a missing worker would under-count messages and the budget would
    /// never reach zero.
    #[error("failed to open feed for topic {topic} partition {partition}: {message}")]
    FeedOpen {
        topic: String,
        partition: i32,
        message: String,
    },

    /// Failure while producing a record to the broker.
    #[error("failed to produce record: {0}")]
    Produce(String),

    /// Failure while loading the students dataset.
    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a broker error.
    pub fn broker(msg: impl Into<String>) -> Self {
        Self::Broker(msg.into())
    }

    /// Create a feed-open error for one partition.
    pub fn feed_open(topic: impl Into<String>, partition: i32, msg: impl Into<String>) -> Self {
        Self::FeedOpen {
            topic: topic.into(),
            partition,
            message: msg.into(),
        }
    }

    pub fn produce(msg: impl Into<String>) -> Self {
        Self::Produce(msg.into())
    }

    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True when the error only affects a single message and the
    /// consuming loop should continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Self::Dataset(e.to_string())
    }
}
