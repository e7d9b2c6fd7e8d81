//! Broker configuration.

use serde::{Deserialize, Serialize};

/// Broker configuration shared by the consumer and producer binaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    /// Broker addresses
    #[serde(default = "default_brokers")]
    pub brokers: Vec<String>,
    /// Topic carrying student monitoring records
    #[serde(default = "default_topic")]
    pub topic: String,
    /// SASL username (for cloud authentication)
    #[serde(default)]
    pub sasl_username: Option<String>,
    /// SASL password (for cloud authentication)
    #[serde(default)]
    pub sasl_password: Option<String>,
    #[serde(default)]
    pub consumer: ConsumerConfig,
}

/// Consumption-run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerConfig {
    /// Number of topic partitions, one worker per partition
    #[serde(default = "default_partitions")]
    pub partitions: i32,
    /// Expected number of messages for one run (the shared budget)
    #[serde(default = "default_expected_messages")]
    pub expected_messages: u64,
    /// Sleep hours at or below this value count as deprivation
    #[serde(default = "default_deprivation_threshold")]
    pub deprivation_threshold: f32,
    /// Maximum wait per fetch before the broker returns an empty batch
    #[serde(default = "default_fetch_max_wait_ms")]
    pub fetch_max_wait_ms: i32,
    /// Upper bound on bytes fetched per request
    #[serde(default = "default_fetch_max_bytes")]
    pub fetch_max_bytes: i32,
}

fn default_brokers() -> Vec<String> {
    vec!["broker:9092".to_string(), "broker:29092".to_string()]
}

fn default_topic() -> String {
    "students".to_string()
}

fn default_partitions() -> i32 {
    20
}

fn default_expected_messages() -> u64 {
    15000
}

fn default_deprivation_threshold() -> f32 {
    6.0
}

fn default_fetch_max_wait_ms() -> i32 {
    500
}

fn default_fetch_max_bytes() -> i32 {
    1024 * 1024
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: default_brokers(),
            topic: default_topic(),
            sasl_username: None,
            sasl_password: None,
            consumer: ConsumerConfig::default(),
        }
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            partitions: default_partitions(),
            expected_messages: default_expected_messages(),
            deprivation_threshold: default_deprivation_threshold(),
            fetch_max_wait_ms: default_fetch_max_wait_ms(),
            fetch_max_bytes: default_fetch_max_bytes(),
        }
    }
}

impl KafkaConfig {
    /// Returns the broker list as a comma-separated string.
    pub fn broker_string(&self) -> String {
        self.brokers.join(",")
    }
}
