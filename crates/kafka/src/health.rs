//! Broker health checks.

use rskafka::client::ClientBuilder;
use tracing::{debug, error};

use crate::config::KafkaConfig;

/// Check broker connection health.
pub async fn check_connection(config: &KafkaConfig) -> bool {
    let connection = config.broker_string();

    match ClientBuilder::new(vec![connection]).build().await {
        Ok(client) => match client.list_topics().await {
            Ok(topics) => {
                debug!(topics = topics.len(), "broker connection healthy");
                true
            }
            Err(e) => {
                error!("failed to list topics: {e}");
                false
            }
        },
        Err(e) => {
            error!("failed to connect to broker: {e}");
            false
        }
    }
}

/// Returns true when the configured topic exists on the broker.
pub async fn topic_exists(config: &KafkaConfig) -> bool {
    let connection = config.broker_string();

    match ClientBuilder::new(vec![connection]).build().await {
        Ok(client) => match client.list_topics().await {
            Ok(topics) => topics.iter().any(|t| t.name == config.topic),
            Err(_) => false,
        },
        Err(_) => false,
    }
}
