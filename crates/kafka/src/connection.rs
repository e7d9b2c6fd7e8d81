//! Shared broker connection.

use std::sync::Arc;

use async_trait::async_trait;
use detector_core::{Error, Result};
use rskafka::client::{
    partition::{OffsetAt, UnknownTopicHandling},
    Client, ClientBuilder, Credentials, SaslConfig,
};
use tracing::info;

use crate::config::KafkaConfig;
use crate::feed::{FeedOpener, MessageFeed, PartitionFeed};

/// Creates a TLS configuration for hosted brokers.
pub(crate) fn create_tls_config() -> Arc<rustls::ClientConfig> {
    let root_store =
        rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Arc::new(config)
}

/// One shared broker connection for the duration of a run.
///
/// Each worker opens its own partition-scoped feed from it; feed creation
/// is safe to call concurrently. The underlying client closes on drop.
pub struct Connection {
    client: Arc<Client>,
    config: KafkaConfig,
}

impl Connection {
    /// Connects to the broker. Failure here is fatal for the whole run.
    pub async fn connect(config: KafkaConfig) -> Result<Self> {
        let connection = config.broker_string();
        let mut builder = ClientBuilder::new(vec![connection]);

        // Add TLS and SASL auth if credentials provided (for hosted brokers)
        if let (Some(username), Some(password)) = (&config.sasl_username, &config.sasl_password) {
            builder = builder
                .tls_config(create_tls_config())
                .sasl_config(SaslConfig::ScramSha256(Credentials::new(
                    username.clone(),
                    password.clone(),
                )));
        }

        let client = builder
            .build()
            .await
            .map_err(|e| Error::broker(format!("failed to connect: {e}")))?;

        info!(brokers = %config.broker_string(), "connected to broker");

        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    pub fn config(&self) -> &KafkaConfig {
        &self.config
    }
}

#[async_trait]
impl FeedOpener for Connection {
    async fn open_feed(&self, topic: &str, partition: i32) -> Result<Box<dyn MessageFeed>> {
        let partition_client = self
            .client
            .partition_client(topic.to_string(), partition, UnknownTopicHandling::Error)
            .await
            .map_err(|e| Error::feed_open(topic, partition, e.to_string()))?;

        let partition_client = Arc::new(partition_client);

        // Oldest-offset start, no offset tracking or commit
        let start_offset = partition_client
            .get_offset(OffsetAt::Earliest)
            .await
            .map_err(|e| Error::feed_open(topic, partition, e.to_string()))?;

        info!(topic, partition, offset = start_offset, "opened partition feed");

        Ok(Box::new(PartitionFeed::new(
            partition_client,
            partition,
            start_offset,
            self.config.consumer.fetch_max_wait_ms,
            self.config.consumer.fetch_max_bytes,
        )))
    }
}
