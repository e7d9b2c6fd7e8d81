//! Producer publishing student records to the students topic.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use detector_core::{Error, Result, Student};
use rskafka::client::{
    partition::{Compression, PartitionClient, UnknownTopicHandling},
    Client, ClientBuilder, Credentials, SaslConfig,
};
use rskafka::record::Record;
use telemetry::metrics;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::KafkaConfig;
use crate::partitioner::partition_for;

/// Producer routing student records by id across the topic's partitions.
pub struct Producer {
    client: Arc<Client>,
    config: KafkaConfig,
    /// Cached partition clients
    clients: RwLock<BTreeMap<i32, Arc<PartitionClient>>>,
}

impl Producer {
    /// Connects the producer to the broker.
    ///
    /// The partition count must be at least 1: records are routed by
    /// hashing the student id modulo the partition count.
    pub async fn connect(config: KafkaConfig) -> Result<Self> {
        if config.consumer.partitions < 1 {
            return Err(Error::internal("partition count must be at least 1"));
        }

        let connection = config.broker_string();
        let mut builder = ClientBuilder::new(vec![connection]);

        if let (Some(username), Some(password)) = (&config.sasl_username, &config.sasl_password) {
            builder = builder
                .tls_config(crate::connection::create_tls_config())
                .sasl_config(SaslConfig::ScramSha256(Credentials::new(
                    username.clone(),
                    password.clone(),
                )));
        }

        let client = builder
            .build()
            .await
            .map_err(|e| Error::broker(format!("failed to connect: {e}")))?;

        Ok(Self {
            client: Arc::new(client),
            config,
            clients: RwLock::new(BTreeMap::new()),
        })
    }

    /// Gets or creates the partition client for one partition.
    async fn get_client(&self, partition: i32) -> Result<Arc<PartitionClient>> {
        // Check cache first
        {
            let clients = self.clients.read().await;
            if let Some(client) = clients.get(&partition) {
                return Ok(client.clone());
            }
        }

        let partition_client = self
            .client
            .partition_client(
                self.config.topic.clone(),
                partition,
                UnknownTopicHandling::Error,
            )
            .await
            .map_err(|e| Error::feed_open(&self.config.topic, partition, e.to_string()))?;

        let partition_client = Arc::new(partition_client);

        // Cache it
        {
            let mut clients = self.clients.write().await;
            clients.insert(partition, partition_client.clone());
        }

        Ok(partition_client)
    }

    /// Sends one student record, returning the partition and offset it
    /// landed on.
    pub async fn send_student(&self, student: &Student) -> Result<(i32, i64)> {
        let payload = serde_json::to_vec(student).map_err(Error::Serialization)?;
        let partition = partition_for(&student.student_id, self.config.consumer.partitions);

        let client = self.get_client(partition).await?;

        let record = Record {
            key: Some(student.student_id.clone().into_bytes()),
            value: Some(payload),
            headers: BTreeMap::new(),
            timestamp: Utc::now(),
        };

        let offsets = client
            .produce(vec![record], Compression::NoCompression)
            .await
            .map_err(|e| {
                metrics().produce_errors.inc();
                Error::produce(e.to_string())
            })?;

        let offset = offsets.first().copied().unwrap_or(-1);
        metrics().records_produced.inc();

        debug!(
            topic = %self.config.topic,
            partition,
            offset,
            student_id = %student.student_id,
            "produced student record"
        );

        Ok((partition, offset))
    }

    pub fn config(&self) -> &KafkaConfig {
        &self.config
    }
}
