//! Sleep deprivation detector.
//!
//! Consumes the students topic across all partitions in parallel and
//! classifies every record against the sleep-hours threshold, stopping
//! once the expected number of messages has been seen.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use kafka::{Connection, KafkaConfig};
use telemetry::{init_tracing_from_env, metrics};
use worker::{Supervisor, SupervisorConfig};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default)]
    kafka: KafkaConfig,

    /// Grace period for the broker to come up (docker-compose ordering)
    #[serde(default = "default_startup_delay_secs")]
    startup_delay_secs: u64,
}

fn default_startup_delay_secs() -> u64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kafka: KafkaConfig::default(),
            startup_delay_secs: default_startup_delay_secs(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider BEFORE any TLS operations
    // rustls 0.23+ requires explicit crypto provider selection
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    let config = load_config()?;

    info!(
        brokers = ?config.kafka.brokers,
        topic = %config.kafka.topic,
        partitions = config.kafka.consumer.partitions,
        expected_messages = config.kafka.consumer.expected_messages,
        threshold = config.kafka.consumer.deprivation_threshold,
        "sleep deprivation detector started"
    );

    // Wait for the broker to start
    if config.startup_delay_secs > 0 {
        info!(secs = config.startup_delay_secs, "waiting for broker");
        tokio::time::sleep(Duration::from_secs(config.startup_delay_secs)).await;
    }

    if !kafka::health::check_connection(&config.kafka).await {
        warn!("broker health check failed, connecting anyway");
    }

    let connection = Connection::connect(config.kafka.clone())
        .await
        .context("Failed to connect to broker")?;

    let supervisor = Supervisor::new(SupervisorConfig {
        topic: config.kafka.topic.clone(),
        partitions: config.kafka.consumer.partitions,
        expected_messages: config.kafka.consumer.expected_messages,
        deprivation_threshold: config.kafka.consumer.deprivation_threshold,
    });

    let report = supervisor
        .run(&connection)
        .await
        .context("Consumption run failed")?;

    let snapshot = metrics().snapshot();
    info!(
        elapsed_ms = report.elapsed.as_millis() as u64,
        consumed = snapshot.messages_consumed,
        deprived = snapshot.deprivation_detected,
        rested = snapshot.adequate_rest,
        decode_errors = snapshot.decode_errors,
        "run complete"
    );

    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("SLEEPWATCH")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for nested Kafka config from environment
    // The config crate's nested parsing doesn't work reliably with underscored field names
    if let Ok(brokers) = std::env::var("SLEEPWATCH_KAFKA_BROKERS") {
        config.kafka.brokers = brokers.split(',').map(|s| s.trim().to_string()).collect();
    }
    if let Ok(topic) = std::env::var("SLEEPWATCH_KAFKA_TOPIC") {
        config.kafka.topic = topic;
    }
    if let Ok(username) = std::env::var("SLEEPWATCH_KAFKA_SASL_USERNAME") {
        config.kafka.sasl_username = Some(username);
    }
    if let Ok(password) = std::env::var("SLEEPWATCH_KAFKA_SASL_PASSWORD") {
        config.kafka.sasl_password = Some(password);
    }
    if let Ok(partitions) = std::env::var("SLEEPWATCH_KAFKA_PARTITIONS") {
        config.kafka.consumer.partitions = partitions
            .parse()
            .context("SLEEPWATCH_KAFKA_PARTITIONS must be an integer")?;
    }
    if let Ok(messages) = std::env::var("SLEEPWATCH_KAFKA_EXPECTED_MESSAGES") {
        config.kafka.consumer.expected_messages = messages
            .parse()
            .context("SLEEPWATCH_KAFKA_EXPECTED_MESSAGES must be an integer")?;
    }
    if let Ok(threshold) = std::env::var("SLEEPWATCH_DEPRIVATION_THRESHOLD") {
        config.kafka.consumer.deprivation_threshold = threshold
            .parse()
            .context("SLEEPWATCH_DEPRIVATION_THRESHOLD must be a number")?;
    }

    Ok(config)
}
