//! Students dataset producer.
//!
//! Loads the student monitoring CSV, shuffles it deterministically, and
//! publishes every record to the students topic as JSON.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{error, info};

use detector_core::dataset::{load_students, shuffle_students};
use kafka::{KafkaConfig, Producer};
use telemetry::{init_tracing_from_env, metrics};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default)]
    kafka: KafkaConfig,

    /// Students CSV filename
    #[serde(default = "default_students_file")]
    students_file: String,

    /// Shuffle seed for reproducible runs
    #[serde(default)]
    shuffle_seed: u64,

    /// Grace period for the broker to come up (docker-compose ordering)
    #[serde(default = "default_startup_delay_secs")]
    startup_delay_secs: u64,
}

fn default_students_file() -> String {
    "student_monitoring_data.csv".to_string()
}

fn default_startup_delay_secs() -> u64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kafka: KafkaConfig::default(),
            students_file: default_students_file(),
            shuffle_seed: 0,
            startup_delay_secs: default_startup_delay_secs(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // rustls 0.23+ requires explicit crypto provider selection
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    dotenvy::dotenv().ok();

    init_tracing_from_env();

    let config = load_config()?;

    info!(
        brokers = ?config.kafka.brokers,
        topic = %config.kafka.topic,
        file = %config.students_file,
        seed = config.shuffle_seed,
        "student producer started"
    );

    let mut students =
        load_students(&config.students_file).context("Failed to load students file")?;
    shuffle_students(&mut students, config.shuffle_seed);
    info!(count = students.len(), "students dataset loaded");

    // Wait for the broker to start
    if config.startup_delay_secs > 0 {
        info!(secs = config.startup_delay_secs, "waiting for broker");
        tokio::time::sleep(Duration::from_secs(config.startup_delay_secs)).await;
    }

    if !kafka::health::topic_exists(&config.kafka).await {
        error!(topic = %config.kafka.topic, "topic not found on broker");
    }

    let producer = Producer::connect(config.kafka.clone())
        .await
        .context("Failed to create producer")?;

    let start = Instant::now();

    for student in &students {
        match producer.send_student(student).await {
            Ok((partition, offset)) => {
                info!(
                    topic = %config.kafka.topic,
                    partition,
                    offset,
                    student_id = %student.student_id,
                    "student is sent"
                );
            }
            Err(e) => {
                // Per-record failures are logged and skipped
                error!(student_id = %student.student_id, error = %e, "failed to send student");
            }
        }
    }

    let snapshot = metrics().snapshot();
    info!(
        produced = snapshot.records_produced,
        errors = snapshot.produce_errors,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "producer finished"
    );

    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        .add_source(config::Config::try_from(&Config::default())?)
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
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
    if let Ok(brokers) = std::env::var("SLEEPWATCH_KAFKA_BROKERS") {
        config.kafka.brokers = brokers.split(',').map(|s| s.trim().to_string()).collect();
    }
    if let Ok(topic) = std::env::var("SLEEPWATCH_KAFKA_TOPIC") {
        config.kafka.topic = topic;
    }
    if let Ok(file) = std::env::var("SLEEPWATCH_STUDENTS_FILE") {
        config.students_file = file;
    }
    if let Ok(seed) = std::env::var("SLEEPWATCH_SHUFFLE_SEED") {
        config.shuffle_seed = seed
            .parse()
            .context("SLEEPWATCH_SHUFFLE_SEED must be an integer")?;
    }

    Ok(config)
}
