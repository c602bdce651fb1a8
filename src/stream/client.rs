use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

/// Push-channel configuration
#[derive(Clone, Debug, Deserialize)]
pub struct StreamConfig {
    #[serde(default = "default_url")]
    pub url: String,
    /// Subject the upstream routing service publishes update messages on
    #[serde(default = "default_subject")]
    pub subject: String,
}

fn default_url() -> String {
    std::env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string())
}

fn default_subject() -> String {
    "egress.updates".to_string()
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            subject: default_subject(),
        }
    }
}

/// NATS connection to the upstream routing service.
///
/// Plain core pub/sub: updates are authoritative full snapshots, so a missed
/// message is superseded by the next one and nothing needs replay.
pub struct StreamClient {
    client: async_nats::Client,
    config: StreamConfig,
}

impl StreamClient {
    /// Connect to the upstream channel
    pub async fn connect(config: StreamConfig) -> Result<Self> {
        info!("Connecting to upstream channel at {}", config.url);

        let client = async_nats::connect(&config.url)
            .await
            .context("Failed to connect to NATS")?;

        Ok(Self { client, config })
    }

    pub fn client(&self) -> &async_nats::Client {
        &self.client
    }

    pub fn subject(&self) -> &str {
        &self.config.subject
    }
}
