//! The degradable fire-and-forget emitter.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use bloomshop_core::envelope::Envelope;
use bloomshop_core::error::PipelineError;
use bloomshop_core::producer::BrokerProducer;

use crate::kafka::KafkaProducer;

/// Emitter configuration.
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// Comma-separated broker addresses.
    pub bootstrap_servers: String,
    /// Deadline for the initial reachability probe in `start`.
    pub connect_timeout: Duration,
    /// Deadline for each publish round-trip.
    pub delivery_timeout: Duration,
}

impl EmitterConfig {
    /// Creates a config with the default 5-second timeouts.
    #[must_use]
    pub fn new(bootstrap_servers: impl Into<String>) -> Self {
        Self {
            bootstrap_servers: bootstrap_servers.into(),
            connect_timeout: Duration::from_secs(5),
            delivery_timeout: Duration::from_secs(5),
        }
    }
}

/// Best-effort publisher of event envelopes.
///
/// A failed `start` leaves the emitter *degraded*: `send` becomes a logged
/// no-op until the hosting process restarts. There is no background
/// reconnect; the hosting service's availability never depends on the
/// broker's.
pub struct EventEmitter {
    config: EmitterConfig,
    producer: RwLock<Option<Arc<dyn BrokerProducer>>>,
}

impl EventEmitter {
    /// Creates a degraded emitter. No I/O happens until `start`.
    #[must_use]
    pub fn new(config: EmitterConfig) -> Self {
        Self {
            config,
            producer: RwLock::new(None),
        }
    }

    /// Creates an emitter already attached to the given producer.
    /// Used by tests and by services that manage their own broker client.
    #[must_use]
    pub fn with_producer(producer: Arc<dyn BrokerProducer>) -> Self {
        Self {
            config: EmitterConfig::new("injected"),
            producer: RwLock::new(Some(producer)),
        }
    }

    /// Establishes the broker connection.
    ///
    /// On failure the emitter logs a warning and stays degraded — it never
    /// raises, retries, or blocks service startup.
    pub async fn start(&self) {
        match KafkaProducer::connect(&self.config).await {
            Ok(producer) => {
                *self.producer.write().await = Some(Arc::new(producer));
                tracing::info!(
                    servers = %self.config.bootstrap_servers,
                    "event emitter started"
                );
            }
            Err(err) => {
                tracing::warn!(
                    servers = %self.config.bootstrap_servers,
                    error = %err,
                    "failed to connect to broker; events will not be published until restart"
                );
            }
        }
    }

    /// Gracefully closes the connection if one is open. Idempotent.
    pub async fn stop(&self) {
        if let Some(producer) = self.producer.write().await.take() {
            producer.close().await;
            tracing::info!("event emitter stopped");
        }
    }

    /// Returns true when no live broker connection is held.
    pub async fn is_degraded(&self) -> bool {
        self.producer.read().await.is_none()
    }

    /// Fire-and-forget publish. Never returns an error: a degraded emitter
    /// drops the event at debug level, and transport failures are logged
    /// and swallowed.
    pub async fn send(&self, topic: &str, envelope: &Envelope) {
        if self.is_degraded().await {
            tracing::debug!(
                topic,
                event_type = %envelope.event_type,
                "emitter degraded; dropping event"
            );
            return;
        }
        match self.try_publish(topic, envelope).await {
            Ok(()) => {
                tracing::debug!(
                    topic,
                    event_type = %envelope.event_type,
                    "event published"
                );
            }
            Err(err) => {
                tracing::warn!(topic, error = %err, "failed to publish event");
            }
        }
    }

    /// The fallible publish path behind `send`, exposed so callers and
    /// tests can distinguish failure kinds.
    ///
    /// # Errors
    ///
    /// Returns `BrokerUnavailable` when degraded or when the transport
    /// rejects the publish, and `MalformedEvent` if the envelope does not
    /// serialize.
    pub async fn try_publish(&self, topic: &str, envelope: &Envelope) -> Result<(), PipelineError> {
        let producer = self
            .producer
            .read()
            .await
            .clone()
            .ok_or_else(|| PipelineError::BrokerUnavailable("no broker connection".into()))?;
        let payload = envelope
            .to_bytes()
            .map_err(|err| PipelineError::malformed(topic, err))?;
        producer.publish(topic, &payload).await
    }
}
