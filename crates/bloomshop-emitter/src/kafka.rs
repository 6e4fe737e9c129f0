//! Kafka-backed `BrokerProducer` implementation.

use async_trait::async_trait;
use rdkafka::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;

use bloomshop_core::error::PipelineError;
use bloomshop_core::producer::BrokerProducer;

use crate::emitter::EmitterConfig;

/// Producer handle over an rdkafka `FutureProducer`.
///
/// Safe for concurrent use: rdkafka producers are internally synchronized
/// and cheap to clone.
#[derive(Clone)]
pub struct KafkaProducer {
    inner: FutureProducer,
    delivery_timeout: std::time::Duration,
}

impl KafkaProducer {
    /// Builds the producer and probes broker reachability.
    ///
    /// Client construction alone performs no network I/O, so a bounded
    /// metadata fetch verifies the broker is actually there before the
    /// emitter reports itself connected.
    ///
    /// # Errors
    ///
    /// Returns `BrokerUnavailable` when the client cannot be built or the
    /// broker does not answer within `connect_timeout`.
    pub async fn connect(config: &EmitterConfig) -> Result<Self, PipelineError> {
        let inner: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set(
                "message.timeout.ms",
                config.delivery_timeout.as_millis().to_string(),
            )
            .create()
            .map_err(|err| PipelineError::BrokerUnavailable(err.to_string()))?;

        let probe = inner.clone();
        let timeout = config.connect_timeout;
        tokio::task::spawn_blocking(move || {
            probe.client().fetch_metadata(None, timeout).map(|_| ())
        })
        .await
        .map_err(|err| PipelineError::BrokerUnavailable(err.to_string()))?
        .map_err(|err| PipelineError::BrokerUnavailable(err.to_string()))?;

        Ok(Self {
            inner,
            delivery_timeout: config.delivery_timeout,
        })
    }
}

#[async_trait]
impl BrokerProducer for KafkaProducer {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PipelineError> {
        // No partition key: events carry their ids in the payload and the
        // aggregator does not rely on cross-topic ordering.
        let record = FutureRecord::<str, [u8]>::to(topic).payload(payload);
        self.inner
            .send(record, Timeout::After(self.delivery_timeout))
            .await
            .map(|_| ())
            .map_err(|(err, _message)| PipelineError::BrokerUnavailable(err.to_string()))
    }

    async fn close(&self) {
        let producer = self.inner.clone();
        let timeout = self.delivery_timeout;
        match tokio::task::spawn_blocking(move || producer.flush(Timeout::After(timeout))).await {
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "error flushing producer on close");
            }
            Err(err) => {
                tracing::warn!(error = %err, "flush task failed on close");
            }
            Ok(Ok(())) => {}
        }
    }
}
