//! Broker producer abstraction.
//!
//! The emitter talks to the broker exclusively through this trait so that
//! its degradation behavior can be tested without a running broker.

use async_trait::async_trait;

use crate::error::PipelineError;

/// A live connection capable of publishing raw payloads to a topic.
///
/// Implementations must be safe for concurrent use by many in-flight sends.
#[async_trait]
pub trait BrokerProducer: Send + Sync {
    /// Publish `payload` to `topic`, waiting for broker acknowledgment
    /// within the implementation's bounded timeout.
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PipelineError>;

    /// Flush outstanding deliveries and release the connection. Idempotent.
    async fn close(&self);
}
