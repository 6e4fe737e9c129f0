//! Test producers — mock `BrokerProducer` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use bloomshop_core::error::PipelineError;
use bloomshop_core::producer::BrokerProducer;

/// A broker producer that records every publish and always succeeds.
#[derive(Debug, Default)]
pub struct RecordingProducer {
    published: Mutex<Vec<(String, Vec<u8>)>>,
    closed: Mutex<bool>,
}

impl RecordingProducer {
    /// Creates a new recording producer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all `(topic, payload)` pairs published so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn published(&self) -> Vec<(String, Vec<u8>)> {
        self.published.lock().unwrap().clone()
    }

    /// Returns whether `close` was called.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap()
    }
}

#[async_trait]
impl BrokerProducer for RecordingProducer {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PipelineError> {
        self.published
            .lock()
            .unwrap()
            .push((topic.to_owned(), payload.to_vec()));
        Ok(())
    }

    async fn close(&self) {
        *self.closed.lock().unwrap() = true;
    }
}

/// A broker producer whose every publish fails with `BrokerUnavailable`.
/// Useful for exercising the emitter's swallow-and-log path.
#[derive(Debug)]
pub struct FailingProducer;

#[async_trait]
impl BrokerProducer for FailingProducer {
    async fn publish(&self, _topic: &str, _payload: &[u8]) -> Result<(), PipelineError> {
        Err(PipelineError::BrokerUnavailable(
            "connection refused".into(),
        ))
    }

    async fn close(&self) {}
}
