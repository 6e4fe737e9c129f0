//! Pipeline error taxonomy.

use thiserror::Error;

/// Top-level error type for the metrics pipeline.
///
/// None of these variants is fatal to a running process: emitter errors are
/// swallowed after logging, and aggregator errors either drop the offending
/// message or trigger the reconnect loop.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The broker cannot be reached for connecting or publishing.
    #[error("broker unavailable: {0}")]
    BrokerUnavailable(String),

    /// A consumed payload failed to deserialize or is missing required
    /// fields. The message is dropped without retry.
    #[error("malformed event on topic '{topic}': {reason}")]
    MalformedEvent {
        /// Topic the message arrived on.
        topic: String,
        /// Why deserialization was rejected.
        reason: String,
    },

    /// Business-logic or storage error while applying a valid event.
    /// The message is dropped without retry or dead-letter.
    #[error("handler failure: {0}")]
    HandlerFailure(String),

    /// The aggregator's subscription dropped mid-stream. Triggers the
    /// fixed-delay reconnect loop.
    #[error("broker connection lost: {0}")]
    ConnectionLost(String),
}

impl PipelineError {
    /// Wraps any displayable error as a `HandlerFailure`.
    pub fn handler(err: impl std::fmt::Display) -> Self {
        Self::HandlerFailure(err.to_string())
    }

    /// Builds a `MalformedEvent` for the given topic.
    pub fn malformed(topic: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::MalformedEvent {
            topic: topic.into(),
            reason: reason.to_string(),
        }
    }
}
