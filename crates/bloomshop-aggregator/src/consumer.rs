//! The aggregator loop: connection lifecycle and per-message protocol.

use std::sync::Arc;
use std::time::Duration;

use rdkafka::ClientConfig;
use rdkafka::Message;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::BorrowedMessage;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use bloomshop_core::clock::Clock;
use bloomshop_core::error::PipelineError;
use bloomshop_core::topics;

use crate::dispatch::dispatch;

/// Fixed delay between reconnect attempts after a connection loss.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Lifecycle states of the consumer.
///
/// `Disconnected → Connecting → Subscribed ⇄ Processing`, with any
/// connection loss dropping back to `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    /// No broker connection; the loop is idle or waiting out the delay.
    Disconnected,
    /// Building the consumer and subscribing.
    Connecting,
    /// Subscribed and waiting for the next message.
    Subscribed,
    /// A message is being handled.
    Processing,
}

impl ConsumerState {
    /// Whether `next` is a legal successor of this state.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        // Connection loss may strike from anywhere.
        if next == Self::Disconnected {
            return true;
        }
        matches!(
            (self, next),
            (Self::Disconnected, Self::Connecting)
                | (Self::Connecting | Self::Processing, Self::Subscribed)
                | (Self::Subscribed, Self::Processing)
        )
    }
}

/// Tracks the current state and logs every change.
#[derive(Debug)]
struct StateTracker {
    current: ConsumerState,
}

impl StateTracker {
    fn new() -> Self {
        Self {
            current: ConsumerState::Disconnected,
        }
    }

    fn transition(&mut self, next: ConsumerState) {
        if next == self.current {
            return;
        }
        debug_assert!(self.current.can_transition_to(next));
        tracing::debug!(from = ?self.current, to = ?next, "consumer state changed");
        self.current = next;
    }
}

/// Aggregator connection settings.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Comma-separated broker addresses.
    pub bootstrap_servers: String,
    /// Consumer group shared by all aggregator instances.
    pub consumer_group: String,
}

impl AggregatorConfig {
    /// Creates a config using the default consumer group.
    #[must_use]
    pub fn new(bootstrap_servers: impl Into<String>) -> Self {
        Self {
            bootstrap_servers: bootstrap_servers.into(),
            consumer_group: topics::CONSUMER_GROUP.to_owned(),
        }
    }
}

/// Long-running subscriber that folds business events into the aggregate
/// store. One message is in flight at any instant within an instance;
/// horizontal scale comes from more instances in the same group.
pub struct AggregatorLoop {
    pool: PgPool,
    clock: Arc<dyn Clock>,
    config: AggregatorConfig,
}

impl AggregatorLoop {
    /// Creates the loop. No I/O happens until `run`.
    #[must_use]
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>, config: AggregatorConfig) -> Self {
        Self {
            pool,
            clock,
            config,
        }
    }

    /// Runs until `cancel` is triggered. Reconnects forever on connection
    /// loss after the fixed delay; finishes and commits any in-flight
    /// message before returning.
    pub async fn run(self, cancel: CancellationToken) {
        let mut state = StateTracker::new();

        loop {
            if cancel.is_cancelled() {
                break;
            }
            state.transition(ConsumerState::Connecting);

            match self.consume_until_error(&cancel, &mut state).await {
                Ok(()) => break,
                Err(err) => {
                    state.transition(ConsumerState::Disconnected);
                    tracing::warn!(
                        error = %err,
                        delay_secs = RECONNECT_DELAY.as_secs(),
                        "consumer connection error; reconnecting after delay"
                    );
                }
            }

            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(RECONNECT_DELAY) => {}
            }
        }

        state.transition(ConsumerState::Disconnected);
        tracing::info!("aggregator loop stopped");
    }

    /// One connection's lifetime: subscribe, then process messages until
    /// the broker errors out (`Err`) or shutdown is requested (`Ok`).
    async fn consume_until_error(
        &self,
        cancel: &CancellationToken,
        state: &mut StateTracker,
    ) -> Result<(), PipelineError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &self.config.bootstrap_servers)
            .set("group.id", &self.config.consumer_group)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "false")
            .set("enable.partition.eof", "false")
            .create()
            .map_err(|err| PipelineError::ConnectionLost(err.to_string()))?;

        consumer
            .subscribe(topics::AGGREGATED_TOPICS)
            .map_err(|err| PipelineError::ConnectionLost(err.to_string()))?;

        state.transition(ConsumerState::Subscribed);
        tracing::info!(
            topics = ?topics::AGGREGATED_TOPICS,
            group = %self.config.consumer_group,
            "consumer subscribed"
        );

        loop {
            let message = tokio::select! {
                () = cancel.cancelled() => return Ok(()),
                received = consumer.recv() => {
                    received.map_err(|err| PipelineError::ConnectionLost(err.to_string()))?
                }
            };

            state.transition(ConsumerState::Processing);
            self.process(&consumer, &message).await;
            state.transition(ConsumerState::Subscribed);
        }
    }

    /// Handles one message and advances the offset. Offsets move regardless
    /// of handler outcome: failed messages are dropped, not retried or
    /// dead-lettered.
    async fn process(&self, consumer: &StreamConsumer, message: &BorrowedMessage<'_>) {
        let topic = message.topic();
        let Some(payload) = message.payload() else {
            tracing::warn!(topic, offset = message.offset(), "empty message; dropping");
            self.commit(consumer, message);
            return;
        };

        match dispatch(&self.pool, self.clock.as_ref(), topic, payload).await {
            Ok(()) => {
                tracing::debug!(topic, offset = message.offset(), "message processed");
            }
            Err(err @ PipelineError::MalformedEvent { .. }) => {
                tracing::warn!(topic, offset = message.offset(), error = %err, "dropping malformed message");
            }
            Err(err) => {
                tracing::error!(topic, offset = message.offset(), error = %err, "handler failed; message dropped");
            }
        }

        self.commit(consumer, message);
    }

    fn commit(&self, consumer: &StreamConsumer, message: &BorrowedMessage<'_>) {
        if let Err(err) = consumer.commit_message(message, CommitMode::Async) {
            tracing::warn!(error = %err, "failed to commit offset");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_lifecycle_transitions_are_legal() {
        assert!(ConsumerState::Disconnected.can_transition_to(ConsumerState::Connecting));
        assert!(ConsumerState::Connecting.can_transition_to(ConsumerState::Subscribed));
        assert!(ConsumerState::Subscribed.can_transition_to(ConsumerState::Processing));
        assert!(ConsumerState::Processing.can_transition_to(ConsumerState::Subscribed));
    }

    #[test]
    fn test_connection_loss_is_legal_from_every_state() {
        for state in [
            ConsumerState::Disconnected,
            ConsumerState::Connecting,
            ConsumerState::Subscribed,
            ConsumerState::Processing,
        ] {
            assert!(state.can_transition_to(ConsumerState::Disconnected));
        }
    }

    #[test]
    fn test_shortcut_transitions_are_illegal() {
        assert!(!ConsumerState::Disconnected.can_transition_to(ConsumerState::Subscribed));
        assert!(!ConsumerState::Disconnected.can_transition_to(ConsumerState::Processing));
        assert!(!ConsumerState::Connecting.can_transition_to(ConsumerState::Processing));
        assert!(!ConsumerState::Processing.can_transition_to(ConsumerState::Connecting));
    }

    #[test]
    fn test_reconnect_delay_is_five_seconds() {
        assert_eq!(RECONNECT_DELAY, Duration::from_secs(5));
    }
}
