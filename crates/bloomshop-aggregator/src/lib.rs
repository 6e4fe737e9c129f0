//! Bloomshop Aggregator — durable consumption of business events.
//!
//! A single cooperative consumer per process instance: messages are pulled
//! off the broker one at a time under a named consumer group, dispatched to
//! per-event-type handlers, and committed as progress markers. Delivery is
//! at-least-once; a crash between the aggregate commit and the offset commit
//! redelivers and double-counts, and no deduplication guards against that.

pub mod consumer;
pub mod dispatch;
pub mod handlers;

pub use consumer::{AggregatorConfig, AggregatorLoop, ConsumerState, RECONNECT_DELAY};
