//! Bloomshop Core — shared pipeline abstractions.
//!
//! This crate defines the event envelope, topic names, error taxonomy, and
//! the broker/clock seams that both the producer side (emitter) and the
//! consumer side (aggregator) depend on. It contains no infrastructure code.

pub mod clock;
pub mod envelope;
pub mod error;
pub mod producer;
pub mod topics;
