//! Bloomshop Analytics — the dashboard query layer.
//!
//! Read-only aggregate queries over the store the aggregator maintains.
//! Results are eventually consistent with the event stream.

pub mod queries;
pub mod window;
