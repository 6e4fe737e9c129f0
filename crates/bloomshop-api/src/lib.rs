//! Bloomshop API — HTTP surface of the metrics pipeline.
//!
//! Exposes the liveness probe and the read-only analytics endpoints. The
//! binary in `main.rs` additionally runs the aggregator loop next to the
//! server.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
