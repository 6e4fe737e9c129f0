//! Bloomshop Emitter — best-effort event publishing.
//!
//! Every producer-side service embeds one [`EventEmitter`], constructed at
//! startup and passed by reference to the request handlers that publish
//! events. The emitter never fails or blocks the caller's own business
//! operation: when the broker is unreachable it degrades to a logged no-op.

mod emitter;
pub mod kafka;

pub use emitter::{EmitterConfig, EventEmitter};
