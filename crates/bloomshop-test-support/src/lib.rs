//! Shared test mocks and fixtures for the Bloomshop metrics pipeline.

mod clock;
mod events;
mod producer;

pub use clock::FixedClock;
pub use events::{order_created_message, product_view_message};
pub use producer::{FailingProducer, RecordingProducer};
