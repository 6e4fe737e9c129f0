//! Shared application state.

use std::sync::Arc;

use bloomshop_core::clock::Clock;
use sqlx::PgPool;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Time source for "today" boundaries.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(db_pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { db_pool, clock }
    }
}
