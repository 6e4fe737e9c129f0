//! Aggregate queries backing the dashboard.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;
use sqlx::prelude::FromRow;

use bloomshop_core::clock::Clock;

use crate::window;

/// How many products the top-N queries return.
pub const TOP_N: i64 = 10;

/// One row of the `popular_products` aggregate.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PopularProductRow {
    /// Catalog identifier; unique within the aggregate.
    pub product_id: i64,
    /// Display name captured from the first event that created the row.
    pub product_name: String,
    /// Number of view events processed for this product.
    pub view_count: i64,
    /// Number of order line items processed for this product.
    pub order_count: i64,
    /// Last time either counter was bumped.
    pub last_updated: DateTime<Utc>,
}

/// One order fact record.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderMetricRow {
    /// Identifier of the order.
    pub order_id: i64,
    /// Identifier of the ordering user.
    pub user_id: i64,
    /// Order total.
    pub total_amount: f64,
    /// Number of line items as reported by the producer.
    pub items_count: i32,
    /// Delivery method.
    pub delivery_type: String,
    /// When the aggregator recorded the order.
    pub created_at: DateTime<Utc>,
}

/// Aggregated dashboard metrics.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    /// Count of all order fact records.
    pub total_orders: i64,
    /// Sum of all order totals.
    pub total_revenue: f64,
    /// `total_revenue / total_orders`, rounded to cents; 0 with no orders.
    pub avg_order_value: f64,
    /// Orders recorded since local midnight.
    pub orders_today: i64,
    /// Top products by view count.
    pub popular_by_views: Vec<PopularProductRow>,
    /// Top products by order count.
    pub popular_by_orders: Vec<PopularProductRow>,
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes the full dashboard summary.
///
/// # Errors
///
/// Returns the underlying `sqlx::Error` on storage failure.
pub async fn dashboard_summary(
    pool: &PgPool,
    clock: &dyn Clock,
) -> Result<DashboardSummary, sqlx::Error> {
    let (total_orders, total_revenue): (i64, f64) =
        sqlx::query_as("SELECT COUNT(id), COALESCE(SUM(total_amount), 0.0) FROM order_metrics")
            .fetch_one(pool)
            .await?;

    #[allow(clippy::cast_precision_loss)]
    let avg_order_value = if total_orders > 0 {
        round_to_cents(total_revenue / total_orders as f64)
    } else {
        0.0
    };

    let today_start = window::local_day_start(clock.now());
    let orders_today: i64 =
        sqlx::query_scalar("SELECT COUNT(id) FROM order_metrics WHERE created_at >= $1")
            .bind(today_start)
            .fetch_one(pool)
            .await?;

    Ok(DashboardSummary {
        total_orders,
        total_revenue,
        avg_order_value,
        orders_today,
        popular_by_views: top_by_views(pool).await?,
        popular_by_orders: top_by_orders(pool).await?,
    })
}

/// Top products by view count, descending. Ties break on ascending
/// `product_id` so pagination stays deterministic.
///
/// # Errors
///
/// Returns the underlying `sqlx::Error` on storage failure.
pub async fn top_by_views(pool: &PgPool) -> Result<Vec<PopularProductRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT product_id, product_name, view_count, order_count, last_updated \
         FROM popular_products \
         ORDER BY view_count DESC, product_id ASC \
         LIMIT $1",
    )
    .bind(TOP_N)
    .fetch_all(pool)
    .await
}

/// Top products by order count, descending, with the same tie-break.
///
/// # Errors
///
/// Returns the underlying `sqlx::Error` on storage failure.
pub async fn top_by_orders(pool: &PgPool) -> Result<Vec<PopularProductRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT product_id, product_name, view_count, order_count, last_updated \
         FROM popular_products \
         ORDER BY order_count DESC, product_id ASC \
         LIMIT $1",
    )
    .bind(TOP_N)
    .fetch_all(pool)
    .await
}

/// Lists order facts, newest first, optionally bounded to the inclusive
/// `[from 00:00:00, to 23:59:59]` local-time window.
///
/// # Errors
///
/// Returns the underlying `sqlx::Error` on storage failure.
pub async fn order_metrics(
    pool: &PgPool,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<OrderMetricRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT order_id, user_id, total_amount, items_count, delivery_type, created_at \
         FROM order_metrics \
         WHERE ($1::timestamptz IS NULL OR created_at >= $1) \
           AND ($2::timestamptz IS NULL OR created_at <= $2) \
         ORDER BY created_at DESC",
    )
    .bind(from.map(window::day_start))
    .bind(to.map(window::day_end))
    .fetch_all(pool)
    .await
}
