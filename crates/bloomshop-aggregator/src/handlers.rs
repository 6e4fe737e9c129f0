//! Per-event-type aggregation handlers.
//!
//! Each handler runs as a single transaction: one fact insert plus the
//! aggregate upserts, committed or rolled back together. Upserts do their
//! arithmetic in the database so concurrent aggregator instances in the
//! same group cannot lose updates on a shared `product_id`.

use sqlx::{PgPool, Postgres, Transaction};

use bloomshop_core::clock::Clock;
use bloomshop_core::envelope::{OrderCreatedPayload, ProductViewPayload};
use bloomshop_core::error::PipelineError;

/// Which counter an upsert bumps.
#[derive(Debug, Clone, Copy)]
enum Counter {
    Views,
    Orders,
}

/// Applies a `product_view` event: append the view fact, then bump the
/// product's view counter.
///
/// # Errors
///
/// Returns `HandlerFailure` on any storage error; the transaction is rolled
/// back and the event's data is lost (no retry).
pub async fn handle_product_view(
    pool: &PgPool,
    clock: &dyn Clock,
    event: &ProductViewPayload,
) -> Result<(), PipelineError> {
    let now = clock.now();
    let mut tx = pool.begin().await.map_err(PipelineError::handler)?;

    sqlx::query("INSERT INTO product_views (product_id, user_id, viewed_at) VALUES ($1, $2, $3)")
        .bind(event.product_id)
        .bind(event.user_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(PipelineError::handler)?;

    bump_popular_product(
        &mut tx,
        event.product_id,
        &event.product_name,
        Counter::Views,
        now,
    )
    .await?;

    tx.commit().await.map_err(PipelineError::handler)?;
    Ok(())
}

/// Applies an `order_created` event: append the order fact, then bump the
/// order counter of every product named in the line items.
///
/// The increment is 1 per distinct line item regardless of that line's
/// quantity. Preserved source behavior.
///
/// # Errors
///
/// Returns `HandlerFailure` on any storage error; the transaction is rolled
/// back and the event's data is lost (no retry).
pub async fn handle_order_created(
    pool: &PgPool,
    clock: &dyn Clock,
    event: &OrderCreatedPayload,
) -> Result<(), PipelineError> {
    let now = clock.now();
    let mut tx = pool.begin().await.map_err(PipelineError::handler)?;

    sqlx::query(
        "INSERT INTO order_metrics \
         (order_id, user_id, total_amount, items_count, delivery_type, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(event.order_id)
    .bind(event.user_id)
    .bind(event.total_amount)
    .bind(event.items_count)
    .bind(&event.delivery_type)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(PipelineError::handler)?;

    for item in &event.items {
        bump_popular_product(&mut tx, item.product_id, &item.product_name, Counter::Orders, now)
            .await?;
    }

    tx.commit().await.map_err(PipelineError::handler)?;
    Ok(())
}

/// Atomic increment-or-insert on `popular_products`.
///
/// The insert path seeds the bumped counter at 1 and the other at 0; the
/// update path keeps the stored `product_name` and refreshes `last_updated`.
async fn bump_popular_product(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i64,
    product_name: &str,
    counter: Counter,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(), PipelineError> {
    let sql = match counter {
        Counter::Views => {
            "INSERT INTO popular_products \
             (product_id, product_name, view_count, order_count, last_updated) \
             VALUES ($1, $2, 1, 0, $3) \
             ON CONFLICT (product_id) DO UPDATE \
             SET view_count = popular_products.view_count + 1, \
                 last_updated = EXCLUDED.last_updated"
        }
        Counter::Orders => {
            "INSERT INTO popular_products \
             (product_id, product_name, view_count, order_count, last_updated) \
             VALUES ($1, $2, 0, 1, $3) \
             ON CONFLICT (product_id) DO UPDATE \
             SET order_count = popular_products.order_count + 1, \
                 last_updated = EXCLUDED.last_updated"
        }
    };

    sqlx::query(sql)
        .bind(product_id)
        .bind(product_name)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(PipelineError::handler)?;
    Ok(())
}
