//! Integration tests for dispatch and the aggregation handlers.

use bloomshop_aggregator::dispatch::dispatch;
use bloomshop_core::error::PipelineError;
use bloomshop_core::topics;
use bloomshop_test_support::{FixedClock, order_created_message, product_view_message};
use chrono::{TimeZone, Utc};
use sqlx::PgPool;

fn clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap())
}

async fn view_count(pool: &PgPool, product_id: i64) -> i64 {
    sqlx::query_scalar("SELECT view_count FROM popular_products WHERE product_id = $1")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn order_count(pool: &PgPool, product_id: i64) -> i64 {
    sqlx::query_scalar("SELECT order_count FROM popular_products WHERE product_id = $1")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn popular_rows(pool: &PgPool, product_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM popular_products WHERE product_id = $1")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_n_views_yield_view_count_n(pool: PgPool) {
    let clock = clock();
    for _ in 0..4 {
        dispatch(
            &pool,
            &clock,
            topics::PRODUCT_VIEWS,
            &product_view_message(1, "Rose", Some(42)),
        )
        .await
        .unwrap();
    }

    assert_eq!(view_count(&pool, 1).await, 4);

    let facts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_views")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(facts, 4);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_redelivered_duplicate_counts_again(pool: PgPool) {
    // At-least-once without deduplication: a redelivered message bumps the
    // counter a second time. Intentional-until-changed behavior.
    let clock = clock();
    let message = product_view_message(5, "Tulip", None);

    dispatch(&pool, &clock, topics::PRODUCT_VIEWS, &message)
        .await
        .unwrap();
    dispatch(&pool, &clock, topics::PRODUCT_VIEWS, &message)
        .await
        .unwrap();

    assert_eq!(view_count(&pool, 5).await, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_view_then_order_leaves_one_popular_row(pool: PgPool) {
    let clock = clock();
    dispatch(
        &pool,
        &clock,
        topics::PRODUCT_VIEWS,
        &product_view_message(3, "Lily", None),
    )
    .await
    .unwrap();
    dispatch(
        &pool,
        &clock,
        topics::ORDER_EVENTS,
        &order_created_message(10, 42, 25.0, "courier", &[(3, "Lily", 1)]),
    )
    .await
    .unwrap();

    assert_eq!(popular_rows(&pool, 3).await, 1);
    assert_eq!(view_count(&pool, 3).await, 1);
    assert_eq!(order_count(&pool, 3).await, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_order_then_view_leaves_one_popular_row(pool: PgPool) {
    let clock = clock();
    dispatch(
        &pool,
        &clock,
        topics::ORDER_EVENTS,
        &order_created_message(11, 42, 25.0, "pickup", &[(4, "Orchid", 2)]),
    )
    .await
    .unwrap();
    dispatch(
        &pool,
        &clock,
        topics::PRODUCT_VIEWS,
        &product_view_message(4, "Orchid", Some(42)),
    )
    .await
    .unwrap();

    assert_eq!(popular_rows(&pool, 4).await, 1);
    assert_eq!(view_count(&pool, 4).await, 1);
    assert_eq!(order_count(&pool, 4).await, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_quantity_does_not_scale_the_order_increment(pool: PgPool) {
    let clock = clock();
    dispatch(
        &pool,
        &clock,
        topics::ORDER_EVENTS,
        &order_created_message(12, 42, 99.0, "courier", &[(1, "Rose", 5)]),
    )
    .await
    .unwrap();

    assert_eq!(order_count(&pool, 1).await, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_each_line_item_bumps_its_own_product(pool: PgPool) {
    let clock = clock();
    dispatch(
        &pool,
        &clock,
        topics::ORDER_EVENTS,
        &order_created_message(13, 42, 60.0, "courier", &[(1, "Rose", 3), (2, "Tulip", 1)]),
    )
    .await
    .unwrap();

    assert_eq!(order_count(&pool, 1).await, 1);
    assert_eq!(order_count(&pool, 2).await, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_order_event_appends_order_metric_fact(pool: PgPool) {
    let clock = clock();
    dispatch(
        &pool,
        &clock,
        topics::ORDER_EVENTS,
        &order_created_message(20, 7, 45.5, "pickup", &[(1, "Rose", 1)]),
    )
    .await
    .unwrap();

    let (order_id, user_id, total_amount, delivery_type): (i64, i64, f64, String) =
        sqlx::query_as(
            "SELECT order_id, user_id, total_amount, delivery_type FROM order_metrics",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(order_id, 20);
    assert_eq!(user_id, 7);
    assert!((total_amount - 45.5).abs() < f64::EPSILON);
    assert_eq!(delivery_type, "pickup");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_missing_product_name_defaults_to_unknown(pool: PgPool) {
    let clock = clock();
    let message =
        serde_json::to_vec(&serde_json::json!({"event_type": "product_view", "product_id": 9}))
            .unwrap();

    dispatch(&pool, &clock, topics::PRODUCT_VIEWS, &message)
        .await
        .unwrap();

    let name: String =
        sqlx::query_scalar("SELECT product_name FROM popular_products WHERE product_id = 9")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(name, "Unknown");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_malformed_view_leaves_no_rows_behind(pool: PgPool) {
    let clock = clock();
    let message = serde_json::to_vec(&serde_json::json!({"event_type": "product_view"})).unwrap();

    let err = dispatch(&pool, &clock, topics::PRODUCT_VIEWS, &message)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::MalformedEvent { .. }));
    let facts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_views")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(facts, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_event_type_routes_even_on_unexpected_topic(pool: PgPool) {
    // The consumer routes by topic *or* embedded event_type, matching what
    // producers actually send.
    let clock = clock();
    dispatch(
        &pool,
        &clock,
        "legacy_topic",
        &product_view_message(8, "Peony", None),
    )
    .await
    .unwrap();

    assert_eq!(view_count(&pool, 8).await, 1);
}
