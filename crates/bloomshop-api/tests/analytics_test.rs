//! Integration tests for the analytics endpoints.

mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Local, Utc};
use sqlx::PgPool;

async fn seed_order(pool: &PgPool, order_id: i64, total_amount: f64, created_at: DateTime<Utc>) {
    sqlx::query(
        "INSERT INTO order_metrics \
         (order_id, user_id, total_amount, items_count, delivery_type, created_at) \
         VALUES ($1, 42, $2, 1, 'courier', $3)",
    )
    .bind(order_id)
    .bind(total_amount)
    .bind(created_at)
    .execute(pool)
    .await
    .unwrap();
}

async fn seed_popular(pool: &PgPool, product_id: i64, view_count: i64, order_count: i64) {
    sqlx::query(
        "INSERT INTO popular_products \
         (product_id, product_name, view_count, order_count, last_updated) \
         VALUES ($1, 'Product', $2, $3, NOW())",
    )
    .bind(product_id)
    .bind(view_count)
    .bind(order_count)
    .execute(pool)
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_dashboard_on_empty_store_returns_zeros(pool: PgPool) {
    let app = common::build_test_app(pool);

    let (status, json) = common::get_json(app, "/analytics/dashboard").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_orders"], 0);
    assert_eq!(json["avg_order_value"], 0.0);
    assert_eq!(json["orders_today"], 0);
    assert!(json["popular_by_views"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_dashboard_aggregates_orders_and_embeds_top_lists(pool: PgPool) {
    seed_order(&pool, 1, 10.0, Utc::now()).await;
    seed_order(&pool, 2, 30.0, Utc::now()).await;
    seed_popular(&pool, 1, 5, 2).await;
    let app = common::build_test_app(pool);

    let (status, json) = common::get_json(app, "/analytics/dashboard").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_orders"], 2);
    assert_eq!(json["total_revenue"], 40.0);
    assert_eq!(json["avg_order_value"], 20.0);
    assert_eq!(json["popular_by_views"][0]["product_id"], 1);
    assert_eq!(json["popular_by_orders"][0]["order_count"], 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_popular_views_caps_at_ten(pool: PgPool) {
    for product_id in 1..=12 {
        seed_popular(&pool, product_id, product_id * 10, 0).await;
    }
    let app = common::build_test_app(pool);

    let (status, json) = common::get_json(app, "/analytics/popular/views").await;

    assert_eq!(status, StatusCode::OK);
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[0]["view_count"], 120);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_orders_listing_filters_by_date_window(pool: PgPool) {
    let now = Utc::now();
    seed_order(&pool, 1, 10.0, now - Duration::days(10)).await;
    seed_order(&pool, 2, 20.0, now).await;
    let app = common::build_test_app(pool);

    let from = (now - Duration::days(3))
        .with_timezone(&Local)
        .format("%Y-%m-%d")
        .to_string();
    let to = now.with_timezone(&Local).format("%Y-%m-%d").to_string();
    let (status, json) = common::get_json(app, &format!("/analytics/orders?from={from}&to={to}")).await;

    assert_eq!(status, StatusCode::OK);
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["order_id"], 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_orders_listing_rejects_unparseable_dates(pool: PgPool) {
    let app = common::build_test_app(pool);

    let (status, _json) = common::get_json(app, "/analytics/orders?from=yesterday").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
