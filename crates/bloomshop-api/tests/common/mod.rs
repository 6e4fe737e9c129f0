//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use bloomshop_core::clock::{Clock, SystemClock};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use bloomshop_api::routes;
use bloomshop_api::state::AppState;

/// Build the app router with the same route structure as `main.rs`.
pub fn build_test_app(pool: PgPool) -> Router {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let app_state = AppState::new(pool, clock);

    Router::new()
        .merge(routes::health::router())
        .nest("/analytics", routes::analytics::router())
        .with_state(app_state)
}

/// Send a GET request and return the response status and JSON body.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}
