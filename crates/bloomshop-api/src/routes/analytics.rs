//! Read-only analytics endpoints over the aggregate store.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use chrono::NaiveDate;
use serde::Deserialize;

use bloomshop_analytics::queries::{
    self, DashboardSummary, OrderMetricRow, PopularProductRow,
};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /analytics/dashboard
async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardSummary>, ApiError> {
    let summary = queries::dashboard_summary(&state.db_pool, state.clock.as_ref()).await?;
    Ok(Json(summary))
}

/// GET /analytics/popular/views
async fn popular_by_views(
    State(state): State<AppState>,
) -> Result<Json<Vec<PopularProductRow>>, ApiError> {
    Ok(Json(queries::top_by_views(&state.db_pool).await?))
}

/// GET /analytics/popular/orders
async fn popular_by_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<PopularProductRow>>, ApiError> {
    Ok(Json(queries::top_by_orders(&state.db_pool).await?))
}

/// Date-range filter for the order listing. Dates are local calendar days;
/// an unparseable date rejects the request with 400.
#[derive(Debug, Deserialize)]
struct OrdersQuery {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

/// GET /analytics/orders?from=YYYY-MM-DD&to=YYYY-MM-DD
async fn orders(
    State(state): State<AppState>,
    Query(range): Query<OrdersQuery>,
) -> Result<Json<Vec<OrderMetricRow>>, ApiError> {
    let rows = queries::order_metrics(&state.db_pool, range.from, range.to).await?;
    Ok(Json(rows))
}

/// Returns the analytics router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/popular/views", get(popular_by_views))
        .route("/popular/orders", get(popular_by_orders))
        .route("/orders", get(orders))
}
