//! Bloomshop analytics service entry point.
//!
//! Runs the aggregator loop and the HTTP read surface in one process. The
//! aggregator is cancelled on shutdown and allowed to finish its in-flight
//! message before the process exits.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use bloomshop_aggregator::{AggregatorConfig, AggregatorLoop};
use bloomshop_core::clock::{Clock, SystemClock};

use bloomshop_api::config::AppConfig;
use bloomshop_api::error::AppError;
use bloomshop_api::{routes, state};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Bloomshop analytics service");

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("../../migrations").run(&pool).await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // The aggregator runs next to the server; its health never gates HTTP
    // availability.
    let cancel = CancellationToken::new();
    let aggregator = AggregatorLoop::new(
        pool.clone(),
        clock.clone(),
        AggregatorConfig::new(&config.kafka_bootstrap_servers),
    );
    let aggregator_task = tokio::spawn(aggregator.run(cancel.clone()));

    let app_state = state::AppState::new(pool, clock);

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/analytics", routes::analytics::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|err| AppError::Config(format!("invalid HOST:PORT combination: {err}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down aggregator loop");
    cancel.cancel();
    if let Err(err) = aggregator_task.await {
        tracing::error!(error = %err, "aggregator task panicked");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
