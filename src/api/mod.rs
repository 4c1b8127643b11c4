//! HTTP and WebSocket API over the battery service.
//!
//! Route groups:
//! - `/api/battery/*` - fresh snapshots, history, statistics
//! - `/api/ai/*` - predictions and model metadata
//! - `/api/dashboard/*` - composed chart and maintenance views
//! - `/ws/battery-data` - periodic snapshot + prediction feed
//! - `/`, `/health` - liveness

mod ai;
mod dashboard;
mod extract;
mod handlers;
mod registry;
pub mod types;
mod ws;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use registry::ConnectionRegistry;

use crate::config::ServiceConfig;
use crate::service::BatteryService;

/// State shared by every handler.
pub struct AppState {
    pub service: BatteryService,
    pub registry: ConnectionRegistry,
    /// Delay between WebSocket frames.
    pub stream_interval: Duration,
}

impl AppState {
    /// Builds the service, an empty connection registry, and the feed cadence.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated service configuration
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            service: BatteryService::new(config),
            registry: ConnectionRegistry::new(),
            stream_interval: config.stream.interval(),
        }
    }
}

/// Builds the axum router with all routes, request tracing, and permissive CORS.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    let battery = Router::new()
        .route("/status", get(handlers::battery_status))
        .route("/history", get(handlers::battery_history))
        .route("/statistics", get(handlers::battery_statistics))
        .route("/{battery_id}", get(handlers::battery_by_id));

    let ai = Router::new()
        .route("/predict", get(ai::predict_snapshot).post(ai::predict_readings))
        .route("/predict/{battery_id}", get(ai::predict_battery))
        .route("/model/info", get(ai::model_info))
        .route("/train", post(ai::train))
        .route("/evaluate", post(ai::evaluate));

    let dashboard = Router::new()
        .route("/overview", get(dashboard::overview))
        .route("/chart/power-trend", get(dashboard::power_trend))
        .route("/chart/soc-distribution", get(dashboard::soc_distribution))
        .route(
            "/chart/temperature-history",
            get(dashboard::temperature_history),
        )
        .route(
            "/chart/energy-production",
            get(dashboard::energy_production),
        )
        .route("/alerts", get(dashboard::alerts))
        .route(
            "/maintenance/schedule",
            get(dashboard::maintenance_schedule),
        );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/ws/battery-data", get(ws::battery_feed))
        .nest("/api/battery", battery)
        .nest("/api/ai", ai)
        .nest("/api/dashboard", dashboard)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
}

/// Binds to `addr` and serves the API until the listener fails.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `addr` - Socket address to bind to
///
/// # Errors
///
/// Returns the bind or accept-loop I/O error.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "API server listening");
    axum::serve(listener, app).await
}
