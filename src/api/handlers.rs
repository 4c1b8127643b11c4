//! Liveness and `/api/battery/*` handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use serde_json::json;

use super::AppState;
use super::extract::{ApiPath, ApiQuery};
use super::types::{ApiResponse, HealthInfo, HistoryQuery, RootInfo};
use crate::error::AppError;
use crate::history::HistoryView;
use crate::telemetry::{BatteryRecord, SystemSnapshot};

/// `GET /`
pub async fn root() -> Json<RootInfo> {
    Json(RootInfo {
        message: "Battery diagnostics API",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
        timestamp: Utc::now(),
    })
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthInfo> {
    Json(HealthInfo {
        status: "healthy",
        timestamp: Utc::now(),
        active_connections: state.registry.len(),
    })
}

/// `GET /api/battery/status` → a fresh snapshot, also recorded in history.
pub async fn battery_status(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<SystemSnapshot>> {
    Json(ApiResponse::new(state.service.generate_snapshot()))
}

/// `GET /api/battery/history?battery_id=&limit=`
///
/// `limit` defaults to 50 and is clamped to `[1, 100]`.
pub async fn battery_history(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> Json<ApiResponse<HistoryView>> {
    let view = state
        .service
        .history(query.battery_id, query.clamped_limit());
    let count = view.len();
    Json(ApiResponse::with_count(view, count))
}

/// `GET /api/battery/statistics` → latest-snapshot summary, `{}` before any
/// snapshot exists.
pub async fn battery_statistics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let data = match state.service.statistics() {
        Some(stats) => serde_json::to_value(stats)?,
        None => json!({}),
    };
    Ok(Json(ApiResponse::new(data)))
}

/// `GET /api/battery/{battery_id}` → 404 for unknown ids.
pub async fn battery_by_id(
    State(state): State<Arc<AppState>>,
    ApiPath(battery_id): ApiPath<u32>,
) -> Result<Json<ApiResponse<BatteryRecord>>, AppError> {
    let record = state.service.battery(battery_id)?;
    Ok(Json(ApiResponse::new(record)))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    use crate::api::{AppState, router};
    use crate::config::ServiceConfig;

    fn make_test_state() -> std::sync::Arc<AppState> {
        let mut config = ServiceConfig::baseline();
        config.generator.seed = Some(42);
        std::sync::Arc::new(AppState::new(&config))
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn root_reports_running() {
        let (status, json) = get_json(router(make_test_state()), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "running");
    }

    #[tokio::test]
    async fn health_reports_no_connections() {
        let (status, json) = get_json(router(make_test_state()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["active_connections"], 0);
    }

    #[tokio::test]
    async fn status_wraps_snapshot_in_envelope() {
        let state = make_test_state();
        let (status, json) = get_json(router(state.clone()), "/api/battery/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["batteries"].as_array().unwrap().len(), 3);
        assert!(json["data"]["total_stats"].is_object());
        assert_eq!(state.service.history_len(), 1);
    }

    #[tokio::test]
    async fn statistics_is_empty_object_before_first_snapshot() {
        let (status, json) = get_json(router(make_test_state()), "/api/battery/statistics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn unknown_battery_returns_404_detail() {
        let (status, json) = get_json(router(make_test_state()), "/api/battery/42").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["detail"].as_str().unwrap().contains("42"));
    }
}
