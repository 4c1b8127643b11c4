//! `/api/dashboard/*` handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use super::AppState;
use super::extract::ApiQuery;
use super::types::{ApiResponse, DaysQuery, HoursQuery, LimitQuery};
use crate::dashboard::{
    self, EnergyPoint, MaintenanceEntry, Overview, PowerPoint, SocPoint, TemperatureSeries,
};
use crate::telemetry::Alert;

const DEFAULT_POWER_HOURS: u32 = 24;
const DEFAULT_TEMPERATURE_HOURS: u32 = 12;
const DEFAULT_ENERGY_DAYS: u32 = 20;
const DEFAULT_ALERT_LIMIT: usize = 10;

pub async fn overview(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Overview>> {
    let snapshot = state.service.generate_snapshot();
    let report = state.service.predict(&snapshot);
    Json(ApiResponse::new(Overview::new(snapshot, report)))
}

pub async fn power_trend(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<HoursQuery>,
) -> Json<ApiResponse<Vec<PowerPoint>>> {
    let hours = query.hours.unwrap_or(DEFAULT_POWER_HOURS);
    let points = state
        .service
        .with_noise(|rng| dashboard::power_trend(rng, Utc::now(), hours));
    Json(ApiResponse::new(points))
}

pub async fn soc_distribution(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<SocPoint>>> {
    let snapshot = state.service.generate_snapshot();
    Json(ApiResponse::new(dashboard::soc_distribution(&snapshot)))
}

pub async fn temperature_history(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<HoursQuery>,
) -> Json<ApiResponse<BTreeMap<String, TemperatureSeries>>> {
    let hours = query.hours.unwrap_or(DEFAULT_TEMPERATURE_HOURS);
    let snapshot = state.service.generate_snapshot();
    let base = state.service.generator().config().base_temperature;
    let series = state.service.with_noise(|rng| {
        dashboard::temperature_history(&snapshot, base, rng, Utc::now(), hours)
    });
    Json(ApiResponse::new(series))
}

pub async fn energy_production(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<DaysQuery>,
) -> Json<ApiResponse<Vec<EnergyPoint>>> {
    let days = query.days.unwrap_or(DEFAULT_ENERGY_DAYS);
    let points = state
        .service
        .with_noise(|rng| dashboard::energy_production(rng, Utc::now(), days));
    Json(ApiResponse::new(points))
}

pub async fn alerts(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> Json<ApiResponse<Vec<Alert>>> {
    let snapshot = state.service.generate_snapshot();
    let alerts = dashboard::recent_alerts(&snapshot, query.limit.unwrap_or(DEFAULT_ALERT_LIMIT));
    let count = alerts.len();
    Json(ApiResponse::with_count(alerts, count))
}

pub async fn maintenance_schedule(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<MaintenanceEntry>>> {
    let snapshot = state.service.generate_snapshot();
    let report = state.service.predict(&snapshot);
    let schedule = dashboard::maintenance_schedule(&report);
    let count = schedule.len();
    Json(ApiResponse::with_count(schedule, count))
}
