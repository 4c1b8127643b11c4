//! `/api/ai/*` handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use super::AppState;
use super::extract::{ApiJson, ApiPath};
use super::types::{ApiResponse, EvaluationReport, ModelInfo, TrainingAck};
use crate::error::AppError;
use crate::predict::{BatteryPrediction, BatteryReading, PredictionReport, resolve_all};

const SUPPORTED_FEATURES: &[&str] = &[
    "remaining useful life (RUL)",
    "anomaly detection",
    "failure probability",
    "charging strategy",
    "health grading",
];

/// Body of `POST /api/ai/predict`.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub batteries: Vec<BatteryReading>,
}

/// `GET /api/ai/predict` → predictions for a fresh snapshot.
pub async fn predict_snapshot(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<PredictionReport>> {
    let snapshot = state.service.generate_snapshot();
    Json(ApiResponse::new(state.service.predict(&snapshot)))
}

/// `POST /api/ai/predict` → predictions for caller-supplied readings.
pub async fn predict_readings(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<PredictRequest>,
) -> Result<Json<ApiResponse<PredictionReport>>, AppError> {
    let inputs = resolve_all(request.batteries)?;
    Ok(Json(ApiResponse::new(state.service.predict_inputs(&inputs))))
}

/// `GET /api/ai/predict/{battery_id}` → 404 for unknown ids.
pub async fn predict_battery(
    State(state): State<Arc<AppState>>,
    ApiPath(battery_id): ApiPath<u32>,
) -> Result<Json<ApiResponse<BatteryPrediction>>, AppError> {
    let prediction = state.service.predict_battery(battery_id)?;
    Ok(Json(ApiResponse::new(prediction)))
}

/// `GET /api/ai/model/info`
pub async fn model_info(State(state): State<Arc<AppState>>) -> Json<ApiResponse<ModelInfo>> {
    let model = state.service.engine().model();
    Json(ApiResponse::new(ModelInfo {
        model_version: model.version.clone(),
        model_accuracy: model.accuracy,
        model_type: "rule-based heuristics",
        supported_features: SUPPORTED_FEATURES,
        training_data_count: 50_000,
        last_updated: "2025-06-01",
    }))
}

/// `POST /api/ai/train` → validates the readings and acknowledges them.
pub async fn train(
    ApiJson(readings): ApiJson<Vec<BatteryReading>>,
) -> Result<Json<ApiResponse<TrainingAck>>, AppError> {
    let inputs = resolve_all(readings)?;
    tracing::info!(count = inputs.len(), "training request accepted");
    Ok(Json(ApiResponse::new(TrainingAck {
        status: "training_scheduled",
        message: "model training has been scheduled",
        data_count: inputs.len(),
    })))
}

/// `POST /api/ai/evaluate` → the configured accuracy with fixed companion metrics.
pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    ApiJson(readings): ApiJson<Vec<BatteryReading>>,
) -> Result<Json<ApiResponse<EvaluationReport>>, AppError> {
    let inputs = resolve_all(readings)?;
    Ok(Json(ApiResponse::new(EvaluationReport {
        accuracy: state.service.engine().model().accuracy,
        precision: 0.89,
        recall: 0.91,
        f1_score: 0.90,
        data_count: inputs.len(),
    })))
}
