//! API envelope, query, and response types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::predict::PredictionReport;
use crate::telemetry::SystemSnapshot;

/// Success envelope wrapped around every non-error JSON response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    /// Element count, set for list endpoints that report it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            count: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_count(data: T, count: usize) -> Self {
        Self {
            count: Some(count),
            ..Self::new(data)
        }
    }
}

/// Reads an optional query value, treating `key=` like an absent key.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

/// Default number of snapshots returned by the history endpoint.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
/// Largest accepted history limit.
pub const MAX_HISTORY_LIMIT: usize = 100;

/// `GET /api/battery/history` query.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub battery_id: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub limit: Option<usize>,
}

impl HistoryQuery {
    /// Requested limit clamped to `[1, MAX_HISTORY_LIMIT]`.
    pub fn clamped_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT)
    }
}

/// `?hours=` for the hourly charts.
#[derive(Debug, Deserialize)]
pub struct HoursQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub hours: Option<u32>,
}

/// `?days=` for the daily chart.
#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub days: Option<u32>,
}

/// `?limit=` for the alert list.
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub limit: Option<usize>,
}

/// `GET /` body.
#[derive(Debug, Serialize)]
pub struct RootInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// `GET /health` body.
#[derive(Debug, Serialize)]
pub struct HealthInfo {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub active_connections: usize,
}

/// `GET /api/ai/model/info` payload.
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub model_version: String,
    pub model_accuracy: f64,
    pub model_type: &'static str,
    pub supported_features: &'static [&'static str],
    pub training_data_count: u64,
    pub last_updated: &'static str,
}

/// `POST /api/ai/train` payload.
#[derive(Debug, Serialize)]
pub struct TrainingAck {
    pub status: &'static str,
    pub message: &'static str,
    pub data_count: usize,
}

/// `POST /api/ai/evaluate` payload.
#[derive(Debug, Serialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub data_count: usize,
}

/// One frame of the WebSocket feed.
#[derive(Debug, Serialize)]
pub struct StreamFrame {
    pub timestamp: DateTime<Utc>,
    pub battery_data: SystemSnapshot,
    pub prediction: PredictionReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_limit_defaults_and_clamps() {
        let q = |limit| HistoryQuery {
            battery_id: None,
            limit,
        };
        assert_eq!(q(None).clamped_limit(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(q(Some(0)).clamped_limit(), 1);
        assert_eq!(q(Some(500)).clamped_limit(), MAX_HISTORY_LIMIT);
        assert_eq!(q(Some(7)).clamped_limit(), 7);
    }

    #[test]
    fn envelope_omits_count_unless_set() {
        let plain = serde_json::to_value(ApiResponse::new(1)).unwrap();
        assert!(plain.get("count").is_none());
        assert_eq!(plain["success"], true);

        let counted = serde_json::to_value(ApiResponse::with_count(vec![1, 2], 2)).unwrap();
        assert_eq!(counted["count"], 2);
    }

    #[test]
    fn blank_query_values_read_as_absent() {
        let q: HistoryQuery =
            serde_json::from_value(serde_json::json!({ "battery_id": "", "limit": "7" })).unwrap();
        assert_eq!(q.battery_id, None);
        assert_eq!(q.limit, Some(7));

        let q: HistoryQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(q.battery_id, None);
        assert_eq!(q.clamped_limit(), DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn non_numeric_query_value_is_an_error() {
        let parsed =
            serde_json::from_value::<HoursQuery>(serde_json::json!({ "hours": "-3" }));
        assert!(parsed.is_err());
    }
}
