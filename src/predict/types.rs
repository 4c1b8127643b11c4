//! Prediction result types.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Ordinal health grade, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum HealthGrade {
    A,
    B,
    C,
    D,
    F,
}

impl HealthGrade {
    /// Short description of the grade.
    pub fn label(self) -> &'static str {
        match self {
            Self::A => "excellent",
            Self::B => "good",
            Self::C => "fair",
            Self::D => "caution",
            Self::F => "replace",
        }
    }
}

/// Failure-probability bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureRisk {
    Low,
    Moderate,
    High,
}

/// Plant-level health derived from the per-battery results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemHealth {
    Normal,
    Caution,
    Danger,
}

/// Tags describing why a battery was flagged as anomalous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    HighTemperature,
    LowTemperature,
    Overvoltage,
    Undervoltage,
    DegradedHealth,
    CellImbalance,
    Other,
}

/// Charging strategy suggested for a battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChargingRecommendation {
    #[serde(rename = "urgent charge required (high temperature)")]
    UrgentChargeHot,
    #[serde(rename = "urgent charge required")]
    UrgentCharge,
    #[serde(rename = "charge recommended")]
    ChargeRecommended,
    #[serde(rename = "prevent overcharge (preserve battery life)")]
    PreventOvercharge,
    #[serde(rename = "hold full charge")]
    HoldFullCharge,
    #[serde(rename = "normal operation")]
    NormalOperation,
}

/// Derived diagnostics for one battery.
#[derive(Debug, Clone, Serialize)]
pub struct BatteryPrediction {
    pub battery_id: u32,
    pub battery_name: String,
    /// Estimated remaining useful life (days).
    pub rul_days: u32,
    pub replacement_date: NaiveDate,
    pub health_grade: HealthGrade,
    /// Anomaly score in `[0, 1]`, rounded to 3 places.
    pub anomaly_score: f64,
    pub is_anomaly: bool,
    /// Present only when `is_anomaly` is set.
    pub anomaly_type: Option<Vec<AnomalyType>>,
    /// Failure probability in `[0, 1]`, rounded to 3 places.
    pub failure_probability: f64,
    pub failure_risk: FailureRisk,
    pub charging_recommendation: ChargingRecommendation,
    pub predicted_soh_next_month: f64,
    pub predicted_capacity_retention: f64,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Rollup of all battery predictions in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemPrediction {
    pub system_health: SystemHealth,
    pub average_rul_days: u32,
    pub average_anomaly_score: f64,
    pub average_failure_probability: f64,
    pub batteries_with_anomaly: usize,
    pub high_risk_batteries: usize,
    pub total_batteries: usize,
    pub system_recommendation: String,
}

/// Full prediction bundle for one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub timestamp: DateTime<Utc>,
    pub model_version: String,
    pub model_accuracy: f64,
    pub battery_predictions: Vec<BatteryPrediction>,
    /// `None` when there were no batteries to score.
    pub system_prediction: Option<SystemPrediction>,
}

impl fmt::Display for PredictionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Prediction Report (model {}) ---", self.model_version)?;
        for p in &self.battery_predictions {
            writeln!(
                f,
                "#{} grade {:?} ({})  RUL {} days  anomaly {:.3}{}  failure {:.3} ({:?})",
                p.battery_id,
                p.health_grade,
                p.health_grade.label(),
                p.rul_days,
                p.anomaly_score,
                if p.is_anomaly { " [ANOMALY]" } else { "" },
                p.failure_probability,
                p.failure_risk,
            )?;
        }
        if let Some(s) = &self.system_prediction {
            writeln!(
                f,
                "System {:?}: {} ({} anomalous, {} high risk of {})",
                s.system_health,
                s.system_recommendation,
                s.batteries_with_anomaly,
                s.high_risk_batteries,
                s.total_batteries
            )?;
        }
        Ok(())
    }
}
