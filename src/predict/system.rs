//! Plant-level rollup of battery predictions.

pub use super::types::SystemPrediction;
use super::engine::HIGH_RISK_THRESHOLD;
use super::types::{BatteryPrediction, SystemHealth};
use crate::rounding::round_to;

/// Share of high-risk batteries above which the plant is in danger.
const DANGER_HIGH_RISK_SHARE: f64 = 0.3;
/// Share of anomalous batteries above which the plant needs caution.
const CAUTION_ANOMALY_SHARE: f64 = 0.5;

impl SystemPrediction {
    /// Aggregates per-battery predictions.
    ///
    /// Returns `None` for an empty batch.
    pub fn from_predictions(predictions: &[BatteryPrediction]) -> Option<Self> {
        if predictions.is_empty() {
            return None;
        }

        let n = predictions.len() as f64;
        let mut rul_sum = 0.0;
        let mut anomaly_sum = 0.0;
        let mut failure_sum = 0.0;
        let mut anomalous = 0_usize;
        let mut high_risk = 0_usize;

        for p in predictions {
            rul_sum += f64::from(p.rul_days);
            anomaly_sum += p.anomaly_score;
            failure_sum += p.failure_probability;
            if p.is_anomaly {
                anomalous += 1;
            }
            if p.failure_probability > HIGH_RISK_THRESHOLD {
                high_risk += 1;
            }
        }

        let system_health = if high_risk as f64 > n * DANGER_HIGH_RISK_SHARE {
            SystemHealth::Danger
        } else if anomalous as f64 > n * CAUTION_ANOMALY_SHARE {
            SystemHealth::Caution
        } else {
            SystemHealth::Normal
        };

        Some(Self {
            system_health,
            average_rul_days: (rul_sum / n) as u32,
            average_anomaly_score: round_to(anomaly_sum / n, 3),
            average_failure_probability: round_to(failure_sum / n, 3),
            batteries_with_anomaly: anomalous,
            high_risk_batteries: high_risk,
            total_batteries: predictions.len(),
            system_recommendation: system_recommendation(system_health, high_risk).to_string(),
        })
    }
}

/// Fixed plant-level advice keyed by health and whether any battery is high risk.
pub fn system_recommendation(health: SystemHealth, high_risk_count: usize) -> &'static str {
    match health {
        SystemHealth::Danger => "immediate system inspection and battery replacement required",
        SystemHealth::Caution if high_risk_count > 0 => "prioritize inspection of high-risk batteries",
        SystemHealth::Caution => "review the periodic inspection schedule",
        SystemHealth::Normal => "system operating normally",
    }
}
