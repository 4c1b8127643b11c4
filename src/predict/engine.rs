//! Per-battery scoring rules.

use chrono::{DateTime, TimeDelta, Utc};

use super::input::PredictionInput;
use super::system::SystemPrediction;
use super::types::{
    AnomalyType, BatteryPrediction, ChargingRecommendation, FailureRisk, HealthGrade,
    PredictionReport,
};
use crate::config::ModelConfig;
use crate::rounding::round_to;
use crate::telemetry::{CellBalance, Noise, SystemSnapshot};

/// Nominal service life at full health (days).
const BASE_LIFE_DAYS: f64 = 1000.0;
/// Cycle count at which the cycle factor reaches zero.
const CYCLE_LIFE: f64 = 5000.0;
/// Temperature with no thermal derating (°C).
const OPTIMAL_TEMPERATURE_C: f64 = 25.0;

/// Scores above this are anomalous.
pub const ANOMALY_THRESHOLD: f64 = 0.7;
/// Probabilities above this are high risk.
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;
/// Probabilities above this (and not high) are moderate risk.
pub const MODERATE_RISK_THRESHOLD: f64 = 0.3;

/// Rule-based battery diagnostics.
///
/// Stateless apart from the model metadata it stamps on reports; all
/// randomness comes from the caller's [`Noise`].
#[derive(Debug, Clone)]
pub struct PredictionEngine {
    model: ModelConfig,
}

impl PredictionEngine {
    pub fn new(model: ModelConfig) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    /// Scores every battery in a snapshot and rolls the results up.
    ///
    /// # Arguments
    ///
    /// * `snapshot` - Batteries to score
    /// * `noise` - Perturbation source, drawn four times per battery
    /// * `now` - Report timestamp and base for replacement dates
    ///
    /// # Returns
    ///
    /// A report with one prediction per battery, in snapshot order.
    pub fn predict<N: Noise + ?Sized>(
        &self,
        snapshot: &SystemSnapshot,
        noise: &mut N,
        now: DateTime<Utc>,
    ) -> PredictionReport {
        let inputs: Vec<PredictionInput> =
            snapshot.batteries.iter().map(PredictionInput::from).collect();
        self.predict_inputs(&inputs, noise, now)
    }

    /// Scores already-resolved inputs and rolls the results up.
    pub fn predict_inputs<N: Noise + ?Sized>(
        &self,
        inputs: &[PredictionInput],
        noise: &mut N,
        now: DateTime<Utc>,
    ) -> PredictionReport {
        let battery_predictions: Vec<BatteryPrediction> = inputs
            .iter()
            .map(|input| self.predict_battery(input, noise, now))
            .collect();
        let system_prediction = SystemPrediction::from_predictions(&battery_predictions);

        PredictionReport {
            timestamp: now,
            model_version: self.model.version.clone(),
            model_accuracy: self.model.accuracy,
            battery_predictions,
            system_prediction,
        }
    }

    /// Scores one battery.
    ///
    /// Draws noise in a fixed order: RUL, anomaly score, failure
    /// probability, next-month SOH.
    pub fn predict_battery<N: Noise + ?Sized>(
        &self,
        input: &PredictionInput,
        noise: &mut N,
        now: DateTime<Utc>,
    ) -> BatteryPrediction {
        let rul_days = remaining_useful_life(input.soh, input.cycle_count, input.temperature, noise);
        let score = anomaly_score(input, noise);
        let is_anomaly = score > ANOMALY_THRESHOLD;
        let failure = failure_probability(input.soh, input.temperature, input.cycle_count, noise);
        let predicted_soh_next_month = round_to(input.soh - noise.uniform(0.5, 1.5), 1);

        BatteryPrediction {
            battery_id: input.id,
            battery_name: input.name.clone(),
            rul_days,
            replacement_date: (now + TimeDelta::days(i64::from(rul_days))).date_naive(),
            health_grade: health_grade(input.soh, score),
            anomaly_score: round_to(score, 3),
            is_anomaly,
            anomaly_type: is_anomaly.then(|| anomaly_types(input)),
            failure_probability: round_to(failure, 3),
            failure_risk: failure_risk(failure),
            charging_recommendation: charging_recommendation(
                input.soc,
                input.soh,
                input.temperature,
            ),
            predicted_soh_next_month,
            predicted_capacity_retention: round_to(input.soh / 100.0 * input.capacity_rated, 2),
            warnings: warnings(input, score, failure),
            recommendations: recommendations(input),
        }
    }
}

/// Remaining useful life in whole days, never negative.
///
/// `1000 · soh/100 · max(0, 1 - cycles/5000) · clamp(1 - |t-25|/100, 0.5, 1) + U(-50, 50)`
pub fn remaining_useful_life<N: Noise + ?Sized>(
    soh: f64,
    cycle_count: u32,
    temperature: f64,
    noise: &mut N,
) -> u32 {
    let soh_factor = soh / 100.0;
    let cycle_factor = (1.0 - f64::from(cycle_count) / CYCLE_LIFE).max(0.0);
    let temp_factor = (1.0 - (temperature - OPTIMAL_TEMPERATURE_C).abs() / 100.0).clamp(0.5, 1.0);

    let rul = BASE_LIFE_DAYS * soh_factor * cycle_factor * temp_factor + noise.uniform(-50.0, 50.0);
    rul.max(0.0).floor() as u32
}

/// Additive anomaly score clamped to `[0, 1]`.
pub fn anomaly_score<N: Noise + ?Sized>(input: &PredictionInput, noise: &mut N) -> f64 {
    let mut score = 0.0;

    let t = input.temperature;
    if t > 45.0 || t < 0.0 {
        score += 0.3;
    } else if t > 40.0 || t < 5.0 {
        score += 0.15;
    }

    let v = input.voltage;
    if !(3.0..=4.2).contains(&v) {
        score += 0.3;
    } else if !(3.3..=4.0).contains(&v) {
        score += 0.15;
    }

    // Open-circuit voltage expected for the reported charge level.
    let expected_voltage = 3.3 + input.soc / 100.0 * 0.9;
    if (v - expected_voltage).abs() > 0.5 {
        score += 0.2;
    }

    if input.soh < 70.0 {
        score += 0.3;
    } else if input.soh < 85.0 {
        score += 0.1;
    }

    if input.cell_balance == CellBalance::Unbalanced {
        score += 0.2;
    }

    score += noise.uniform(-0.05, 0.05);
    score.clamp(0.0, 1.0)
}

/// Logistic failure probability.
pub fn failure_probability<N: Noise + ?Sized>(
    soh: f64,
    temperature: f64,
    cycle_count: u32,
    noise: &mut N,
) -> f64 {
    let x = -0.05 * soh
        + 0.02 * (temperature - OPTIMAL_TEMPERATURE_C).abs()
        + 0.0001 * f64::from(cycle_count)
        + noise.uniform(-0.5, 0.5);
    1.0 / (1.0 + (-x).exp())
}

/// Buckets a failure probability; both thresholds are strict.
pub fn failure_risk(probability: f64) -> FailureRisk {
    if probability > HIGH_RISK_THRESHOLD {
        FailureRisk::High
    } else if probability > MODERATE_RISK_THRESHOLD {
        FailureRisk::Moderate
    } else {
        FailureRisk::Low
    }
}

pub fn charging_recommendation(soc: f64, soh: f64, temperature: f64) -> ChargingRecommendation {
    if soc < 20.0 {
        if temperature > 35.0 {
            ChargingRecommendation::UrgentChargeHot
        } else {
            ChargingRecommendation::UrgentCharge
        }
    } else if soc < 40.0 {
        ChargingRecommendation::ChargeRecommended
    } else if soc > 90.0 {
        if soh < 85.0 {
            ChargingRecommendation::PreventOvercharge
        } else {
            ChargingRecommendation::HoldFullCharge
        }
    } else {
        ChargingRecommendation::NormalOperation
    }
}

/// First tier whose SOH floor and anomaly ceiling are both met.
pub fn health_grade(soh: f64, anomaly_score: f64) -> HealthGrade {
    const TIERS: [(HealthGrade, f64, f64); 4] = [
        (HealthGrade::A, 95.0, 0.2),
        (HealthGrade::B, 90.0, 0.4),
        (HealthGrade::C, 80.0, 0.6),
        (HealthGrade::D, 70.0, 0.8),
    ];
    TIERS
        .iter()
        .find(|(_, min_soh, max_score)| soh >= *min_soh && anomaly_score < *max_score)
        .map_or(HealthGrade::F, |(grade, _, _)| *grade)
}

/// Tags for an anomalous battery; `Other` when no specific rule applies.
pub fn anomaly_types(input: &PredictionInput) -> Vec<AnomalyType> {
    let mut types = Vec::new();

    if input.temperature > 40.0 {
        types.push(AnomalyType::HighTemperature);
    } else if input.temperature < 5.0 {
        types.push(AnomalyType::LowTemperature);
    }

    if input.voltage > 4.0 {
        types.push(AnomalyType::Overvoltage);
    } else if input.voltage < 3.3 {
        types.push(AnomalyType::Undervoltage);
    }

    if input.soh < 80.0 {
        types.push(AnomalyType::DegradedHealth);
    }
    if input.cell_balance == CellBalance::Unbalanced {
        types.push(AnomalyType::CellImbalance);
    }

    if types.is_empty() {
        types.push(AnomalyType::Other);
    }
    types
}

pub fn warnings(input: &PredictionInput, anomaly_score: f64, failure_probability: f64) -> Vec<String> {
    let mut out = Vec::new();

    if anomaly_score > 0.7 {
        out.push("severe anomaly detected");
    } else if anomaly_score > 0.5 {
        out.push("anomaly detected");
    }

    if failure_probability > 0.7 {
        out.push("high failure risk");
    } else if failure_probability > 0.5 {
        out.push("possible failure");
    }

    if input.temperature > 40.0 {
        out.push("battery temperature high");
    }
    if input.soc < 20.0 {
        out.push("battery charge low");
    }
    if input.soh < 80.0 {
        out.push("battery health degraded");
    }

    out.into_iter().map(String::from).collect()
}

pub fn recommendations(input: &PredictionInput) -> Vec<String> {
    let mut out = Vec::new();

    if input.temperature > 35.0 {
        out.push("inspect cooling system");
    }
    if input.soc < 30.0 {
        out.push("adjust charging schedule");
    }
    if input.soh < 85.0 {
        out.push("plan battery replacement");
    }
    if input.cell_balance == CellBalance::Unbalanced {
        out.push("perform cell balancing");
    }
    if input.cycle_count > 4000 {
        out.push("schedule preventive maintenance for high cycle count");
    }
    if out.is_empty() {
        out.push("operating normally");
    }

    out.into_iter().map(String::from).collect()
}
