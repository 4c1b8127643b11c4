//! Composed views for the operator dashboard.
//!
//! Every view is rebuilt per call from fresh noise; nothing here is stored.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::Serialize;

use crate::history::StatusSummary;
use crate::predict::{
    BatteryPrediction, FailureRisk, HealthGrade, PredictionReport, SystemPrediction,
};
use crate::rounding::round_to;
use crate::telemetry::{Alert, BatteryRecord, Environment, Noise, SystemSnapshot, TotalStats};

/// Upper bound on hourly chart windows.
pub const MAX_CHART_HOURS: u32 = 720;
/// Upper bound on daily chart windows.
pub const MAX_CHART_DAYS: u32 = 366;
/// Daily energy target drawn on the production chart (kWh).
pub const ENERGY_TARGET_KWH: f64 = 169.10;

const HOUR_FORMAT: &str = "%Y-%m-%d %H:%M";
const DAY_FORMAT: &str = "%m/%d";

/// Everything the landing page shows, from one snapshot and its predictions.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    #[serde(flatten)]
    pub summary: StatusSummary,
    pub batteries: Vec<BatteryRecord>,
    pub predictions: Vec<BatteryPrediction>,
    pub system_prediction: Option<SystemPrediction>,
    pub total_stats: TotalStats,
    pub alerts: Vec<Alert>,
    pub environment: Environment,
}

impl Overview {
    pub fn new(snapshot: SystemSnapshot, report: PredictionReport) -> Self {
        Self {
            summary: StatusSummary::from_batteries(&snapshot.batteries),
            batteries: snapshot.batteries,
            predictions: report.battery_predictions,
            system_prediction: report.system_prediction,
            total_stats: snapshot.total_stats,
            alerts: snapshot.alerts,
            environment: snapshot.environment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerPoint {
    pub timestamp: String,
    pub power: f64,
    pub voltage: f64,
    pub current: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocPoint {
    pub battery_id: u32,
    pub battery_name: String,
    pub soc: f64,
    pub soh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperaturePoint {
    pub timestamp: String,
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureSeries {
    pub name: String,
    pub history: Vec<TemperaturePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyPoint {
    pub date: String,
    pub energy: f64,
    pub target: f64,
}

/// Whether a maintenance visit replaces the unit or only inspects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceKind {
    Replacement,
    Inspection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceEntry {
    pub battery_id: u32,
    pub battery_name: String,
    pub scheduled_date: NaiveDate,
    pub priority: FailureRisk,
    #[serde(rename = "type")]
    pub kind: MaintenanceKind,
    pub reason: String,
}

/// Hour stamps for a window of `count` slots ending at `now`, oldest first.
fn hourly_slots(now: DateTime<Utc>, count: u32) -> impl Iterator<Item = DateTime<Utc>> {
    (0..count).rev().map(move |back| now - TimeDelta::hours(i64::from(back)))
}

/// Hourly power, voltage, and current for the last `hours` hours.
pub fn power_trend<N: Noise + ?Sized>(
    noise: &mut N,
    now: DateTime<Utc>,
    hours: u32,
) -> Vec<PowerPoint> {
    hourly_slots(now, hours.min(MAX_CHART_HOURS))
        .map(|at| PowerPoint {
            timestamp: at.format(HOUR_FORMAT).to_string(),
            power: round_to(30.0 + noise.uniform(-10.0, 20.0), 2),
            voltage: round_to(3.7 + noise.uniform(-0.3, 0.3), 2),
            current: round_to(1.5 + noise.uniform(-0.5, 1.0), 2),
        })
        .collect()
}

/// Charge and health of each battery in `snapshot`.
pub fn soc_distribution(snapshot: &SystemSnapshot) -> Vec<SocPoint> {
    snapshot
        .batteries
        .iter()
        .map(|b| SocPoint {
            battery_id: b.id,
            battery_name: b.name.clone(),
            soc: b.soc,
            soh: b.soh,
        })
        .collect()
}

/// Hourly temperature trail per battery, keyed `battery_{id}`.
pub fn temperature_history<N: Noise + ?Sized>(
    snapshot: &SystemSnapshot,
    base_temperature: f64,
    noise: &mut N,
    now: DateTime<Utc>,
    hours: u32,
) -> BTreeMap<String, TemperatureSeries> {
    let hours = hours.min(MAX_CHART_HOURS);
    snapshot
        .batteries
        .iter()
        .map(|b| {
            let history = hourly_slots(now, hours)
                .map(|at| TemperaturePoint {
                    timestamp: at.format(HOUR_FORMAT).to_string(),
                    temperature: round_to(base_temperature + noise.uniform(-5.0, 15.0), 1),
                })
                .collect();
            (
                format!("battery_{}", b.id),
                TemperatureSeries {
                    name: b.name.clone(),
                    history,
                },
            )
        })
        .collect()
}

/// Daily energy production against the fixed target.
pub fn energy_production<N: Noise + ?Sized>(
    noise: &mut N,
    now: DateTime<Utc>,
    days: u32,
) -> Vec<EnergyPoint> {
    (0..days.min(MAX_CHART_DAYS))
        .rev()
        .map(|back| EnergyPoint {
            date: (now - TimeDelta::days(i64::from(back)))
                .format(DAY_FORMAT)
                .to_string(),
            energy: round_to(150.0 + noise.uniform(-30.0, 50.0), 2),
            target: ENERGY_TARGET_KWH,
        })
        .collect()
}

/// The first `limit` alerts of `snapshot`.
pub fn recent_alerts(snapshot: &SystemSnapshot, limit: usize) -> Vec<Alert> {
    snapshot.alerts.iter().take(limit).cloned().collect()
}

/// Visits for every battery at moderate or high failure risk, earliest first.
pub fn maintenance_schedule(report: &PredictionReport) -> Vec<MaintenanceEntry> {
    let mut schedule: Vec<MaintenanceEntry> = report
        .battery_predictions
        .iter()
        .filter(|p| p.failure_risk != FailureRisk::Low)
        .map(|p| MaintenanceEntry {
            battery_id: p.battery_id,
            battery_name: p.battery_name.clone(),
            scheduled_date: p.replacement_date,
            priority: p.failure_risk,
            kind: if p.health_grade == HealthGrade::F {
                MaintenanceKind::Replacement
            } else {
                MaintenanceKind::Inspection
            },
            reason: p.warnings.join(", "),
        })
        .collect();
    schedule.sort_by_key(|e| e.scheduled_date);
    schedule
}
