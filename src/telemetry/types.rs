//! Battery telemetry records, alerts, and system snapshots.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rounding::round_to;

/// Operating status reported for a battery unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatteryStatus {
    Normal,
    UnderInspection,
    Failed,
}

/// Whether the cells inside a pack have equalized charge levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellBalance {
    Balanced,
    Unbalanced,
}

/// Severity of a threshold alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Caution,
}

/// One simulated battery unit at a single instant.
///
/// Units: volts, amperes, °C, percent (`soc`, `soh`), kW (capacity and power),
/// kWh (energy), mΩ (`internal_resistance`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryRecord {
    /// 1-based unit identifier, stable across snapshots.
    pub id: u32,
    pub name: String,
    pub status: BatteryStatus,
    pub voltage: f64,
    pub voltage_max: f64,
    pub voltage_min: f64,
    pub current: f64,
    pub temperature: f64,
    /// State of charge (%).
    pub soc: f64,
    /// State of health (%).
    pub soh: f64,
    pub capacity_current: f64,
    pub capacity_rated: f64,
    pub power_current: f64,
    pub power_peak: f64,
    pub energy_today: f64,
    pub energy_total: f64,
    /// Runtime label, e.g. `"2.45h"`.
    pub runtime: String,
    pub cycle_count: u32,
    pub internal_resistance: f64,
    pub cell_balance: CellBalance,
}

/// Aggregates over the batteries of one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalStats {
    /// Sum of `power_current` (kW).
    pub total_power: f64,
    /// Sum of `energy_total` (kWh).
    pub total_energy: f64,
    pub average_soc: f64,
    pub average_soh: f64,
    pub average_temperature: f64,
}

impl TotalStats {
    /// Computes the aggregates from a battery batch.
    ///
    /// Returns all zeros for an empty batch.
    pub fn from_batteries(batteries: &[BatteryRecord]) -> Self {
        if batteries.is_empty() {
            return Self {
                total_power: 0.0,
                total_energy: 0.0,
                average_soc: 0.0,
                average_soh: 0.0,
                average_temperature: 0.0,
            };
        }

        let n = batteries.len() as f64;
        let mut power = 0.0;
        let mut energy = 0.0;
        let mut soc = 0.0;
        let mut soh = 0.0;
        let mut temperature = 0.0;

        for b in batteries {
            power += b.power_current;
            energy += b.energy_total;
            soc += b.soc;
            soh += b.soh;
            temperature += b.temperature;
        }

        Self {
            total_power: round_to(power, 2),
            total_energy: round_to(energy, 2),
            average_soc: round_to(soc / n, 1),
            average_soh: round_to(soh / n, 1),
            average_temperature: round_to(temperature / n, 1),
        }
    }
}

/// Site conditions reported alongside the battery batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub outdoor_temperature: f64,
    /// Relative humidity (%).
    pub humidity: f64,
    pub weather: String,
}

/// A threshold alert raised for one battery in one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub battery_id: u32,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// A complete telemetry sample of the plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub timestamp: DateTime<Utc>,
    /// Batteries in creation order.
    pub batteries: Vec<BatteryRecord>,
    pub total_stats: TotalStats,
    pub alerts: Vec<Alert>,
    pub environment: Environment,
}

impl SystemSnapshot {
    /// Looks up a battery by id.
    pub fn battery(&self, id: u32) -> Option<&BatteryRecord> {
        self.batteries.iter().find(|b| b.id == id)
    }
}

impl fmt::Display for SystemSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Snapshot {} ---", self.timestamp.to_rfc3339())?;
        for b in &self.batteries {
            writeln!(
                f,
                "#{} {:<16} {:>5.2} V {:>6.2} °C  SOC {:>5.1}%  SOH {:>5.1}%  {} cycles",
                b.id, b.name, b.voltage, b.temperature, b.soc, b.soh, b.cycle_count
            )?;
        }
        let s = &self.total_stats;
        writeln!(
            f,
            "Total power {:.2} kW, energy {:.2} kWh, avg SOC {:.1}%, avg SOH {:.1}%, avg temp {:.1} °C",
            s.total_power, s.total_energy, s.average_soc, s.average_soh, s.average_temperature
        )?;
        for a in &self.alerts {
            writeln!(f, "[{:?}] {}", a.level, a.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::fixtures::battery;

    #[test]
    fn total_stats_sums_and_averages() {
        let batteries = vec![battery(1, 80.0, 90.0, 20.0), battery(2, 90.0, 96.0, 30.0)];
        let stats = TotalStats::from_batteries(&batteries);
        assert_eq!(stats.total_power, 60.0);
        assert_eq!(stats.total_energy, 320.0);
        assert_eq!(stats.average_soc, 85.0);
        assert_eq!(stats.average_soh, 93.0);
        assert_eq!(stats.average_temperature, 25.0);
    }

    #[test]
    fn total_stats_empty_batch_is_zero() {
        let stats = TotalStats::from_batteries(&[]);
        assert_eq!(stats.total_power, 0.0);
        assert_eq!(stats.average_soc, 0.0);
    }

    #[cfg(feature = "api")]
    #[test]
    fn enums_use_wire_names() {
        assert_eq!(
            serde_json::to_string(&BatteryStatus::UnderInspection).unwrap(),
            "\"under-inspection\""
        );
        assert_eq!(
            serde_json::to_string(&CellBalance::Unbalanced).unwrap(),
            "\"unbalanced\""
        );
        assert_eq!(serde_json::to_string(&AlertLevel::Caution).unwrap(), "\"caution\"");
    }
}
