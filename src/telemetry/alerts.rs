use chrono::{DateTime, Utc};

use super::types::{Alert, AlertLevel, BatteryRecord, CellBalance};

/// Temperature above which a warning is raised (°C).
pub const HIGH_TEMPERATURE_C: f64 = 40.0;
/// State of charge below which a caution is raised (%).
pub const LOW_SOC_PCT: f64 = 20.0;
/// State of health below which a warning is raised (%).
pub const LOW_SOH_PCT: f64 = 80.0;

/// Scans a battery batch and returns threshold alerts.
///
/// Alerts are ordered battery-first, then by rule: temperature, SOC, SOH,
/// cell balance. A battery contributes zero to four alerts. The output depends
/// only on the field values of `batteries`; every alert carries `timestamp`.
pub fn derive_alerts(batteries: &[BatteryRecord], timestamp: DateTime<Utc>) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for b in batteries {
        let mut push = |level: AlertLevel, message: String| {
            alerts.push(Alert {
                level,
                battery_id: b.id,
                message,
                timestamp,
            });
        };

        if b.temperature > HIGH_TEMPERATURE_C {
            push(
                AlertLevel::Warning,
                format!("{}: high temperature detected ({}°C)", b.name, b.temperature),
            );
        }
        if b.soc < LOW_SOC_PCT {
            push(
                AlertLevel::Caution,
                format!("{}: low state of charge ({}%)", b.name, b.soc),
            );
        }
        if b.soh < LOW_SOH_PCT {
            push(
                AlertLevel::Warning,
                format!("{}: state of health degraded ({}%)", b.name, b.soh),
            );
        }
        if b.cell_balance == CellBalance::Unbalanced {
            push(
                AlertLevel::Caution,
                format!("{}: cell imbalance detected", b.name),
            );
        }
    }

    alerts
}
