//! Validated inputs to the prediction engine.

use serde::Deserialize;

use crate::error::AppError;
use crate::telemetry::{BatteryRecord, CellBalance};

/// The battery fields the prediction engine reads.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionInput {
    pub id: u32,
    pub name: String,
    pub soc: f64,
    pub soh: f64,
    pub temperature: f64,
    pub voltage: f64,
    pub current: f64,
    pub cycle_count: u32,
    pub capacity_rated: f64,
    pub cell_balance: CellBalance,
}

impl From<&BatteryRecord> for PredictionInput {
    fn from(b: &BatteryRecord) -> Self {
        Self {
            id: b.id,
            name: b.name.clone(),
            soc: b.soc,
            soh: b.soh,
            temperature: b.temperature,
            voltage: b.voltage,
            current: b.current,
            cycle_count: b.cycle_count,
            capacity_rated: b.capacity_rated,
            cell_balance: b.cell_balance,
        }
    }
}

/// A caller-supplied battery reading where every measurement is optional.
///
/// [`BatteryReading::resolve`] substitutes these defaults for absent fields:
///
/// | field | default |
/// |---|---|
/// | `name` | `"Battery {id}"` |
/// | `soc` | 50 % |
/// | `soh` | 100 % |
/// | `temperature` | 25 °C |
/// | `voltage` | 3.7 V |
/// | `current` | 0 A |
/// | `cycle_count` | 0 |
/// | `capacity_rated` | 100 kW |
/// | `cell_balance` | balanced |
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatteryReading {
    pub id: u32,
    pub name: Option<String>,
    pub soc: Option<f64>,
    pub soh: Option<f64>,
    pub temperature: Option<f64>,
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub cycle_count: Option<u32>,
    pub capacity_rated: Option<f64>,
    pub cell_balance: Option<CellBalance>,
}

impl BatteryReading {
    /// Fills documented defaults and checks ranges.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] if any measurement is non-finite, or
    /// `soc`/`soh` fall outside `[0, 100]`, or `capacity_rated` is negative.
    pub fn resolve(self) -> Result<PredictionInput, AppError> {
        let input = PredictionInput {
            name: self.name.unwrap_or_else(|| format!("Battery {}", self.id)),
            id: self.id,
            soc: self.soc.unwrap_or(50.0),
            soh: self.soh.unwrap_or(100.0),
            temperature: self.temperature.unwrap_or(25.0),
            voltage: self.voltage.unwrap_or(3.7),
            current: self.current.unwrap_or(0.0),
            cycle_count: self.cycle_count.unwrap_or(0),
            capacity_rated: self.capacity_rated.unwrap_or(100.0),
            cell_balance: self.cell_balance.unwrap_or(CellBalance::Balanced),
        };

        for (field, value) in [
            ("soc", input.soc),
            ("soh", input.soh),
            ("temperature", input.temperature),
            ("voltage", input.voltage),
            ("current", input.current),
            ("capacity_rated", input.capacity_rated),
        ] {
            if !value.is_finite() {
                return Err(AppError::BadRequest(format!(
                    "battery {}: {field} must be finite",
                    input.id
                )));
            }
        }
        for (field, value) in [("soc", input.soc), ("soh", input.soh)] {
            if !(0.0..=100.0).contains(&value) {
                return Err(AppError::BadRequest(format!(
                    "battery {}: {field} must be in [0, 100], got {value}",
                    input.id
                )));
            }
        }
        if input.capacity_rated < 0.0 {
            return Err(AppError::BadRequest(format!(
                "battery {}: capacity_rated must be >= 0",
                input.id
            )));
        }

        Ok(input)
    }
}

/// Resolves a batch of readings, failing on the first invalid one.
///
/// # Errors
///
/// Propagates the first [`BatteryReading::resolve`] error.
pub fn resolve_all(readings: Vec<BatteryReading>) -> Result<Vec<PredictionInput>, AppError> {
    readings.into_iter().map(BatteryReading::resolve).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::fixtures::battery;

    #[test]
    fn empty_reading_gets_documented_defaults() {
        let input = BatteryReading {
            id: 4,
            ..BatteryReading::default()
        }
        .resolve()
        .unwrap();
        assert_eq!(input.name, "Battery 4");
        assert_eq!(input.soc, 50.0);
        assert_eq!(input.soh, 100.0);
        assert_eq!(input.temperature, 25.0);
        assert_eq!(input.voltage, 3.7);
        assert_eq!(input.cycle_count, 0);
        assert_eq!(input.capacity_rated, 100.0);
        assert_eq!(input.cell_balance, CellBalance::Balanced);
    }

    #[test]
    fn supplied_fields_are_kept() {
        let input = BatteryReading {
            id: 1,
            soh: Some(72.5),
            cell_balance: Some(CellBalance::Unbalanced),
            ..BatteryReading::default()
        }
        .resolve()
        .unwrap();
        assert_eq!(input.soh, 72.5);
        assert_eq!(input.cell_balance, CellBalance::Unbalanced);
    }

    #[test]
    fn rejects_out_of_range_soc() {
        let err = BatteryReading {
            id: 2,
            soc: Some(140.0),
            ..BatteryReading::default()
        }
        .resolve()
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains("soc")));
    }

    #[test]
    fn rejects_non_finite_values() {
        let err = BatteryReading {
            id: 2,
            temperature: Some(f64::NAN),
            ..BatteryReading::default()
        }
        .resolve()
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains("temperature")));
    }

    #[test]
    fn resolve_all_fails_fast() {
        let readings = vec![
            BatteryReading {
                id: 1,
                ..BatteryReading::default()
            },
            BatteryReading {
                id: 2,
                soh: Some(-1.0),
                ..BatteryReading::default()
            },
        ];
        assert!(resolve_all(readings).is_err());
    }

    #[test]
    fn record_conversion_copies_fields() {
        let record = battery(7, 42.0, 88.0, 31.0);
        let input = PredictionInput::from(&record);
        assert_eq!(input.id, 7);
        assert_eq!(input.soc, 42.0);
        assert_eq!(input.capacity_rated, 99.54);
    }
}
