use chrono::{DateTime, Utc};

use super::alerts::derive_alerts;
use super::noise::Noise;
use super::types::{
    BatteryRecord, BatteryStatus, CellBalance, Environment, SystemSnapshot, TotalStats,
};
use crate::config::GeneratorConfig;
use crate::rounding::round_to;

/// Rated capacity of every simulated unit (kW).
pub const CAPACITY_RATED_KW: f64 = 99.54;
/// Probability that a unit is reported as under inspection.
pub const INSPECTION_PROBABILITY: f64 = 0.1;
/// Probability that a unit reports unbalanced cells.
pub const UNBALANCED_PROBABILITY: f64 = 0.2;

/// Produces synthetic plant snapshots.
///
/// Every field is re-drawn on each call; nothing carries over between
/// snapshots. A slow drift term derived from the wall clock (see
/// [`time_factor`]) is layered over the per-call noise on voltage and SOC.
#[derive(Debug, Clone)]
pub struct TelemetryGenerator {
    config: GeneratorConfig,
}

impl TelemetryGenerator {
    /// Creates a generator with the given baselines.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Returns the generator baselines.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Builds one snapshot stamped at `now`, including total stats and alerts.
    pub fn generate<N: Noise + ?Sized>(&self, noise: &mut N, now: DateTime<Utc>) -> SystemSnapshot {
        let tf = time_factor(now);
        let batteries: Vec<BatteryRecord> = (1..=self.config.battery_count)
            .map(|id| self.battery(id, tf, noise))
            .collect();

        let environment = Environment {
            outdoor_temperature: round_to(12.0 + noise.uniform(-2.0, 2.0), 1),
            humidity: round_to(94.0 + noise.uniform(-5.0, 5.0), 0),
            weather: "clear".to_string(),
        };

        let total_stats = TotalStats::from_batteries(&batteries);
        let alerts = derive_alerts(&batteries, now);

        SystemSnapshot {
            timestamp: now,
            batteries,
            total_stats,
            alerts,
            environment,
        }
    }

    fn battery<N: Noise + ?Sized>(&self, id: u32, tf: f64, noise: &mut N) -> BatteryRecord {
        let base_v = self.config.base_voltage;
        let base_t = self.config.base_temperature;

        let status = if noise.chance(INSPECTION_PROBABILITY) {
            BatteryStatus::UnderInspection
        } else {
            BatteryStatus::Normal
        };

        let voltage = round_to(base_v + noise.uniform(-0.2, 0.2) + tf * 0.1, 2);
        let current = round_to(noise.uniform(0.5, 2.5), 2);
        let temperature = round_to(base_t + noise.uniform(-5.0, 15.0), 2);
        let soc = round_to(85.0 + noise.uniform(-10.0, 10.0) - tf * 5.0, 1);
        let soh = round_to(95.0 + noise.uniform(-5.0, 2.0), 1);
        let capacity_current = round_to(77.48 + noise.uniform(-5.0, 5.0), 2);
        let power_current = round_to(30.3 + noise.uniform(-10.0, 10.0), 2);
        let power_peak = round_to(12.3 + noise.uniform(-2.0, 2.0), 2);
        let energy_today = round_to(169.10 + noise.uniform(-10.0, 10.0), 2);
        let energy_total = round_to(150.0 + f64::from(id) * 10.0 + noise.uniform(0.0, 10.0), 2);
        let runtime = format!("{}.{}h", noise.integer(1, 3), noise.integer(10, 99));
        let cycle_count = noise.integer(50, 100);
        let internal_resistance = round_to(noise.uniform(10.0, 30.0), 1);

        let cell_balance = if noise.chance(UNBALANCED_PROBABILITY) {
            CellBalance::Unbalanced
        } else {
            CellBalance::Balanced
        };

        BatteryRecord {
            id,
            name: format!("{} Unit {id}", self.config.site_name),
            status,
            voltage,
            voltage_max: round_to(base_v * 1.2, 2),
            voltage_min: round_to(base_v * 0.8, 2),
            current,
            temperature,
            soc,
            soh,
            capacity_current,
            capacity_rated: CAPACITY_RATED_KW,
            power_current,
            power_peak,
            energy_today,
            energy_total,
            runtime,
            cycle_count,
            internal_resistance,
            cell_balance,
        }
    }
}

/// Slow drift term in `[0, 1)`: wall-clock seconds modulo 100, divided by 100.
///
/// Constant within a millisecond, it wraps every 100 seconds.
pub fn time_factor(now: DateTime<Utc>) -> f64 {
    now.timestamp_millis().rem_euclid(100_000) as f64 / 100_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::noise::MidpointNoise;
    use chrono::TimeZone;
    use rand::{SeedableRng, rngs::StdRng};

    fn generator() -> TelemetryGenerator {
        TelemetryGenerator::new(GeneratorConfig::default())
    }

    fn at_secs(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    #[test]
    fn time_factor_wraps_every_hundred_seconds() {
        assert_eq!(time_factor(at_secs(1_700_000_000)), 0.0);
        assert_eq!(time_factor(at_secs(1_700_000_050)), 0.5);
        assert_eq!(time_factor(at_secs(1_700_000_100)), 0.0);
    }

    #[test]
    fn snapshot_has_configured_battery_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let snap = generator().generate(&mut rng, Utc::now());
        assert_eq!(snap.batteries.len(), 3);
        let ids: Vec<u32> = snap.batteries.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn fields_stay_within_perturbation_ranges() {
        let mut rng = StdRng::seed_from_u64(99);
        let g = generator();
        for i in 0..200 {
            let snap = g.generate(&mut rng, at_secs(1_700_000_000 + i * 7));
            for b in &snap.batteries {
                assert!((70.0..=95.0).contains(&b.soc), "soc {}", b.soc);
                assert!((90.0..=97.0).contains(&b.soh), "soh {}", b.soh);
                assert!((20.0..=40.0).contains(&b.temperature), "temp {}", b.temperature);
                assert!((3.5..=4.0).contains(&b.voltage), "voltage {}", b.voltage);
                assert!((50..=100).contains(&b.cycle_count));
                assert!(b.runtime.ends_with('h'));
                assert_ne!(b.status, BatteryStatus::Failed);
            }
        }
    }

    #[test]
    fn total_stats_match_batteries() {
        let mut rng = StdRng::seed_from_u64(5);
        let snap = generator().generate(&mut rng, Utc::now());
        let mean_soc: f64 =
            snap.batteries.iter().map(|b| b.soc).sum::<f64>() / snap.batteries.len() as f64;
        assert!((snap.total_stats.average_soc - mean_soc).abs() <= 0.05 + 1e-9);
        let total_power: f64 = snap.batteries.iter().map(|b| b.power_current).sum();
        assert!((snap.total_stats.total_power - total_power).abs() < 1e-6);
    }

    #[test]
    fn midpoint_noise_gives_baseline_values() {
        let snap = generator().generate(&mut MidpointNoise, at_secs(1_700_000_000));
        let b = &snap.batteries[0];
        assert_eq!(b.voltage, 3.7);
        assert_eq!(b.current, 1.5);
        assert_eq!(b.temperature, 30.0);
        assert_eq!(b.soc, 85.0);
        assert_eq!(b.soh, 93.5);
        assert_eq!(b.cycle_count, 75);
        assert_eq!(b.runtime, "2.54h");
        assert_eq!(b.status, BatteryStatus::Normal);
        assert_eq!(b.cell_balance, CellBalance::Balanced);
        assert_eq!(b.voltage_max, 4.44);
        assert_eq!(b.voltage_min, 2.96);
        assert_eq!(snap.environment.humidity, 94.0);
        assert!(snap.alerts.is_empty());
    }

    #[test]
    fn hot_site_raises_temperature_alerts() {
        let config = GeneratorConfig {
            base_temperature: 38.0,
            ..GeneratorConfig::default()
        };
        let snap = TelemetryGenerator::new(config).generate(&mut MidpointNoise, Utc::now());
        assert_eq!(snap.alerts.len(), 3);
        assert!(snap.alerts.iter().all(|a| a.message.contains("high temperature")));
    }
}
