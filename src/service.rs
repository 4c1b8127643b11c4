//! Shared battery service: generator, history, prediction engine, and RNG.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::ServiceConfig;
use crate::error::AppError;
use crate::history::query::{self, HistoryView, Statistics};
use crate::history::History;
use crate::predict::{BatteryPrediction, PredictionEngine, PredictionInput, PredictionReport};
use crate::telemetry::{BatteryRecord, SystemSnapshot, TelemetryGenerator};

/// Mutable state guarded by one lock.
#[derive(Debug)]
struct ServiceState {
    rng: StdRng,
    history: History,
}

/// Owns everything the HTTP and WebSocket handlers share.
///
/// Generation and the history append happen under a single lock
/// acquisition, so concurrent callers never observe a history longer than
/// its capacity. The lock is never held across an `.await`.
#[derive(Debug)]
pub struct BatteryService {
    generator: TelemetryGenerator,
    engine: PredictionEngine,
    state: Mutex<ServiceState>,
}

impl BatteryService {
    /// Builds the service from a validated config.
    ///
    /// Seeds the RNG from `generator.seed`, or from the OS when unset.
    ///
    /// # Arguments
    ///
    /// * `config` - Generator, history, and model settings
    pub fn new(config: &ServiceConfig) -> Self {
        let rng = match config.generator.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            generator: TelemetryGenerator::new(config.generator.clone()),
            engine: PredictionEngine::new(config.model.clone()),
            state: Mutex::new(ServiceState {
                rng,
                history: History::new(config.history.capacity),
            }),
        }
    }

    pub fn generator(&self) -> &TelemetryGenerator {
        &self.generator
    }

    pub fn engine(&self) -> &PredictionEngine {
        &self.engine
    }

    fn lock(&self) -> MutexGuard<'_, ServiceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Generates a fresh snapshot and records it in the history.
    pub fn generate_snapshot(&self) -> SystemSnapshot {
        let mut state = self.lock();
        let snapshot = self.generator.generate(&mut state.rng, Utc::now());
        state.history.append(snapshot.clone());
        tracing::debug!(
            batteries = snapshot.batteries.len(),
            alerts = snapshot.alerts.len(),
            history_len = state.history.len(),
            "snapshot generated"
        );
        snapshot
    }

    /// Scores an existing snapshot.
    pub fn predict(&self, snapshot: &SystemSnapshot) -> PredictionReport {
        let mut state = self.lock();
        self.engine.predict(snapshot, &mut state.rng, Utc::now())
    }

    /// Scores caller-supplied inputs without touching the history.
    pub fn predict_inputs(&self, inputs: &[PredictionInput]) -> PredictionReport {
        let mut state = self.lock();
        self.engine.predict_inputs(inputs, &mut state.rng, Utc::now())
    }

    /// One battery from a fresh snapshot.
    ///
    /// The snapshot is recorded in the history like any other.
    ///
    /// # Errors
    ///
    /// [`AppError::NotFound`] when no battery has `id`.
    pub fn battery(&self, id: u32) -> Result<BatteryRecord, AppError> {
        self.generate_snapshot()
            .batteries
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound(format!("battery {id} not found")))
    }

    /// Prediction for one battery of a fresh snapshot.
    ///
    /// # Errors
    ///
    /// [`AppError::NotFound`] when no battery has `id`.
    pub fn predict_battery(&self, id: u32) -> Result<BatteryPrediction, AppError> {
        let record = self.battery(id)?;
        let mut state = self.lock();
        Ok(self
            .engine
            .predict_battery(&PredictionInput::from(&record), &mut state.rng, Utc::now()))
    }

    /// Last `limit` history entries, optionally for one battery.
    ///
    /// # Arguments
    ///
    /// * `battery_id` - Restrict the result to this unit's readings
    /// * `limit` - Maximum number of snapshots to look back over
    ///
    /// # Returns
    ///
    /// Whole snapshots, or timestamped records of one battery, oldest first.
    pub fn history(&self, battery_id: Option<u32>, limit: usize) -> HistoryView {
        query::query_history(&self.lock().history, battery_id, limit)
    }

    /// Statistics over the latest recorded snapshot.
    pub fn statistics(&self) -> Option<Statistics> {
        query::statistics(&self.lock().history)
    }

    pub fn history_len(&self) -> usize {
        self.lock().history.len()
    }

    /// Runs `f` with exclusive access to the service RNG.
    ///
    /// Used by the dashboard views that draw noise outside a snapshot.
    pub fn with_noise<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        f(&mut self.lock().rng)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::history::HistoryView;

    fn seeded(capacity: usize) -> BatteryService {
        let mut config = ServiceConfig::baseline();
        config.generator.seed = Some(7);
        config.history.capacity = capacity;
        BatteryService::new(&config)
    }

    #[test]
    fn generation_records_history() {
        let service = seeded(100);
        assert!(service.statistics().is_none());
        let snap = service.generate_snapshot();
        assert_eq!(service.history_len(), 1);
        let stats = service.statistics().unwrap();
        assert_eq!(stats.total_stats, snap.total_stats);
    }

    #[test]
    fn same_seed_same_first_snapshot() {
        let a = seeded(10).generate_snapshot();
        let b = seeded(10).generate_snapshot();
        // soc carries the wall-clock time factor; soh does not
        let soh = |s: &SystemSnapshot| s.batteries.iter().map(|b| b.soh).collect::<Vec<_>>();
        assert_eq!(soh(&a), soh(&b));
    }

    #[test]
    fn unknown_battery_is_not_found() {
        let service = seeded(10);
        assert!(matches!(service.battery(99), Err(AppError::NotFound(_))));
        assert!(matches!(
            service.predict_battery(0),
            Err(AppError::NotFound(_))
        ));
        assert_eq!(service.battery(2).unwrap().id, 2);
    }

    #[test]
    fn history_filter_returns_one_battery() {
        let service = seeded(10);
        for _ in 0..4 {
            service.generate_snapshot();
        }
        match service.history(Some(3), 2) {
            HistoryView::Battery(entries) => {
                assert_eq!(entries.len(), 2);
                assert!(entries.iter().all(|e| e.battery.id == 3));
            }
            other => panic!("expected battery entries, got {other:?}"),
        }
    }

    #[test]
    fn concurrent_generation_respects_capacity() {
        let service = Arc::new(seeded(25));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                thread::spawn(move || {
                    for _ in 0..20 {
                        service.generate_snapshot();
                        assert!(service.history_len() <= 25);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(service.history_len(), 25);
    }

    #[test]
    fn predict_covers_every_battery() {
        let service = seeded(10);
        let snap = service.generate_snapshot();
        let report = service.predict(&snap);
        assert_eq!(report.battery_predictions.len(), snap.batteries.len());
        assert_eq!(report.model_version, "1.0.0");
        assert_eq!(
            report.system_prediction.map(|s| s.total_batteries),
            Some(3)
        );
    }
}
