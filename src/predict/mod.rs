//! Rule-based battery diagnostics.
//!
//! [`PredictionEngine`] turns a [`SystemSnapshot`](crate::telemetry::SystemSnapshot)
//! or a batch of caller-supplied [`BatteryReading`]s into a [`PredictionReport`].

pub mod engine;
pub mod input;
pub mod system;
pub mod types;

pub use engine::PredictionEngine;
pub use input::{BatteryReading, PredictionInput, resolve_all};
pub use system::system_recommendation;
pub use types::{
    AnomalyType, BatteryPrediction, ChargingRecommendation, FailureRisk, HealthGrade,
    PredictionReport, SystemHealth, SystemPrediction,
};
