//! Synthetic battery telemetry: record types, noise, generation, and alerting.

/// Threshold alert derivation.
pub mod alerts;
/// Snapshot generator.
pub mod generator;
pub mod noise;
pub mod types;

pub use alerts::derive_alerts;
pub use generator::TelemetryGenerator;
pub use noise::{MidpointNoise, Noise};
pub use types::{
    Alert, AlertLevel, BatteryRecord, BatteryStatus, CellBalance, Environment, SystemSnapshot,
    TotalStats,
};
