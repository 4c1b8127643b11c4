//! Simulated battery telemetry with rule-based health predictions.

#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod history;
pub mod logging;
pub mod predict;
pub mod rounding;
pub mod service;
/// Synthetic telemetry generation and threshold alerts.
pub mod telemetry;
