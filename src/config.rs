//! TOML-based service configuration and preset definitions.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Top-level service configuration parsed from TOML.
///
/// All sections have defaults matching the `default` preset. Load from
/// TOML with [`ServiceConfig::from_toml_file`] or use
/// [`ServiceConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Telemetry generator baselines.
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// In-memory snapshot history.
    #[serde(default)]
    pub history: HistoryConfig,
    /// WebSocket feed cadence.
    #[serde(default)]
    pub stream: StreamConfig,
    /// Prediction model metadata.
    #[serde(default)]
    pub model: ModelConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `"0.0.0.0:8000"`.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Telemetry generator baselines.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Number of battery units per snapshot (must be > 0).
    pub battery_count: u32,
    /// Nominal cell voltage (V).
    pub base_voltage: f64,
    /// Nominal pack temperature (°C).
    pub base_temperature: f64,
    /// Prefix for unit names, e.g. `"Plant"` gives `"Plant Unit 1"`.
    pub site_name: String,
    /// Random seed. `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            battery_count: 3,
            base_voltage: 3.7,
            base_temperature: 25.0,
            site_name: "Plant".to_string(),
            seed: None,
        }
    }
}

/// In-memory snapshot history.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Maximum number of retained snapshots (must be > 0).
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: crate::history::DEFAULT_CAPACITY,
        }
    }
}

/// WebSocket feed cadence.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamConfig {
    /// Delay between frames in milliseconds (must be > 0).
    pub interval_ms: u64,
}

impl StreamConfig {
    /// Frame interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}

/// Prediction model metadata reported alongside predictions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub version: String,
    /// Reported accuracy in `[0, 1]`.
    pub accuracy: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            accuracy: 0.92,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"generator.battery_count"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ServiceConfig {
    /// Returns the default configuration: three units at 3.7 V and 25 °C.
    pub fn baseline() -> Self {
        Self {
            server: ServerConfig::default(),
            generator: GeneratorConfig::default(),
            history: HistoryConfig::default(),
            stream: StreamConfig::default(),
            model: ModelConfig::default(),
        }
    }

    /// Returns the hot-site preset: a warm enclosure where most samples
    /// cross the high-temperature alert threshold.
    pub fn hot_site() -> Self {
        Self {
            generator: GeneratorConfig {
                base_temperature: 38.0,
                site_name: "Hot Site".to_string(),
                ..GeneratorConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["default", "hot_site"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::baseline()),
            "hot_site" => Ok(Self::hot_site()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Parses `server.bind` into a socket address.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind.parse().map_err(|e| {
            ConfigError::new(
                "server.bind",
                format!("invalid socket address \"{}\": {e}", self.server.bind),
            )
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Err(e) = self.bind_addr() {
            errors.push(e);
        }

        let g = &self.generator;
        if g.battery_count == 0 {
            errors.push(ConfigError::new("generator.battery_count", "must be > 0"));
        }
        if !(g.base_voltage.is_finite() && g.base_voltage > 0.0) {
            errors.push(ConfigError::new("generator.base_voltage", "must be > 0"));
        }
        if !g.base_temperature.is_finite() {
            errors.push(ConfigError::new("generator.base_temperature", "must be finite"));
        }

        if self.history.capacity == 0 {
            errors.push(ConfigError::new("history.capacity", "must be > 0"));
        }
        if self.stream.interval_ms == 0 {
            errors.push(ConfigError::new("stream.interval_ms", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.model.accuracy) {
            errors.push(ConfigError::new("model.accuracy", "must be in [0.0, 1.0]"));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ServiceConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn baseline_matches_generator_constants() {
        let cfg = ServiceConfig::baseline();
        assert_eq!(cfg.generator.battery_count, 3);
        assert_eq!(cfg.generator.base_voltage, 3.7);
        assert_eq!(cfg.generator.base_temperature, 25.0);
        assert_eq!(cfg.history.capacity, 100);
        assert_eq!(cfg.stream.interval(), Duration::from_secs(1));
    }

    #[test]
    fn from_preset_unknown() {
        let err = ServiceConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
        assert_eq!(e.field, "preset");
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[server]
bind = "127.0.0.1:9000"

[generator]
battery_count = 5
base_voltage = 3.6
base_temperature = 20.0
site_name = "North"
seed = 7

[history]
capacity = 50

[stream]
interval_ms = 250

[model]
version = "2.0.0"
accuracy = 0.8
"#;
        let cfg = ServiceConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.generator.battery_count), Some(5));
        assert_eq!(cfg.as_ref().and_then(|c| c.generator.seed), Some(7));
        assert_eq!(cfg.as_ref().map(|c| c.history.capacity), Some(50));
        assert_eq!(cfg.as_ref().map(|c| &*c.model.version), Some("2.0.0"));
        assert_eq!(
            cfg.as_ref().and_then(|c| c.bind_addr().ok()),
            Some("127.0.0.1:9000".parse().unwrap())
        );
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[generator]
battery_count = 3
bogus_field = true
"#;
        let result = ServiceConfig::from_toml_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn validation_catches_zero_batteries() {
        let mut cfg = ServiceConfig::baseline();
        cfg.generator.battery_count = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "generator.battery_count"));
    }

    #[test]
    fn validation_catches_bad_bind() {
        let mut cfg = ServiceConfig::baseline();
        cfg.server.bind = "not an address".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "server.bind"));
    }

    #[test]
    fn validation_reports_every_violation() {
        let mut cfg = ServiceConfig::baseline();
        cfg.history.capacity = 0;
        cfg.stream.interval_ms = 0;
        cfg.model.accuracy = 1.5;
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["history.capacity", "stream.interval_ms", "model.accuracy"]
        );
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ServiceConfig::PRESETS {
            let cfg = ServiceConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn hot_site_runs_warmer() {
        let base = ServiceConfig::baseline();
        let hot = ServiceConfig::hot_site();
        assert!(hot.generator.base_temperature > base.generator.base_temperature);
        assert_eq!(hot.generator.battery_count, base.generator.battery_count);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[generator]
seed = 99
"#;
        let cfg = ServiceConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        // seed overridden
        assert_eq!(cfg.as_ref().and_then(|c| c.generator.seed), Some(99));
        // battery count kept default
        assert_eq!(cfg.as_ref().map(|c| c.generator.battery_count), Some(3));
        // stream kept default
        assert_eq!(cfg.as_ref().map(|c| c.stream.interval_ms), Some(1000));
    }
}
