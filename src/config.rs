//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::controller::DEFAULT_MAX_ADVANCE;
use crate::sim::types::{BatteryParams, ControllerParams, PV_SOURCE, WIND_SOURCE};

/// Top-level scenario configuration parsed from TOML.
///
/// Sections fall back to their defaults when omitted. Load from TOML with
/// [`ScenarioConfig::from_toml_file`] or use [`ScenarioConfig::baseline`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Replay window and host step hints.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Controller parameters.
    #[serde(default)]
    pub controller: ControllerConfig,
    /// Connection snapshots, each active from its `from` time on.
    #[serde(default)]
    pub snapshots: Vec<SnapshotConfig>,
}

/// Replay window and host step hints.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// First step time.
    pub start: u64,
    /// Exclusive end time (must be > start).
    pub end: u64,
    /// `max_advance` passed to every step.
    pub max_advance: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start: 0,
            end: 60,
            max_advance: DEFAULT_MAX_ADVANCE,
        }
    }
}

/// Controller parameters as written in the scenario file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// Step size added to each step time (must be > 0).
    pub time_step_size: u64,
    /// Selector switches to 1 strictly after this time.
    pub load_switch_time: u64,
    /// Source id of the PV model.
    pub pv_source: String,
    /// Source id of the wind model.
    pub wind_source: String,
    /// Minimum battery state of charge (%).
    pub soc_min: f32,
    /// Maximum battery state of charge (%).
    pub soc_max: f32,
    /// Maximum battery power (kW).
    pub max_p: f32,
    /// Battery operation flag.
    pub battery_active: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        let battery = BatteryParams::default();
        Self {
            time_step_size: 1,
            load_switch_time: 40,
            pv_source: PV_SOURCE.to_string(),
            wind_source: WIND_SOURCE.to_string(),
            soc_min: battery.soc_min,
            soc_max: battery.soc_max,
            max_p: battery.max_p,
            battery_active: battery.battery_active,
        }
    }
}

impl ControllerConfig {
    /// Builds runtime controller parameters.
    pub fn to_params(&self) -> ControllerParams {
        ControllerParams {
            time_step_size: self.time_step_size,
            load_switch_time: self.load_switch_time,
            pv_source: self.pv_source.clone(),
            wind_source: self.wind_source.clone(),
            battery: BatteryParams {
                soc_min: self.soc_min,
                soc_max: self.soc_max,
                max_p: self.max_p,
                battery_active: self.battery_active,
            },
        }
    }
}

/// One connection snapshot in the scenario timeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotConfig {
    /// Time from which this snapshot is in effect.
    #[serde(default)]
    pub from: u64,
    /// Connector ids per model.
    pub values: Vec<Vec<String>>,
    /// Owning model id per entry.
    pub sources: Vec<String>,
}

impl SnapshotConfig {
    fn new(from: u64, values: Vec<Vec<String>>, sources: &[&str]) -> Self {
        Self {
            from,
            values,
            sources: sources.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn ids(connectors: &[&str]) -> Vec<String> {
    connectors.iter().map(|s| s.to_string()).collect()
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.end"`).
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

impl ScenarioConfig {
    /// PV and wind start apart and are wired together from t=20.
    pub fn baseline() -> Self {
        let sources = [PV_SOURCE, WIND_SOURCE, "Battery-0"];
        Self {
            simulation: SimulationConfig::default(),
            controller: ControllerConfig::default(),
            snapshots: vec![
                SnapshotConfig::new(
                    0,
                    vec![ids(&["led-1"]), ids(&["led-2"]), ids(&["led-3"])],
                    &sources,
                ),
                SnapshotConfig::new(
                    20,
                    vec![ids(&["led-1"]), ids(&["led-1", "led-2"]), ids(&["led-3"])],
                    &sources,
                ),
            ],
        }
    }

    /// No shared connectors at any time.
    pub fn disconnected() -> Self {
        Self {
            snapshots: vec![SnapshotConfig::new(
                0,
                vec![ids(&["led-1"]), ids(&["led-2"]), ids(&["led-3"])],
                &[PV_SOURCE, WIND_SOURCE, "Battery-0"],
            )],
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["storymode", "disconnected"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "storymode" => Ok(Self::baseline()),
            "disconnected" => Ok(Self::disconnected()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let s = &self.simulation;
        if s.end <= s.start {
            errors.push(ConfigError::new("simulation.end", "must be > simulation.start"));
        }

        let c = &self.controller;
        if c.time_step_size == 0 {
            errors.push(ConfigError::new("controller.time_step_size", "must be > 0"));
        }
        if c.pv_source == c.wind_source {
            errors.push(ConfigError::new(
                "controller.wind_source",
                "must differ from controller.pv_source",
            ));
        }
        for (field, soc) in [("controller.soc_min", c.soc_min), ("controller.soc_max", c.soc_max)] {
            if !(0.0..=100.0).contains(&soc) {
                errors.push(ConfigError::new(field, "must be in [0.0, 100.0]"));
            }
        }
        if c.soc_min > c.soc_max {
            errors.push(ConfigError::new("controller.soc_min", "must be <= controller.soc_max"));
        }
        if c.max_p.is_nan() || c.max_p < 0.0 {
            errors.push(ConfigError::new("controller.max_p", "must be >= 0"));
        }

        if self.snapshots.is_empty() {
            errors.push(ConfigError::new("snapshots", "at least one snapshot is required"));
        }
        for (i, snap) in self.snapshots.iter().enumerate() {
            if snap.values.len() != snap.sources.len() {
                errors.push(ConfigError::new(
                    format!("snapshots[{i}].sources"),
                    format!(
                        "has {} entries but values has {}",
                        snap.sources.len(),
                        snap.values.len()
                    ),
                ));
            }
            if i > 0 && snap.from <= self.snapshots[i - 1].from {
                errors.push(ConfigError::new(
                    format!("snapshots[{i}].from"),
                    "must be greater than the previous snapshot's from",
                ));
            }
        }

        errors
    }
}
