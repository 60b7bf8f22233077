//! Configuration loading and typed config structures for the Trinetra simulation.
//!
//! The canonical configuration lives in `trinetra-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads the file. Every section and
//! field is optional; missing values fall back to the reference constants of
//! the original dashboard backend.

use std::path::Path;

use serde::Deserialize;
use trinetra_types::Position;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an unusable simulation.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `trinetra-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Initial world layout (squadron, threats, seed).
    #[serde(default)]
    pub world: WorldConfig,

    /// Motion engine parameters.
    #[serde(default)]
    pub motion: MotionConfig,

    /// Detection engine parameters.
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Capacities of the bounded histories.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Tick cadences and error cooldown.
    #[serde(default)]
    pub scheduling: SchedulingConfig,

    /// Snapshot fan-out parameters.
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Observer HTTP server binding.
    #[serde(default)]
    pub server: ServerSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the server binding:
    /// - `TRINETRA_HOST` overrides `server.host`
    /// - `TRINETRA_PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.server.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that `serde` cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                reason: reason.to_owned(),
            })
        };
        if self.history.pulse_capacity == 0
            || self.history.event_capacity == 0
            || self.history.signal_capacity == 0
        {
            return invalid("history capacities must be at least 1");
        }
        if self.broadcast.channel_capacity == 0 {
            return invalid("broadcast.channel_capacity must be at least 1");
        }
        if self.scheduling.motion_interval_ms == 0 || self.scheduling.detection_interval_ms == 0 {
            return invalid("tick intervals must be at least 1ms");
        }
        let floats = [
            ("world.spawn_jitter", self.world.spawn_jitter),
            ("world.reset_jitter", self.world.reset_jitter),
            ("world.jet_speed", self.world.jet_speed),
            ("world.jet_origin.x", self.world.jet_origin.x),
            ("world.jet_origin.y", self.world.jet_origin.y),
            ("motion.jet_heading_jitter_deg", self.motion.jet_heading_jitter_deg),
            ("motion.threat_heading_jitter_deg", self.motion.threat_heading_jitter_deg),
            ("motion.fuel_decay_per_tick", self.motion.fuel_decay_per_tick),
            ("detection.km_per_unit", self.detection.km_per_unit),
            ("detection.near_km", self.detection.near_km),
            ("detection.mid_km", self.detection.mid_km),
            ("detection.strength_falloff_per_km", self.detection.strength_falloff_per_km),
            ("detection.lock_threshold", self.detection.lock_threshold),
            ("detection.frequency_min_ghz", self.detection.frequency_min_ghz),
            ("detection.frequency_max_ghz", self.detection.frequency_max_ghz),
        ];
        if let Some((name, _)) = floats.iter().find(|(_, value)| !value.is_finite()) {
            return invalid(format!("{name} must be finite").as_str());
        }
        for spawn in &self.world.threats {
            if !spawn.position.is_finite() || !spawn.speed.is_finite() {
                return invalid("world.threats entries must be finite");
            }
            if spawn.speed < 0.0 {
                return invalid("world.threats speeds must not be negative");
            }
        }

        let non_negative = [
            ("world.spawn_jitter", self.world.spawn_jitter),
            ("world.reset_jitter", self.world.reset_jitter),
            ("world.jet_speed", self.world.jet_speed),
            ("motion.jet_heading_jitter_deg", self.motion.jet_heading_jitter_deg),
            ("motion.threat_heading_jitter_deg", self.motion.threat_heading_jitter_deg),
            ("motion.fuel_decay_per_tick", self.motion.fuel_decay_per_tick),
            ("detection.near_km", self.detection.near_km),
        ];
        if let Some((name, _)) = non_negative.iter().find(|(_, value)| *value < 0.0) {
            return invalid(format!("{name} must not be negative").as_str());
        }
        if self.detection.km_per_unit <= 0.0 {
            return invalid("detection.km_per_unit must be positive");
        }
        if self.detection.strength_falloff_per_km <= 0.0 {
            return invalid("detection.strength_falloff_per_km must be positive");
        }
        if self.detection.frequency_min_ghz >= self.detection.frequency_max_ghz {
            return invalid("detection.frequency_min_ghz must be below frequency_max_ghz");
        }
        if self.detection.near_km >= self.detection.mid_km {
            return invalid("detection.near_km must be below detection.mid_km");
        }
        Ok(())
    }
}

/// Initial layout of the world.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Random seed. `None` seeds every RNG from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Number of jets in the squadron.
    #[serde(default = "default_jet_count")]
    pub jet_count: u32,

    /// Centre of the squadron's spawn box.
    #[serde(default = "default_jet_origin")]
    pub jet_origin: Position,

    /// Half-width of the spawn box used at startup.
    #[serde(default = "default_spawn_jitter")]
    pub spawn_jitter: f64,

    /// Half-width of the spawn box used on reset.
    #[serde(default = "default_reset_jitter")]
    pub reset_jitter: f64,

    /// Jet speed in map units per motion tick.
    #[serde(default = "default_jet_speed")]
    pub jet_speed: f64,

    /// Weapons loaded on each jet.
    #[serde(default = "default_jet_weapons")]
    pub jet_weapons: u32,

    /// Threat emitters, in creation order.
    #[serde(default = "default_threats")]
    pub threats: Vec<ThreatSpawn>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: None,
            jet_count: default_jet_count(),
            jet_origin: default_jet_origin(),
            spawn_jitter: default_spawn_jitter(),
            reset_jitter: default_reset_jitter(),
            jet_speed: default_jet_speed(),
            jet_weapons: default_jet_weapons(),
            threats: default_threats(),
        }
    }
}

/// Where a threat starts and how fast it moves.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThreatSpawn {
    /// Starting (and reset) position.
    pub position: Position,

    /// Speed in map units per motion tick.
    #[serde(default = "default_threat_speed")]
    pub speed: f64,
}

/// Motion engine parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MotionConfig {
    /// Maximum heading change per tick for jets, in degrees.
    #[serde(default = "default_jet_heading_jitter")]
    pub jet_heading_jitter_deg: f64,

    /// Maximum heading change per tick for threats, in degrees.
    #[serde(default = "default_threat_heading_jitter")]
    pub threat_heading_jitter_deg: f64,

    /// Fuel burned per tick by each jet.
    #[serde(default = "default_fuel_decay")]
    pub fuel_decay_per_tick: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            jet_heading_jitter_deg: default_jet_heading_jitter(),
            threat_heading_jitter_deg: default_threat_heading_jitter(),
            fuel_decay_per_tick: default_fuel_decay(),
        }
    }
}

/// Detection engine parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectionConfig {
    /// Scale factor from map units to kilometres.
    #[serde(default = "default_km_per_unit")]
    pub km_per_unit: f64,

    /// Distances below this are `NEAR`.
    #[serde(default = "default_near_km")]
    pub near_km: f64,

    /// Distances below this (and not near) are `MID`.
    #[serde(default = "default_mid_km")]
    pub mid_km: f64,

    /// Strength lost per kilometre, from a base of 100.
    #[serde(default = "default_strength_falloff")]
    pub strength_falloff_per_km: f64,

    /// Strength that must be exceeded to record a signal and lock.
    #[serde(default = "default_lock_threshold")]
    pub lock_threshold: f64,

    /// Lower bound of the randomized sensor frequency.
    #[serde(default = "default_frequency_min")]
    pub frequency_min_ghz: f64,

    /// Upper bound of the randomized sensor frequency.
    #[serde(default = "default_frequency_max")]
    pub frequency_max_ghz: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            km_per_unit: default_km_per_unit(),
            near_km: default_near_km(),
            mid_km: default_mid_km(),
            strength_falloff_per_km: default_strength_falloff(),
            lock_threshold: default_lock_threshold(),
            frequency_min_ghz: default_frequency_min(),
            frequency_max_ghz: default_frequency_max(),
        }
    }
}

/// Capacities of the bounded histories.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryConfig {
    /// Maximum retained detection pulses.
    #[serde(default = "default_pulse_capacity")]
    pub pulse_capacity: usize,

    /// Maximum retained event log entries.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Maximum retained signal records per jet.
    #[serde(default = "default_signal_capacity")]
    pub signal_capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            pulse_capacity: default_pulse_capacity(),
            event_capacity: default_event_capacity(),
            signal_capacity: default_signal_capacity(),
        }
    }
}

/// Tick cadences.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchedulingConfig {
    /// Milliseconds between motion ticks.
    #[serde(default = "default_motion_interval_ms")]
    pub motion_interval_ms: u64,

    /// Milliseconds between detection ticks.
    #[serde(default = "default_detection_interval_ms")]
    pub detection_interval_ms: u64,

    /// Pause after a failed tick before the loop resumes.
    #[serde(default = "default_error_cooldown_ms")]
    pub error_cooldown_ms: u64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            motion_interval_ms: default_motion_interval_ms(),
            detection_interval_ms: default_detection_interval_ms(),
            error_cooldown_ms: default_error_cooldown_ms(),
        }
    }
}

/// Snapshot fan-out parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BroadcastConfig {
    /// Snapshots buffered per subscriber before the oldest are dropped.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Observer HTTP server binding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSettings {
    /// Override the binding with environment variables when set.
    ///
    /// An unparseable `TRINETRA_PORT` is ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TRINETRA_HOST") {
            self.host = val;
        }
        if let Some(port) = std::env::var("TRINETRA_PORT")
            .ok()
            .and_then(|val| val.parse().ok())
        {
            self.port = port;
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_jet_count() -> u32 {
    5
}

const fn default_jet_origin() -> Position {
    Position::new(22.30, 84.80)
}

const fn default_spawn_jitter() -> f64 {
    0.1
}

const fn default_reset_jitter() -> f64 {
    0.05
}

const fn default_jet_speed() -> f64 {
    0.001
}

const fn default_jet_weapons() -> u32 {
    4
}

const fn default_threat_speed() -> f64 {
    0.0005
}

fn default_threats() -> Vec<ThreatSpawn> {
    vec![
        ThreatSpawn {
            position: Position::new(22.25, 84.85),
            speed: default_threat_speed(),
        },
        ThreatSpawn {
            position: Position::new(22.35, 84.83),
            speed: default_threat_speed(),
        },
    ]
}

const fn default_jet_heading_jitter() -> f64 {
    5.0
}

const fn default_threat_heading_jitter() -> f64 {
    2.0
}

const fn default_fuel_decay() -> f64 {
    0.05
}

const fn default_km_per_unit() -> f64 {
    111.0
}

const fn default_near_km() -> f64 {
    5.0
}

const fn default_mid_km() -> f64 {
    15.0
}

const fn default_strength_falloff() -> f64 {
    2.0
}

const fn default_lock_threshold() -> f64 {
    30.0
}

const fn default_frequency_min() -> f64 {
    8.0
}

const fn default_frequency_max() -> f64 {
    18.0
}

const fn default_pulse_capacity() -> usize {
    100
}

const fn default_event_capacity() -> usize {
    50
}

const fn default_signal_capacity() -> usize {
    200
}

const fn default_motion_interval_ms() -> u64 {
    500
}

const fn default_detection_interval_ms() -> u64 {
    1000
}

const fn default_error_cooldown_ms() -> u64 {
    1000
}

const fn default_channel_capacity() -> usize {
    16
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_reference_constants() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.jet_count, 5);
        assert_eq!(config.world.threats.len(), 2);
        assert_eq!(config.scheduling.motion_interval_ms, 500);
        assert_eq!(config.scheduling.detection_interval_ms, 1000);
        assert_eq!(config.history.pulse_capacity, 100);
        assert_eq!(config.history.event_capacity, 50);
        assert_eq!(config.detection.km_per_unit, 111.0);
        assert_eq!(config.detection.lock_threshold, 30.0);
        assert_eq!(config.motion.fuel_decay_per_tick, 0.05);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_partial_yaml_keeps_defaults() {
        let yaml = r"
world:
  seed: 7
  jet_count: 3
  threats:
    - position: { x: 1.0, y: 2.0 }
history:
  signal_capacity: 10
scheduling:
  motion_interval_ms: 250
logging:
  level: debug
  json: true
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.seed, Some(7));
        assert_eq!(config.world.jet_count, 3);
        assert_eq!(config.world.threats.len(), 1);
        assert_eq!(config.world.threats.first().unwrap().speed, 0.0005);
        assert_eq!(config.history.signal_capacity, 10);
        assert_eq!(config.history.pulse_capacity, 100);
        assert_eq!(config.scheduling.motion_interval_ms, 250);
        assert_eq!(config.scheduling.detection_interval_ms, 1000);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn empty_yaml_is_default() {
        let config = SimulationConfig::parse("{}").unwrap();
        assert_eq!(config.world, WorldConfig::default());
        assert_eq!(config.detection, DetectionConfig::default());
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        let result = SimulationConfig::parse("world: [not, a, map");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let result = SimulationConfig::parse("history:\n  pulse_capacity: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn negative_jitter_is_rejected() {
        let result = SimulationConfig::parse("motion:\n  jet_heading_jitter_deg: -1.0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        for yaml in [
            "detection:\n  frequency_min_ghz: .nan\n",
            "detection:\n  near_km: .nan\n",
            "detection:\n  lock_threshold: .inf\n",
            "motion:\n  fuel_decay_per_tick: .nan\n",
            "world:\n  jet_speed: .nan\n",
            "world:\n  threats:\n    - position: { x: .nan, y: 84.0 }\n",
        ] {
            let result = SimulationConfig::parse(yaml);
            assert!(
                matches!(result, Err(ConfigError::Invalid { ref reason }) if reason.contains("finite")),
                "{yaml}"
            );
        }
    }

    #[test]
    fn non_positive_scales_are_rejected() {
        for yaml in [
            "detection:\n  km_per_unit: -111.0\n",
            "detection:\n  km_per_unit: 0.0\n",
            "detection:\n  strength_falloff_per_km: -2.0\n",
        ] {
            let result = SimulationConfig::parse(yaml);
            assert!(
                matches!(result, Err(ConfigError::Invalid { ref reason }) if reason.contains("positive")),
                "{yaml}"
            );
        }
    }

    #[test]
    fn negative_speeds_are_rejected() {
        assert!(SimulationConfig::parse("world:\n  jet_speed: -0.001\n").is_err());
        let yaml = "world:\n  threats:\n    - position: { x: 22.0, y: 84.0 }\n      speed: -1.0\n";
        assert!(SimulationConfig::parse(yaml).is_err());
    }

    #[test]
    fn inverted_frequency_band_is_rejected() {
        let yaml = "detection:\n  frequency_min_ghz: 20.0\n  frequency_max_ghz: 10.0\n";
        let result = SimulationConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
