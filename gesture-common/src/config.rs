//! Configuration loading and resolution
//!
//! Session configuration is a single TOML document. Every key has a built-in
//! default, so a missing file or a partial file still yields a usable
//! configuration.
//!
//! # Resolution priority
//!
//! 1. Explicit path passed by the host application
//! 2. `IMU_GESTURE_CONFIG` environment variable
//! 3. `<config_dir>/imu-gesture/config.toml` (platform config directory)
//! 4. Built-in defaults
//!
//! After loading, `IMU_GESTURE_ENDPOINT` overrides `link.endpoint`.
//!
//! ```toml
//! [link]
//! endpoint = "127.0.0.1:8765"
//! reconnect_interval_secs = 5.0
//!
//! [detection]
//! stomp_threshold = 5.0
//! kick_threshold = 3.0
//! cooldown_secs = 0.5
//!
//! [detection.axes]
//! vertical = "+X"
//! forward = "+Z"
//! lateral = "+Y"
//!
//! [calibration]
//! duration_secs = 3.0
//! ```

use crate::motion::AxisMap;
use crate::time::secs_to_duration;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "IMU_GESTURE_CONFIG";

/// Environment variable overriding the link endpoint
pub const ENDPOINT_ENV: &str = "IMU_GESTURE_ENDPOINT";

/// Complete session configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GestureConfig {
    #[serde(default)]
    pub link: LinkConfig,

    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default)]
    pub calibration: CalibrationConfig,

    #[serde(default)]
    pub decoding: DecodingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Sensor bridge connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Bridge address, `host:port` (an optional `tcp://` prefix is accepted)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Connect as soon as the session starts
    #[serde(default = "default_true")]
    pub auto_connect: bool,

    /// Delay between a lost/failed connection and the next attempt
    #[serde(default = "default_reconnect_interval_secs")]
    pub reconnect_interval_secs: f64,

    /// Upper bound on a single connection attempt
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: f64,

    /// Longest accepted inbound message
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

/// Gesture classification settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Relative vertical acceleration that must be exceeded for a stomp
    #[serde(default = "default_stomp_threshold")]
    pub stomp_threshold: f32,

    /// Forward acceleration that must be exceeded for a kick; half of it is
    /// the angular-rate threshold
    #[serde(default = "default_kick_threshold")]
    pub kick_threshold: f32,

    /// Minimum spacing between two gestures of the same class
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: f64,

    /// Deliver both a stomp and a kick when one sample qualifies for both
    #[serde(default = "default_true")]
    pub emit_both_per_tick: bool,

    #[serde(default)]
    pub axes: AxisMap,
}

/// Baseline calibration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Length of the at-rest window averaged into the baseline
    #[serde(default = "default_calibration_secs")]
    pub duration_secs: f64,
}

/// Inbound message decoding settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecodingConfig {
    /// Treat non-JSON text containing "stomp"/"kick" as a remote gesture
    #[serde(default)]
    pub keyword_fallback: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_endpoint() -> String {
    "127.0.0.1:8765".to_string()
}

fn default_true() -> bool {
    true
}

fn default_reconnect_interval_secs() -> f64 {
    5.0
}

fn default_connect_timeout_secs() -> f64 {
    5.0
}

fn default_max_message_bytes() -> usize {
    4096
}

fn default_stomp_threshold() -> f32 {
    5.0
}

fn default_kick_threshold() -> f32 {
    3.0
}

fn default_cooldown_secs() -> f64 {
    0.5
}

fn default_calibration_secs() -> f64 {
    3.0
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            auto_connect: true,
            reconnect_interval_secs: default_reconnect_interval_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

impl LinkConfig {
    pub fn reconnect_interval(&self) -> Duration {
        secs_to_duration(self.reconnect_interval_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        secs_to_duration(self.connect_timeout_secs)
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            stomp_threshold: default_stomp_threshold(),
            kick_threshold: default_kick_threshold(),
            cooldown_secs: default_cooldown_secs(),
            emit_both_per_tick: true,
            axes: AxisMap::default(),
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_calibration_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl GestureConfig {
    /// Parse a TOML document and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GestureConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "Loaded gesture configuration");
        Ok(config)
    }

    /// Resolve configuration following the documented priority order
    ///
    /// An explicit or env-named file that cannot be loaded is an error. A
    /// missing default-location file falls back to built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit {
            Self::load(path)?
        } else if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            Self::load(Path::new(&path))?
        } else {
            match default_config_path() {
                Some(path) if path.exists() => Self::load(&path)?,
                _ => {
                    warn!("No gesture configuration file found, using built-in defaults");
                    GestureConfig::default()
                }
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides on top of file values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            if !endpoint.trim().is_empty() {
                info!(endpoint = %endpoint, "Link endpoint overridden from environment");
                self.link.endpoint = endpoint.trim().to_string();
            }
        }
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.link.endpoint.trim().is_empty() {
            return Err(Error::Config("link.endpoint must not be empty".to_string()));
        }
        if !is_positive(self.link.reconnect_interval_secs) {
            return Err(Error::Config(format!(
                "link.reconnect_interval_secs must be positive, got {}",
                self.link.reconnect_interval_secs
            )));
        }
        if !is_positive(self.link.connect_timeout_secs) {
            return Err(Error::Config(format!(
                "link.connect_timeout_secs must be positive, got {}",
                self.link.connect_timeout_secs
            )));
        }
        if self.link.max_message_bytes == 0 {
            return Err(Error::Config("link.max_message_bytes must be non-zero".to_string()));
        }
        if !is_positive(f64::from(self.detection.stomp_threshold)) {
            return Err(Error::Config(format!(
                "detection.stomp_threshold must be positive, got {}",
                self.detection.stomp_threshold
            )));
        }
        if !is_positive(f64::from(self.detection.kick_threshold)) {
            return Err(Error::Config(format!(
                "detection.kick_threshold must be positive, got {}",
                self.detection.kick_threshold
            )));
        }
        if !(self.detection.cooldown_secs.is_finite() && self.detection.cooldown_secs >= 0.0) {
            return Err(Error::Config(format!(
                "detection.cooldown_secs must not be negative, got {}",
                self.detection.cooldown_secs
            )));
        }
        if !is_positive(self.calibration.duration_secs) {
            return Err(Error::Config(format!(
                "calibration.duration_secs must be positive, got {}",
                self.calibration.duration_secs
            )));
        }
        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Platform default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("imu-gesture").join("config.toml"))
}
