//! Gesture event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two gesture classes the engine recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureKind {
    /// Strong vertical acceleration spike (foot slammed down)
    Stomp,
    /// Forward acceleration with rotation about the lateral or vertical axis
    Kick,
}

impl GestureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GestureKind::Stomp => "stomp",
            GestureKind::Kick => "kick",
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GestureKind {
    type Err = String;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stomp" => Ok(GestureKind::Stomp),
            "kick" => Ok(GestureKind::Kick),
            other => Err(other.to_string()),
        }
    }
}

/// Where a gesture was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureOrigin {
    /// Classified locally from raw samples
    Classified,
    /// Arrived pre-classified from the bridge
    Remote,
}

/// A detected gesture, fanned out to subscribers exactly once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub kind: GestureKind,
    /// Seconds on the session clock (or the bridge's clock for remote events)
    pub timestamp: f64,
    pub origin: GestureOrigin,
    /// Wall-clock time the event was constructed
    pub detected_at: DateTime<Utc>,
}

impl GestureEvent {
    pub fn classified(kind: GestureKind, timestamp: f64) -> Self {
        Self {
            kind,
            timestamp,
            origin: GestureOrigin::Classified,
            detected_at: crate::time::now(),
        }
    }

    pub fn remote(kind: GestureKind, timestamp: f64) -> Self {
        Self {
            kind,
            timestamp,
            origin: GestureOrigin::Remote,
            detected_at: crate::time::now(),
        }
    }
}
