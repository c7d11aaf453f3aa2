//! Motion data types
//!
//! Vectors, decoded IMU samples, and the signed axis selectors that map the
//! logical body axes (vertical, forward, lateral) onto raw sensor channels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Neg, Sub};
use std::str::FromStr;

use crate::Error;

/// Three-component vector in sensor coordinates
///
/// Components missing from an inbound JSON object default to `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Arithmetic mean of a set of vectors, `None` for an empty set
    pub fn mean(values: &[Vec3]) -> Option<Vec3> {
        if values.is_empty() {
            return None;
        }
        let sum = values.iter().fold(Vec3::ZERO, |acc, v| acc + *v);
        Some(sum / values.len() as f32)
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Div<f32> for Vec3 {
    type Output = Vec3;

    fn div(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// One decoded IMU reading
///
/// `timestamp` is seconds on the session clock (monotonic, starts at zero
/// when the link client is created).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub acceleration: Vec3,
    pub gyro: Vec3,
    pub timestamp: f64,
}

impl Sample {
    pub fn new(acceleration: Vec3, gyro: Vec3, timestamp: f64) -> Self {
        Self {
            acceleration,
            gyro,
            timestamp,
        }
    }
}

/// Signed raw sensor channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AxisSelector {
    PosX,
    PosY,
    PosZ,
    NegX,
    NegY,
    NegZ,
}

impl AxisSelector {
    pub const ALL: [AxisSelector; 6] = [
        AxisSelector::PosX,
        AxisSelector::PosY,
        AxisSelector::PosZ,
        AxisSelector::NegX,
        AxisSelector::NegY,
        AxisSelector::NegZ,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AxisSelector::PosX => "+X",
            AxisSelector::PosY => "+Y",
            AxisSelector::PosZ => "+Z",
            AxisSelector::NegX => "-X",
            AxisSelector::NegY => "-Y",
            AxisSelector::NegZ => "-Z",
        }
    }
}

impl Neg for AxisSelector {
    type Output = AxisSelector;

    fn neg(self) -> AxisSelector {
        match self {
            AxisSelector::PosX => AxisSelector::NegX,
            AxisSelector::PosY => AxisSelector::NegY,
            AxisSelector::PosZ => AxisSelector::NegZ,
            AxisSelector::NegX => AxisSelector::PosX,
            AxisSelector::NegY => AxisSelector::PosY,
            AxisSelector::NegZ => AxisSelector::PosZ,
        }
    }
}

impl fmt::Display for AxisSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AxisSelector {
    type Err = Error;

    /// Accepts `X`, `+X`, `-X`, `NegativeX` (any case)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let (negative, channel) = if let Some(rest) = normalized.strip_prefix("negative") {
            (true, rest)
        } else if let Some(rest) = normalized.strip_prefix('-') {
            (true, rest)
        } else if let Some(rest) = normalized.strip_prefix('+') {
            (false, rest)
        } else {
            (false, normalized.as_str())
        };

        let positive = match channel {
            "x" => AxisSelector::PosX,
            "y" => AxisSelector::PosY,
            "z" => AxisSelector::PosZ,
            _ => {
                return Err(Error::InvalidInput(format!(
                    "unknown axis selector '{}' (expected X, Y, Z with optional sign)",
                    s
                )))
            }
        };

        Ok(if negative { -positive } else { positive })
    }
}

impl TryFrom<String> for AxisSelector {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AxisSelector> for String {
    fn from(value: AxisSelector) -> Self {
        value.as_str().to_string()
    }
}

/// Mounting orientation: which raw channel each logical axis reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisMap {
    #[serde(default = "default_vertical")]
    pub vertical: AxisSelector,
    #[serde(default = "default_forward")]
    pub forward: AxisSelector,
    #[serde(default = "default_lateral")]
    pub lateral: AxisSelector,
}

fn default_vertical() -> AxisSelector {
    AxisSelector::PosX
}

fn default_forward() -> AxisSelector {
    AxisSelector::PosZ
}

fn default_lateral() -> AxisSelector {
    AxisSelector::PosY
}

impl Default for AxisMap {
    fn default() -> Self {
        Self {
            vertical: default_vertical(),
            forward: default_forward(),
            lateral: default_lateral(),
        }
    }
}
