//! # IMU Gesture Common Library
//!
//! Shared code for the gesture engine and the host applications embedding it:
//! - Motion data types (Vec3, Sample, axis selectors)
//! - Gesture and connection event types
//! - GestureDispatcher fan-out hub
//! - Configuration loading (TOML + environment)
//! - Tracing initialisation helpers

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod motion;
pub mod time;

pub use error::{Error, Result};
pub use events::{
    ConnectionState, GestureDispatcher, GestureEvent, GestureKind, GestureOrigin, SubscriptionId,
};
pub use motion::{AxisMap, AxisSelector, Sample, Vec3};
