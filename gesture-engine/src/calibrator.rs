//! Baseline calibration
//!
//! Collects a fixed-duration window of at-rest acceleration samples and
//! averages them into the reference vector subtracted from live samples
//! (removes gravity and mounting bias).
//!
//! One-shot state machine: `Idle --start--> Collecting --window full--> Idle`.
//! The first completed window defines the baseline; there is no outlier
//! rejection. After a connection loss the owner must call `start` again.

use gesture_common::{Sample, Vec3};
use tracing::{debug, info};

/// At-rest reference acceleration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub reference: Vec3,
}

/// In-progress calibration window
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationState {
    pub elapsed: f64,
    pub samples: Vec<Vec3>,
    pub target_duration: f64,
}

/// Fixed-window baseline calibrator
#[derive(Debug, Default)]
pub struct Calibrator {
    /// `None` while inert
    state: Option<CalibrationState>,
}

impl Calibrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the buffer and begin a new window of `target_duration` seconds
    pub fn start(&mut self, target_duration: f64) {
        debug!(target_duration, "Calibration started, keep the sensor still");
        self.state = Some(CalibrationState {
            elapsed: 0.0,
            samples: Vec::new(),
            target_duration,
        });
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&CalibrationState> {
        self.state.as_ref()
    }

    /// Append a sample and advance the window by `dt` seconds
    ///
    /// Returns the baseline exactly once, on the sample that completes the
    /// window; afterwards the calibrator is inert until `start` is called.
    pub fn feed(&mut self, sample: &Sample, dt: f64) -> Option<Baseline> {
        let state = self.state.as_mut()?;

        state.samples.push(sample.acceleration);
        if dt.is_finite() && dt > 0.0 {
            state.elapsed += dt;
        }

        if state.elapsed < state.target_duration {
            return None;
        }

        let finished = self.state.take()?;
        let reference = Vec3::mean(&finished.samples)?;
        info!(
            samples = finished.samples.len(),
            elapsed = finished.elapsed,
            baseline = %reference,
            "Calibration complete"
        );
        Some(Baseline { reference })
    }
}
