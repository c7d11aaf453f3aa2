//! Motion classification
//!
//! Per-sample threshold rules over baseline-relative acceleration and raw
//! angular rate, debounced per gesture class by a cooldown.
//!
//! - **Stomp:** `|vertical accel| > stomp_threshold`
//! - **Kick:** `forward accel > kick_threshold` and
//!   (`|lateral gyro| > kick_threshold / 2` or `|vertical gyro| > kick_threshold / 2`)
//!
//! All comparisons are strict. Stomp is evaluated first and returns
//! immediately when it fires, so a sample qualifying for both yields the kick
//! on a second `classify` call with the same sample and time.

use gesture_common::config::DetectionConfig;
use gesture_common::{AxisMap, GestureEvent, GestureKind, Sample};
use tracing::{debug, info};

use crate::axis::project;
use crate::calibrator::Baseline;

/// Last accepted detection time per gesture class
#[derive(Debug, Clone, PartialEq)]
pub struct CooldownTracker {
    last_stomp_time: Option<f64>,
    last_kick_time: Option<f64>,
    cooldown: f64,
}

impl CooldownTracker {
    pub fn new(cooldown: f64) -> Self {
        Self {
            last_stomp_time: None,
            last_kick_time: None,
            cooldown,
        }
    }

    fn slot(&self, kind: GestureKind) -> Option<f64> {
        match kind {
            GestureKind::Stomp => self.last_stomp_time,
            GestureKind::Kick => self.last_kick_time,
        }
    }

    pub fn last_time(&self, kind: GestureKind) -> Option<f64> {
        self.slot(kind)
    }

    /// True when more than `cooldown` seconds have passed since the last
    /// accepted detection of `kind` (or there has been none)
    pub fn is_ready(&self, kind: GestureKind, now: f64) -> bool {
        match self.slot(kind) {
            Some(last) => now - last > self.cooldown,
            None => true,
        }
    }

    /// Record an accepted detection; timestamps never move backwards
    pub fn record(&mut self, kind: GestureKind, now: f64) {
        let slot = match kind {
            GestureKind::Stomp => &mut self.last_stomp_time,
            GestureKind::Kick => &mut self.last_kick_time,
        };
        *slot = Some(slot.map_or(now, |last| last.max(now)));
    }
}

/// Stomp/kick classifier owning the session baseline and cooldowns
#[derive(Debug)]
pub struct MotionClassifier {
    axes: AxisMap,
    stomp_threshold: f32,
    kick_threshold: f32,
    baseline: Option<Baseline>,
    cooldowns: CooldownTracker,
}

impl MotionClassifier {
    pub fn new(axes: AxisMap, stomp_threshold: f32, kick_threshold: f32, cooldown: f64) -> Self {
        Self {
            axes,
            stomp_threshold,
            kick_threshold,
            baseline: None,
            cooldowns: CooldownTracker::new(cooldown),
        }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(
            config.axes,
            config.stomp_threshold,
            config.kick_threshold,
            config.cooldown_secs,
        )
    }

    pub fn set_baseline(&mut self, baseline: Baseline) {
        self.baseline = Some(baseline);
    }

    /// Drop the baseline; classification is a no-op until a new one is set
    pub fn clear_baseline(&mut self) {
        self.baseline = None;
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    /// Classify one sample at session time `now`
    ///
    /// Returns at most one event. `None` when no baseline is available.
    pub fn classify(&mut self, sample: &Sample, now: f64) -> Option<GestureEvent> {
        let baseline = self.baseline?;

        let relative = sample.acceleration - baseline.reference;
        let accel = project(&self.axes, relative);
        let gyro = project(&self.axes, sample.gyro);

        if accel.vertical.abs() > self.stomp_threshold {
            if self.cooldowns.is_ready(GestureKind::Stomp, now) {
                self.cooldowns.record(GestureKind::Stomp, now);
                info!(vertical_accel = accel.vertical, at = now, "Stomp detected");
                return Some(GestureEvent::classified(GestureKind::Stomp, now));
            }
            debug!(at = now, "Stomp suppressed by cooldown");
        }

        let rate_threshold = self.kick_threshold / 2.0;
        if accel.forward > self.kick_threshold
            && (gyro.lateral.abs() > rate_threshold || gyro.vertical.abs() > rate_threshold)
        {
            if self.cooldowns.is_ready(GestureKind::Kick, now) {
                self.cooldowns.record(GestureKind::Kick, now);
                info!(
                    forward_accel = accel.forward,
                    lateral_gyro = gyro.lateral,
                    vertical_gyro = gyro.vertical,
                    at = now,
                    "Kick detected"
                );
                return Some(GestureEvent::classified(GestureKind::Kick, now));
            }
            debug!(at = now, "Kick suppressed by cooldown");
        }

        None
    }
}
