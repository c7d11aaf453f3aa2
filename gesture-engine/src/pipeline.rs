//! Per-session processing pipeline
//!
//! Single owner of the decoder, sample assembler, calibrator and classifier.
//! The link's receive loop feeds every inbound message through
//! [`GesturePipeline::handle_message`] in wire order and publishes the
//! returned events once the pipeline lock is released.

use gesture_common::config::GestureConfig;
use gesture_common::{GestureEvent, GestureKind, Sample};
use tracing::{debug, info};

use crate::calibrator::{Baseline, Calibrator};
use crate::classifier::MotionClassifier;
use crate::codec::{Inbound, MessageDecoder, SampleAssembler, WireMessage};
use crate::error::DecodeError;

#[derive(Debug)]
pub struct GesturePipeline {
    decoder: MessageDecoder,
    assembler: SampleAssembler,
    calibrator: Calibrator,
    classifier: MotionClassifier,
    calibration_secs: f64,
    emit_both_per_tick: bool,
    /// Session time of the previous calibration tick
    last_tick: Option<f64>,
}

impl GesturePipeline {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            decoder: MessageDecoder::new(config.decoding.keyword_fallback),
            assembler: SampleAssembler::new(),
            calibrator: Calibrator::new(),
            classifier: MotionClassifier::from_config(&config.detection),
            calibration_secs: config.calibration.duration_secs,
            emit_both_per_tick: config.detection.emit_both_per_tick,
            last_tick: None,
        }
    }

    /// Discard the current baseline and collect a new one starting at `now`
    ///
    /// Called on every successful connect; the previous baseline is not
    /// trusted across a gap in the stream. Cooldowns carry over, so a gesture
    /// just before recalibration still suppresses a repeat just after it.
    pub fn start_calibration(&mut self, now: f64) {
        self.classifier.clear_baseline();
        self.assembler = SampleAssembler::new();
        self.calibrator.start(self.calibration_secs);
        self.last_tick = Some(now);
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibrator.is_active()
    }

    pub fn is_calibrated(&self) -> bool {
        self.classifier.baseline().is_some()
    }

    pub fn baseline(&self) -> Option<Baseline> {
        self.classifier.baseline().copied()
    }

    /// Decode one message received at session time `now` and run it through
    /// calibration or classification
    ///
    /// Returns the gesture events to publish, in order. A decode error leaves
    /// the pipeline untouched.
    pub fn handle_message(
        &mut self,
        message: &WireMessage,
        now: f64,
    ) -> Result<Vec<GestureEvent>, DecodeError> {
        match self.decoder.decode(message)? {
            Inbound::Sample(update) => {
                let sample = self.assembler.assemble(&update, now);
                Ok(self.process_sample(&sample))
            }
            Inbound::Remote(remote) => {
                let timestamp = remote.timestamp.unwrap_or(now);
                info!(kind = %remote.kind, at = timestamp, "Remote gesture received");
                Ok(vec![GestureEvent::remote(remote.kind, timestamp)])
            }
            Inbound::Control(control) => {
                debug!(control = %control, "Bridge control message");
                Ok(Vec::new())
            }
        }
    }

    /// Calibrate on or classify a complete sample, using its timestamp as
    /// the session time
    pub fn process_sample(&mut self, sample: &Sample) -> Vec<GestureEvent> {
        let now = sample.timestamp;
        let dt = now - self.last_tick.unwrap_or(now);
        self.last_tick = Some(now);

        if self.calibrator.is_active() {
            if let Some(baseline) = self.calibrator.feed(sample, dt) {
                self.classifier.set_baseline(baseline);
            }
            return Vec::new();
        }

        let mut events = Vec::with_capacity(2);
        if let Some(event) = self.classifier.classify(sample, now) {
            let follow_up = self.emit_both_per_tick && event.kind == GestureKind::Stomp;
            events.push(event);
            if follow_up {
                events.extend(self.classifier.classify(sample, now));
            }
        }
        events
    }
}
