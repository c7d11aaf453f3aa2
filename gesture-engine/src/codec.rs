//! Inbound message decoding
//!
//! The bridge speaks JSON over a message-oriented stream. Two payload shapes
//! are seen in practice and both are accepted without the caller knowing
//! which arrived:
//!
//! - Sample: `{"acceleration":{"x":..,"y":..,"z":..}, "gyro":{..}}`, either
//!   sub-object optional
//! - Remote gesture: `{"motion_type":"stomp"|"kick", "timestamp":..}`
//!   (older bridges send `action` instead of `motion_type`)
//!
//! Decoding order: sample shape, then remote-gesture shape, then control
//! replies (`{"response":"pong"}`), then, if enabled, a keyword scan of
//! non-JSON text.

use gesture_common::{GestureKind, Sample, Vec3};
use serde::Deserialize;

use crate::error::DecodeError;
use crate::frame;

/// One transport-level message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireMessage {
    Text(String),
    Binary(Vec<u8>),
}

impl From<&str> for WireMessage {
    fn from(text: &str) -> Self {
        WireMessage::Text(text.to_string())
    }
}

impl From<String> for WireMessage {
    fn from(text: String) -> Self {
        WireMessage::Text(text)
    }
}

/// Partial sensor reading; `None` means "unchanged since the last message"
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SampleUpdate {
    pub acceleration: Option<Vec3>,
    pub gyro: Option<Vec3>,
}

/// Gesture already classified by the bridge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoteGesture {
    pub kind: GestureKind,
    pub timestamp: Option<f64>,
}

/// Decoded message
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Sample(SampleUpdate),
    Remote(RemoteGesture),
    /// Bridge control traffic (ping replies and the like); carries no motion
    Control(String),
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    acceleration: Option<Vec3>,
    gyro: Option<Vec3>,
    motion_type: Option<String>,
    action: Option<String>,
    timestamp: Option<f64>,
    response: Option<String>,
    command: Option<String>,
}

/// Stateless message decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageDecoder {
    keyword_fallback: bool,
}

impl MessageDecoder {
    pub fn new(keyword_fallback: bool) -> Self {
        Self { keyword_fallback }
    }

    pub fn decode(&self, message: &WireMessage) -> Result<Inbound, DecodeError> {
        match message {
            WireMessage::Text(text) => self.decode_text(text),
            WireMessage::Binary(bytes) => frame::decode_frame(bytes).map(Inbound::Sample),
        }
    }

    pub fn decode_text(&self, text: &str) -> Result<Inbound, DecodeError> {
        let raw: RawMessage = match serde_json::from_str(text) {
            Ok(raw) => raw,
            Err(e) => {
                if self.keyword_fallback {
                    if let Some(kind) = scan_keywords(text) {
                        return Ok(Inbound::Remote(RemoteGesture { kind, timestamp: None }));
                    }
                }
                return Err(DecodeError::MalformedMessage(e.to_string()));
            }
        };

        if raw.acceleration.is_some() || raw.gyro.is_some() {
            return Ok(Inbound::Sample(SampleUpdate {
                acceleration: raw.acceleration,
                gyro: raw.gyro,
            }));
        }

        if let Some(motion) = raw.motion_type.or(raw.action) {
            let kind = motion
                .parse::<GestureKind>()
                .map_err(DecodeError::UnknownMotionType)?;
            return Ok(Inbound::Remote(RemoteGesture {
                kind,
                timestamp: raw.timestamp,
            }));
        }

        if let Some(control) = raw.response.or(raw.command) {
            return Ok(Inbound::Control(control));
        }

        Err(DecodeError::MalformedMessage(
            "no acceleration, gyro or motion_type field".to_string(),
        ))
    }
}

fn scan_keywords(text: &str) -> Option<GestureKind> {
    let lowered = text.to_ascii_lowercase();
    if lowered.contains("stomp") {
        Some(GestureKind::Stomp)
    } else if lowered.contains("kick") {
        Some(GestureKind::Kick)
    } else {
        None
    }
}

/// Merges partial updates into complete samples
///
/// A message carrying only one sub-object reuses the other vector from the
/// previous message.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleAssembler {
    acceleration: Vec3,
    gyro: Vec3,
}

impl SampleAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assemble(&mut self, update: &SampleUpdate, timestamp: f64) -> Sample {
        if let Some(acceleration) = update.acceleration {
            self.acceleration = acceleration;
        }
        if let Some(gyro) = update.gyro {
            self.gyro = gyro;
        }
        Sample::new(self.acceleration, self.gyro, timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder() -> MessageDecoder {
        MessageDecoder::new(false)
    }

    #[test]
    fn test_decode_full_sample() {
        let inbound = decoder()
            .decode_text(r#"{"acceleration":{"x":1.0,"y":2.0,"z":3.0},"gyro":{"x":0.5,"y":0.0,"z":-0.5}}"#)
            .expect("sample decodes");
        assert_eq!(
            inbound,
            Inbound::Sample(SampleUpdate {
                acceleration: Some(Vec3::new(1.0, 2.0, 3.0)),
                gyro: Some(Vec3::new(0.5, 0.0, -0.5)),
            })
        );
    }

    #[test]
    fn test_decode_bridge_sample_with_raw_dump() {
        let inbound = decoder()
            .decode_text(r#"{"acceleration":{"x":0.1,"y":0.2,"z":0.98},"gyro":{"x":0,"y":0,"z":0},"raw":"55-aa-01"}"#)
            .expect("extra fields are ignored");
        assert!(matches!(inbound, Inbound::Sample(_)));
    }

    #[test]
    fn test_decode_partial_sample() {
        let inbound = decoder()
            .decode_text(r#"{"gyro":{"x":3.0}}"#)
            .expect("gyro-only sample decodes");
        assert_eq!(
            inbound,
            Inbound::Sample(SampleUpdate {
                acceleration: None,
                gyro: Some(Vec3::new(3.0, 0.0, 0.0)),
            })
        );
    }

    #[test]
    fn test_decode_remote_event_case_insensitive() {
        let inbound = decoder()
            .decode_text(r#"{"motion_type":"STOMP","timestamp":12.25}"#)
            .expect("remote event decodes");
        assert_eq!(
            inbound,
            Inbound::Remote(RemoteGesture {
                kind: GestureKind::Stomp,
                timestamp: Some(12.25),
            })
        );
    }

    #[test]
    fn test_decode_legacy_action_field() {
        let inbound = decoder()
            .decode_text(r#"{"action":"kick"}"#)
            .expect("legacy event decodes");
        assert_eq!(
            inbound,
            Inbound::Remote(RemoteGesture {
                kind: GestureKind::Kick,
                timestamp: None,
            })
        );
    }

    #[test]
    fn test_unknown_motion_type() {
        let result = decoder().decode_text(r#"{"motion_type":"jump"}"#);
        assert_eq!(result, Err(DecodeError::UnknownMotionType("jump".to_string())));
    }

    #[test]
    fn test_control_reply() {
        let inbound = decoder()
            .decode_text(r#"{"response":"pong"}"#)
            .expect("control decodes");
        assert_eq!(inbound, Inbound::Control("pong".to_string()));
    }

    #[test]
    fn test_malformed_messages() {
        assert!(matches!(
            decoder().decode_text("not json"),
            Err(DecodeError::MalformedMessage(_))
        ));
        assert!(matches!(
            decoder().decode_text(r#"{"temperature":21.5}"#),
            Err(DecodeError::MalformedMessage(_))
        ));
        assert!(matches!(
            decoder().decode_text(r#"{"acceleration":"fast"}"#),
            Err(DecodeError::MalformedMessage(_))
        ));
    }

    #[test]
    fn test_keyword_fallback_only_when_enabled() {
        let text = "EVENT STOMP detected";
        assert!(decoder().decode_text(text).is_err());

        let inbound = MessageDecoder::new(true)
            .decode_text(text)
            .expect("keyword scan enabled");
        assert_eq!(
            inbound,
            Inbound::Remote(RemoteGesture {
                kind: GestureKind::Stomp,
                timestamp: None,
            })
        );
        assert!(MessageDecoder::new(true).decode_text("garbage").is_err());
    }

    #[test]
    fn test_binary_messages_use_frame_layout() {
        let result = decoder().decode(&WireMessage::Binary(vec![0u8; 4]));
        assert_eq!(result, Err(DecodeError::TruncatedFrame { len: 4 }));
    }

    #[test]
    fn test_assembler_keeps_previous_vectors() {
        let mut assembler = SampleAssembler::new();
        let first = assembler.assemble(
            &SampleUpdate {
                acceleration: Some(Vec3::new(1.0, 0.0, 0.0)),
                gyro: Some(Vec3::new(0.0, 2.0, 0.0)),
            },
            0.0,
        );
        let second = assembler.assemble(
            &SampleUpdate {
                acceleration: Some(Vec3::new(5.0, 0.0, 0.0)),
                gyro: None,
            },
            0.1,
        );

        assert_eq!(first.gyro, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(second.acceleration, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(second.gyro, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(second.timestamp, 0.1);
    }
}
