//! Wire message builders

use gesture_common::config::GestureConfig;
use gesture_engine::WireMessage;

/// Defaults except for short timings:
/// calibration 0.5s, reconnect 5s, connect timeout 2s
pub fn test_config() -> GestureConfig {
    let mut config = GestureConfig::default();
    config.calibration.duration_secs = 0.5;
    config.link.reconnect_interval_secs = 5.0;
    config.link.connect_timeout_secs = 2.0;
    config
}

/// Bridge-style sample message
pub fn reading(accel: (f32, f32, f32), gyro: (f32, f32, f32)) -> WireMessage {
    WireMessage::Text(
        serde_json::json!({
            "acceleration": { "x": accel.0, "y": accel.1, "z": accel.2 },
            "gyro": { "x": gyro.0, "y": gyro.1, "z": gyro.2 },
        })
        .to_string(),
    )
}

/// Sensor at rest with the given acceleration on +X (vertical by default)
pub fn rest(vertical: f32) -> WireMessage {
    reading((vertical, 0.0, 0.0), (0.0, 0.0, 0.0))
}
