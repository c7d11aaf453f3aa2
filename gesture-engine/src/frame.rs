//! Raw IMU notification frames
//!
//! Layout of the sensor's notification payload (as relayed by the bridge when
//! it forwards binary messages):
//!
//! | bytes  | content                               |
//! |--------|---------------------------------------|
//! | 0..10  | header, ignored                       |
//! | 10..16 | accel x, y, z: big-endian `i16`, ±16 g |
//! | 16..22 | gyro x, y, z: big-endian `i16`, ±2000 °/s |
//!
//! Trailing bytes beyond 22 are ignored.

use gesture_common::Vec3;

use crate::codec::SampleUpdate;
use crate::error::DecodeError;

pub const FRAME_LEN: usize = 22;

const ACCEL_OFFSET: usize = 10;
const GYRO_OFFSET: usize = 16;

/// Full-scale ±16 g over the signed 16-bit range
pub const ACCEL_SCALE: f32 = 16.0 / 32768.0;

/// Full-scale ±2000 °/s over the signed 16-bit range
pub const GYRO_SCALE: f32 = 2000.0 / 32768.0;

fn read_i16_be(bytes: &[u8], offset: usize) -> i16 {
    i16::from_be_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_vec3(bytes: &[u8], offset: usize, scale: f32) -> Vec3 {
    Vec3::new(
        f32::from(read_i16_be(bytes, offset)) * scale,
        f32::from(read_i16_be(bytes, offset + 2)) * scale,
        f32::from(read_i16_be(bytes, offset + 4)) * scale,
    )
}

/// Decode one binary frame into a complete sample update
pub fn decode_frame(bytes: &[u8]) -> Result<SampleUpdate, DecodeError> {
    if bytes.len() < FRAME_LEN {
        return Err(DecodeError::TruncatedFrame { len: bytes.len() });
    }

    Ok(SampleUpdate {
        acceleration: Some(read_vec3(bytes, ACCEL_OFFSET, ACCEL_SCALE)),
        gyro: Some(read_vec3(bytes, GYRO_OFFSET, GYRO_SCALE)),
    })
}
