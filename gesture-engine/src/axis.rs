//! Axis mapping
//!
//! Resolves logical axes to signed raw channels so that device mounting
//! orientation is configuration, never code. The same mapping is applied to
//! acceleration and angular-rate vectors.

use gesture_common::{AxisMap, AxisSelector, Vec3};

/// Read the signed channel named by `selector`
pub fn resolve(selector: AxisSelector, v: Vec3) -> f32 {
    match selector {
        AxisSelector::PosX => v.x,
        AxisSelector::PosY => v.y,
        AxisSelector::PosZ => v.z,
        AxisSelector::NegX => -v.x,
        AxisSelector::NegY => -v.y,
        AxisSelector::NegZ => -v.z,
    }
}

/// A vector expressed along the body axes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyAxes {
    pub vertical: f32,
    pub forward: f32,
    pub lateral: f32,
}

/// Project a raw vector onto the body axes described by `map`
pub fn project(map: &AxisMap, v: Vec3) -> BodyAxes {
    BodyAxes {
        vertical: resolve(map.vertical, v),
        forward: resolve(map.forward, v),
        lateral: resolve(map.lateral, v),
    }
}
