//! The age axis - mapping horizontal position to age.

use serde::{Deserialize, Serialize};

/// Youngest representable age.
pub const AGE_MIN: i32 = 0;

/// Oldest representable age.
pub const AGE_MAX: i32 = 99;

/// Axis bounds anchoring the age interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeAxis {
    pub start_x: f32,
    pub end_x: f32,
    pub start_age: i32,
    pub end_age: i32,
}

impl AgeAxis {
    pub fn new(start_x: f32, end_x: f32, start_age: i32, end_age: i32) -> Self {
        Self {
            start_x,
            end_x,
            start_age,
            end_age,
        }
    }
}

/// Linearly interpolate the age at `x`.
///
/// No clamping happens here: retime clamps to [0, 99], while initial
/// placement deliberately allows extrapolated ages beyond the anchors.
/// The same formula governs every age derivation site. A degenerate axis
/// yields the start age.
pub fn age_at(x: f32, axis: &AgeAxis) -> i32 {
    let span = axis.end_x - axis.start_x;
    if span == 0.0 {
        return axis.start_age;
    }
    let fraction = (x - axis.start_x) / span;
    let age = axis.start_age as f32 + fraction * (axis.end_age - axis.start_age) as f32;
    age.round() as i32
}

/// Interpolate and clamp into `[AGE_MIN, AGE_MAX]`. Used by retime.
pub fn clamped_age_at(x: f32, axis: &AgeAxis) -> i32 {
    age_at(x, axis).clamp(AGE_MIN, AGE_MAX)
}
