//! Yaw math. All angles are in degrees, yaw 0 faces +Z and yaw 90 faces +X.

use bevy_math::{Vec2, Vec3};

/// Shortest signed difference from `current` to `target`, in `(-180, 180]`.
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let mut delta = (target - current).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

/// Wraps any angle into `[0, 360)`.
pub fn normalize_yaw(yaw: f32) -> f32 {
    let yaw = yaw.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if yaw >= 360.0 { 0.0 } else { yaw }
}

/// Critically damped spring toward `target`, taking the short way around.
///
/// `velocity` is the filter's memory and must be carried between calls.
/// Never overshoots the target. A non-positive `dt` leaves everything as is.
pub fn smooth_damp_angle(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    dt: f32,
) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    let target = current + delta_angle(current, target);

    let smooth_time = smooth_time.max(1.0e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    // Padé-style approximation of e^-x
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = (output - target) / dt;
    }
    output
}

/// Heading of a planar direction, `x` right and `y` forward.
pub fn heading_of(direction: Vec2) -> f32 {
    direction.x.atan2(direction.y).to_degrees()
}

/// Unit vector on the ground plane for `yaw`.
pub fn forward_for_yaw(yaw: f32) -> Vec3 {
    let (sin, cos) = yaw.to_radians().sin_cos();
    Vec3::new(sin, 0.0, cos)
}

/// Yaw of a world-space direction, ignoring its vertical part.
pub fn yaw_of(direction: Vec3) -> f32 {
    direction.x.atan2(direction.z).to_degrees()
}
