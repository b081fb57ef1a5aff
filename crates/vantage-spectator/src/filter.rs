//! Motion filters for the spectator trajectory.

use glam::{Quat, Vec3};

/// Floor for smoothing time constants. Keeps the filters defined for
/// non-positive configuration values.
pub const MIN_SMOOTH_TIME: f32 = 1e-4;

/// Critically-damped spring toward `target`.
///
/// `velocity` is the filter's accumulator and must persist between calls.
/// The output approaches the target without overshoot; `smooth_time` is
/// roughly the time to cover most of the remaining distance.
pub fn smooth_damp(
    current: Vec3,
    target: Vec3,
    velocity: &mut Vec3,
    smooth_time: f32,
    dt: f32,
) -> Vec3 {
    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    // Pade-style approximation of e^-x, stable for the step sizes a frame
    // callback produces.
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;

    // Clamp any numerical overshoot past the target.
    if (target - current).dot(output - target) > 0.0 {
        output = target;
        *velocity = Vec3::ZERO;
    }
    output
}

/// Exponential spherical interpolation toward `target`.
///
/// The blend factor is `1 - e^(-dt / smooth_time)` with the time constant
/// floored at [`MIN_SMOOTH_TIME`], so a zero or negative configuration
/// value degenerates to an immediate snap instead of a division fault.
pub fn damp_slerp(current: Quat, target: Quat, smooth_time: f32, dt: f32) -> Quat {
    let t = 1.0 - (-dt / smooth_time.max(MIN_SMOOTH_TIME)).exp();
    current.slerp(target, t)
}
