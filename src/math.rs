use std::f32::consts::{E, PI};

use glam::{Quat, Vec3A};

use crate::consts::threshold;

/// Sign of `f` as a multiplier, with zero counted as positive
#[inline]
#[must_use]
pub fn posneg(f: f32) -> f32 {
    if f < 0.0 { -1.0 } else { 1.0 }
}

#[inline]
#[must_use]
pub fn posneg_vec(v: Vec3A) -> Vec3A {
    Vec3A::new(posneg(v.x), posneg(v.y), posneg(v.z))
}

#[inline]
#[must_use]
pub fn any_abs_ge(v: Vec3A, threshold: f32) -> bool {
    v.abs().cmpge(Vec3A::splat(threshold)).any()
}

#[inline]
#[must_use]
pub fn any_abs_gt(v: Vec3A, threshold: f32) -> bool {
    v.abs().cmpgt(Vec3A::splat(threshold)).any()
}

/// Exponential decay `e^(-t/ts)`.
///
/// Returns exactly 1 for `t <= 0` and snaps to 0 once the factor drops under the stiction threshold,
/// so a decaying motor eventually releases the body completely.
#[must_use]
pub fn decay(t: f32, timescale: f32) -> f32 {
    if t <= 0.0 {
        return 1.0;
    }

    let factor = (-t / timescale).exp();
    if factor < threshold::STICTION_FACTOR {
        0.0
    } else {
        factor
    }
}

/// Bounded growth `1 - decay(t, ts)`
#[inline]
#[must_use]
pub fn growth(t: f32, timescale: f32) -> f32 {
    1.0 - decay(t, timescale)
}

/// Soft growth `clamp(e^((t/ts)/e) - 1, 0, 1)`
#[inline]
#[must_use]
pub fn soft_growth(t: f32, timescale: f32) -> f32 {
    (((t / timescale) / E).exp() - 1.0).clamp(0.0, 1.0)
}

/// Per-step multiplicative rate that walks `start` toward `end` along an exponential over `timescale` steps.
///
/// Returns [`threshold::INVERSE_CROSSOVER`] (undivided) when the velocity has to pass through
/// zero from a small opposite-signed start.
#[must_use]
pub fn growth_rate(start: f32, end: f32, timescale: f32) -> f32 {
    let elog = if start * end > 0.0 {
        (end.abs() / start.abs()).ln()
    } else if end == 0.0 && start == 0.0 {
        return 0.0;
    } else if end == 0.0 {
        -(1.0 + start.abs()).ln()
    } else if start == 0.0 {
        (1.0 + end.abs()).ln()
    } else if start.abs() > 0.3 {
        -(1.0 + (start - end).abs()).ln()
    } else {
        return threshold::INVERSE_CROSSOVER;
    };

    elog / timescale
}

/// Euler angles (x, y, z) of `rot`, with X forced to zero at the pitch singularities
#[must_use]
pub fn rot_to_euler(rot: Quat) -> Vec3A {
    let v = rot * Vec3A::Z;
    let m = v.length();
    if m == 0.0 {
        return Vec3A::ZERO;
    }

    let sin = v.x / m;
    let x = if !(-0.999_999..=0.999_999).contains(&sin) {
        0.0
    } else {
        (-v.y).atan2(v.z)
    };
    let y = sin.asin();

    // unwind X then Y, leaving only the Z rotation on the X axis
    let unwind_x = Quat::from_xyzw((-x * 0.5).sin(), 0.0, 0.0, (-x * 0.5).cos());
    let unwind_y = Quat::from_xyzw(0.0, (-y * 0.5).sin(), 0.0, (-y * 0.5).cos());
    let v = (rot * unwind_x * unwind_y) * Vec3A::X;
    let z = v.y.atan2(v.x);

    Vec3A::new(x, y, z)
}

/// Shortest rotation carrying direction `a` onto direction `b`, or identity when undefined
#[must_use]
pub fn rot_between(a: Vec3A, b: Vec3A) -> Quat {
    let dot = a.dot(b);
    let mag = a.length() * b.length();
    let angle = (dot / mag).acos();
    let axis = a.cross(b).normalize();
    let (s, c) = (angle * 0.5).sin_cos();

    let q = Quat::from_xyzw(axis.x * s, axis.y * s, axis.z * s, c);
    if q.is_nan() { Quat::IDENTITY } else { q.normalize() }
}

/// Angle separating two orientations
#[must_use]
pub fn angle_between(a: Quat, b: Quat) -> f32 {
    let aabb = a.length_squared() * b.length_squared();
    if aabb == 0.0 {
        return 0.0;
    }

    let ab = a.dot(b);
    let quotient = (ab * ab) / aabb;
    if quotient >= 1.0 {
        return 0.0;
    }

    (2.0 * quotient - 1.0).acos()
}

/// Tilt of `rot` away from world up with the yaw component stripped, in `[0, PI]`
#[must_use]
pub fn tilt_angle(rot: Quat) -> f32 {
    let euler = rot_to_euler(rot);
    let w = (euler.x * 0.5).cos() * (euler.y * 0.5).cos();
    (2.0 * w.clamp(-1.0, 1.0).acos()).abs()
}

/// Soft exponential shaping `sign(x) * (e^|x| - 1) / (e - 1)` of a value in `[-1, 1]`
#[inline]
#[must_use]
pub fn soft_exp_shape(x: f32) -> f32 {
    posneg(x) * (x.abs().exp() - 1.0) / (E - 1.0)
}

/// Ratio of `angle` to a half turn
#[inline]
#[must_use]
pub fn half_turn_pct(angle: f32) -> f32 {
    angle / PI
}
