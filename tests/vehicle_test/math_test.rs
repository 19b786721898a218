use std::f32::consts::PI;

use approx::assert_abs_diff_eq;
use glam::{Quat, Vec3A};
use vehiclesim::consts::{MIN_PHYSICS_TIMESTEP, threshold};
use vehiclesim::math;
use vehiclesim::sim::{ExponentialTimer, RunningStat};

#[test]
fn decay_starts_at_one() {
    for timescale in [0.05, 0.5, 1.0, 10.0, 1000.0] {
        assert_eq!(math::decay(0.0, timescale), 1.0);
        assert_eq!(math::decay(-0.04, timescale), 1.0);
    }
}

#[test]
fn decay_never_rises_and_snaps_to_zero() {
    let timescale = 0.5;
    let mut last = 1.0;
    let mut t = 0.0;

    while t < 10.0 {
        let factor = math::decay(t, timescale);
        assert!(factor <= last, "decay rose at t={t}: {factor} > {last}");
        assert!((0.0..=1.0).contains(&factor));
        last = factor;
        t += MIN_PHYSICS_TIMESTEP;
    }

    // e^-20 is far under the stiction factor
    assert_eq!(math::decay(10.0, timescale), 0.0);
    assert!(math::decay(0.1, timescale) > threshold::STICTION_FACTOR);
}

#[test]
fn growth_mirrors_decay() {
    assert_eq!(math::growth(0.0, 2.0), 0.0);
    assert_abs_diff_eq!(math::growth(2.0, 2.0), 1.0 - (-1.0f32).exp(), epsilon = 1e-6);
    assert_eq!(math::growth(100.0, 1.0), 1.0);
}

#[test]
fn growth_rate_crossover_sentinel() {
    // small opposite-signed start has to pass through zero
    assert_eq!(math::growth_rate(0.2, -1.0, 10.0), threshold::INVERSE_CROSSOVER);
    assert_eq!(math::growth_rate(-0.3, 2.0, 5.0), threshold::INVERSE_CROSSOVER);

    // a large opposite-signed start decelerates instead
    let rate = math::growth_rate(0.5, -1.0, 10.0);
    assert_ne!(rate, threshold::INVERSE_CROSSOVER);
    assert!(rate.is_finite());
    assert_abs_diff_eq!(rate, -(2.5f32).ln() / 10.0, epsilon = 1e-6);
}

#[test]
fn growth_rate_log_ratio() {
    assert_abs_diff_eq!(math::growth_rate(1.0, 2.0, 4.0), 2f32.ln() / 4.0, epsilon = 1e-6);
    assert_abs_diff_eq!(math::growth_rate(-2.0, -1.0, 1.0), 0.5f32.ln(), epsilon = 1e-6);
    assert_abs_diff_eq!(math::growth_rate(0.0, 2.0, 1.0), 3f32.ln(), epsilon = 1e-6);
    assert_abs_diff_eq!(math::growth_rate(3.0, 0.0, 1.0), -(4f32.ln()), epsilon = 1e-6);
    assert_eq!(math::growth_rate(0.0, 0.0, 1.0), 0.0);
}

#[test]
fn euler_and_tilt() {
    let yaw = math::rot_to_euler(Quat::from_rotation_z(0.5));
    assert_abs_diff_eq!(yaw.x, 0.0, epsilon = 1e-5);
    assert_abs_diff_eq!(yaw.y, 0.0, epsilon = 1e-5);
    assert_abs_diff_eq!(yaw.z, 0.5, epsilon = 1e-5);

    // yaw is not tilt
    assert_abs_diff_eq!(math::tilt_angle(Quat::from_rotation_z(1.0)), 0.0, epsilon = 1e-3);
    assert_abs_diff_eq!(math::tilt_angle(Quat::from_rotation_x(0.3)), 0.3, epsilon = 1e-4);
    assert_abs_diff_eq!(math::tilt_angle(Quat::from_rotation_x(PI * 0.9)), PI * 0.9, epsilon = 1e-4);
}

#[test]
fn rotation_between_directions() {
    let q = math::rot_between(Vec3A::X, Vec3A::Y);
    let turned = q * Vec3A::X;
    assert_abs_diff_eq!(turned.y, 1.0, epsilon = 1e-5);

    // parallel input has no defined axis
    assert_eq!(math::rot_between(Vec3A::X, Vec3A::X), Quat::IDENTITY);
    assert_abs_diff_eq!(math::angle_between(Quat::IDENTITY, Quat::IDENTITY), 0.0);
    assert_abs_diff_eq!(
        math::angle_between(Quat::from_rotation_z(0.4), Quat::IDENTITY),
        0.4,
        epsilon = 1e-3
    );
}

#[test]
fn soft_exp_shape_keeps_ends() {
    assert_eq!(math::soft_exp_shape(0.0), 0.0);
    assert_abs_diff_eq!(math::soft_exp_shape(1.0), 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(math::soft_exp_shape(-1.0), -1.0, epsilon = 1e-6);
    assert!(math::soft_exp_shape(0.5) < 0.5);
}

#[test]
fn exponential_timer_head_start() {
    let mut timer = ExponentialTimer::IDLE;
    assert_eq!(timer.factor(10.0), 0.0);
    assert!(timer.has_elapsed(1.0));

    // short motor timescales start the clock before zero
    timer.restart(Vec3A::new(0.2, 0.2, 0.05));
    assert!(timer.index() < 0.0);
    assert_eq!(timer.factor(0.3), 1.0);
    assert!(timer.is_engaged(0.9));

    timer.restart(Vec3A::new(0.5, 1.0, 1.0));
    assert_abs_diff_eq!(timer.index(), MIN_PHYSICS_TIMESTEP);

    timer.advance(0.5);
    assert_abs_diff_eq!(timer.index(), MIN_PHYSICS_TIMESTEP + 0.5, epsilon = 1e-6);
    let factors = timer.factors(Vec3A::new(10.0, 2.0, 1000.0));
    assert!(factors.x < 1.0 && factors.x > factors.y);
}

#[test]
fn running_stat_mean_and_variance() {
    let mut stat = RunningStat::new();
    assert_eq!(stat.mean(), 0.0);

    for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
        stat.push(x);
    }

    assert_eq!(stat.count(), 8);
    assert_abs_diff_eq!(stat.mean(), 5.0, epsilon = 1e-12);
    assert_abs_diff_eq!(stat.variance(), 32.0 / 7.0, epsilon = 1e-12);

    stat.clear();
    assert_eq!(stat.count(), 0);
    assert_eq!(stat.variance(), 0.0);
}
