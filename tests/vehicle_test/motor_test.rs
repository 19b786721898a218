use approx::assert_abs_diff_eq;
use glam::{Quat, Vec3A};
use vehiclesim::consts::{MIN_PHYSICS_TIMESTEP, threshold};
use vehiclesim::sim::*;

use crate::common::*;

fn context(position: Vec3A, world_linear: Vec3A) -> VehicleContext {
    VehicleContext {
        dt: MIN_PHYSICS_TIMESTEP,
        frame: 0,
        vehicle_type: VehicleType::Car,
        flags: VehicleFlags::empty(),
        position,
        reference_frame: Quat::IDENTITY,
        rotation: Quat::IDENTITY,
        world_linear_velocity: world_linear,
        world_angular_velocity: Vec3A::ZERO,
        local_linear_velocity: world_linear,
        local_angular_velocity: Vec3A::ZERO,
        mass: 10.0,
        inertia: Vec3A::splat(5.0),
        gravity: -9.8,
        debug: DebugSwitches::DEFAULT,
    }
}

/// A motor commanded long enough ago to be past its engagement window
fn settled_state(position: Vec3A) -> DynamicsState {
    DynamicsState {
        linear_decay: ExponentialTimer::new(2.0),
        angular_decay: ExponentialTimer::new(2.0),
        linear_direction: Vec3A::new(2.0, 0.0, 0.0),
        last_position: position,
        ..DynamicsState::DEFAULT
    }
}

fn hit(body_id: u64, distance: f32) -> RaycastHit {
    RaycastHit {
        body_id,
        distance,
        position: Vec3A::new(0.0, 0.0, -distance),
    }
}

#[test]
fn stalled_when_pushing_without_moving() {
    let position = Vec3A::new(4.0, 4.0, 0.5);
    let ctx = context(position, Vec3A::new(1.0, 0.0, 0.0));
    let mut state = settled_state(position);

    let mut motor = VehicleMotor::new();
    assert!(motor.is_stalled(&ctx, &mut state));
}

#[test]
fn not_stalled_while_making_progress() {
    let speed = 1.0;
    let step = speed * MIN_PHYSICS_TIMESTEP;
    let position = Vec3A::new(4.0, 4.0, 0.5);
    let ctx = context(position, Vec3A::new(speed, 0.0, 0.0));

    let mut state = settled_state(position - Vec3A::new(step, 0.0, 0.0));
    state.short_term_position_delta = Vec3A::new(step, 0.0, 0.0);

    let mut motor = VehicleMotor::new();
    assert!(!motor.is_stalled(&ctx, &mut state));
}

#[test]
fn fresh_command_is_never_stalled() {
    let position = Vec3A::new(4.0, 4.0, 0.5);
    let ctx = context(position, Vec3A::new(1.0, 0.0, 0.0));
    let mut state = settled_state(position);
    state.linear_decay = ExponentialTimer::new(0.2);

    let mut motor = VehicleMotor::new();
    assert!(!motor.is_stalled(&ctx, &mut state));
}

#[test]
fn stall_is_sampled_once_per_tick() {
    let position = Vec3A::new(4.0, 4.0, 0.5);
    let mut state = settled_state(position);
    let mut motor = VehicleMotor::new();

    assert!(motor.is_stalled(&context(position, Vec3A::X), &mut state));
    let smoothed = state.short_term_position_delta;

    // later calls in the same tick reuse the first answer and leave the history alone
    let moving = context(position + Vec3A::X, Vec3A::ZERO);
    assert!(motor.is_stalled(&moving, &mut state));
    assert_eq!(state.short_term_position_delta, smoothed);

    motor.clear_stall();
    assert!(!motor.is_stalled(&moving, &mut state));
}

#[test]
fn raycast_skips_self_and_picks_nearest() {
    let scene = MockScene::new().with_hits(vec![
        hit(MockBody::ID, 0.2),
        hit(7, 2.0),
        hit(8, 1.2),
        hit(9, 5.0),
    ]);

    let nearest =
        VehicleMotor::raycast_nearest(&scene, MockBody::ID, Vec3A::ZERO, Vec3A::NEG_Z, 3.0, false);
    assert_eq!(nearest.map(|h| h.body_id), Some(8));
    assert_abs_diff_eq!(nearest.map_or(0.0, |h| h.distance), 1.2);
}

#[test]
fn raycast_without_qualifying_hits() {
    let own = MockScene::new().with_hits(vec![hit(MockBody::ID, 0.5)]);
    assert!(
        VehicleMotor::raycast_nearest(&own, MockBody::ID, Vec3A::ZERO, Vec3A::NEG_Z, 3.0, false)
            .is_none()
    );

    let far = MockScene::new().with_hits(vec![hit(3, 3.5)]);
    assert!(
        VehicleMotor::raycast_nearest(&far, MockBody::ID, Vec3A::ZERO, Vec3A::NEG_Z, 3.0, false)
            .is_none()
    );

    let edge = MockScene::new().with_hits(vec![hit(3, 3.0)]);
    assert!(
        VehicleMotor::raycast_nearest(&edge, MockBody::ID, Vec3A::ZERO, Vec3A::NEG_Z, 3.0, false)
            .is_some()
    );
}

#[test]
fn raycast_buffer_grows_then_gives_up() {
    let mut hits: Vec<RaycastHit> = (0..40).map(|i| hit(100 + i, 10.0 - i as f32 * 0.1)).collect();
    hits.push(hit(MockBody::ID, 0.1));

    let crowded = MockScene::new().with_hits(hits);
    let nearest =
        VehicleMotor::raycast_nearest(&crowded, MockBody::ID, Vec3A::ZERO, Vec3A::NEG_Z, 20.0, true);
    assert_eq!(nearest.map(|h| h.body_id), Some(139));
    // 16 and 32 overflow, 64 fits
    assert_eq!(crowded.raycasts.get(), 3);

    let overflowing = MockScene::new().with_hits((0..300).map(|i| hit(100 + i, 1.0)).collect());
    assert!(
        VehicleMotor::raycast_nearest(&overflowing, MockBody::ID, Vec3A::ZERO, Vec3A::NEG_Z, 20.0, false)
            .is_none()
    );
    assert_eq!(overflowing.raycasts.get(), 5);
}

#[test]
fn torques_batch_per_mode() {
    let mut body = MockBody::new();
    let mut motor = VehicleMotor::new();

    motor.add_torque(Vec3A::new(0.5, 0.0, 0.0), ForceMode::VelocityChange);
    motor.add_torque(Vec3A::new(0.0, 0.25, 0.0), ForceMode::VelocityChange);
    motor.add_torque(Vec3A::new(0.0, 0.0, 2.0), ForceMode::Impulse);
    motor.add_torque(Vec3A::new(9.0, 9.0, 9.0), ForceMode::Force);
    assert_eq!(
        motor.pending_torque(),
        (Vec3A::new(0.5, 0.25, 0.0), Vec3A::new(0.0, 0.0, 2.0))
    );

    motor.torque_fini(&mut body);
    assert_eq!(body.torques.len(), 2);
    assert_eq!(
        body.torques_of(ForceMode::VelocityChange).collect::<Vec<_>>(),
        vec![Vec3A::new(0.5, 0.25, 0.0)]
    );
    assert_eq!(motor.pending_torque(), (Vec3A::ZERO, Vec3A::ZERO));

    // components under the engine floor never reach the body
    body.clear_log();
    motor.add_torque(Vec3A::splat(0.0005), ForceMode::VelocityChange);
    motor.torque_fini(&mut body);
    assert!(body.torques.is_empty());
}

#[test]
fn offset_forces_become_impulses() {
    let mut body = MockBody::new();
    let offset = Vec3A::new(0.0, 0.0, -0.1);

    VehicleMotor::add_force(&mut body, offset, Vec3A::new(1.0, 0.0, 0.0), ForceMode::VelocityChange);

    let call = body.forces[0];
    assert_eq!(call.offset, Some(offset));
    assert_eq!(call.mode, ForceMode::Impulse);
    assert_eq!(call.force, Vec3A::new(body.mass, 0.0, 0.0));
    assert_vec_near(body.linear_velocity, Vec3A::new(1.0, 0.0, 0.0), 1e-6);

    VehicleMotor::add_force(&mut body, Vec3A::ZERO, Vec3A::new(0.001, 0.0, 0.0), ForceMode::VelocityChange);
    let call = body.forces[1];
    assert_eq!(call.offset, None);
    assert!(!call.wake);
}

#[test]
fn linear_command_restarts_the_decay() {
    let params = ParameterTable::new(VehicleType::Car);
    let mut state = DynamicsState {
        linear_decay: ExponentialTimer::new(5.0),
        linear_target_velocity: Vec3A::new(1.0, 0.0, 0.0),
        ..DynamicsState::DEFAULT
    };

    move_linear(&mut state, &params, 12.5, Vec3A::new(2.0, 0.0, 0.0));

    // the decayed target is where the ramp picks up again
    assert_abs_diff_eq!(state.linear_target_velocity.x, (-0.5f32).exp(), epsilon = 1e-5);
    assert_abs_diff_eq!(state.linear_decay.index(), MIN_PHYSICS_TIMESTEP);
    assert_eq!(state.linear_direction, Vec3A::new(2.0, 0.0, 0.0));
    assert_eq!(state.target_linear_delta, Vec3A::new(2.0, 0.0, 0.0));
    assert_eq!(state.last_access, 12.5);

    move_linear(&mut state, &params, 13.0, Vec3A::new(1.5, 0.0, 0.0));
    assert_eq!(state.target_linear_delta, Vec3A::new(-0.5, 0.0, 0.0));
}

#[test]
fn fast_angular_deflection_limits_commands() {
    let mut params = ParameterTable::new(VehicleType::Car);
    let mut state = DynamicsState::DEFAULT;

    move_angular(&mut state, &params, 1.0, Vec3A::new(0.0, 0.0, 1.0));
    assert_eq!(state.angular_direction, Vec3A::new(0.0, 0.0, 1.0));
    assert!(state.angular_decay.is_engaged(threshold::ANGULAR_MOTOR_ENGAGED));

    params.set(ParamSetting::Float(FloatParam::AngularDeflectionTimescale, 0.02));
    params.set(ParamSetting::Float(FloatParam::AngularDeflectionEfficiency, 1.0));
    move_angular(&mut state, &params, 2.0, Vec3A::new(0.0, 0.0, 1.0));
    assert_abs_diff_eq!(state.angular_direction.z, 0.1, epsilon = 1e-6);
}

#[test]
fn reset_parks_motors_and_keeps_directions() {
    let mut state = DynamicsState {
        linear_direction: Vec3A::X,
        linear_target_velocity: Vec3A::X,
        linear_decay: ExponentialTimer::new(0.5),
        vertical_force_adjust: 4.0,
        banking_direction: 0.3,
        ..DynamicsState::DEFAULT
    };

    state.reset(99.0, Vec3A::splat(1.0), Vec3A::Y, Vec3A::Z);

    assert_eq!(state.linear_direction, Vec3A::X);
    assert_eq!(state.linear_target_velocity, Vec3A::ZERO);
    assert_eq!(state.linear_decay, ExponentialTimer::IDLE);
    assert_eq!(state.vertical_force_adjust, 1.0);
    assert_eq!(state.banking_direction, 0.0);
    assert_eq!(state.last_position, Vec3A::splat(1.0));
    assert_eq!(state.local_linear_velocity, Vec3A::Y);
    assert_eq!(state.last_access, 99.0);
}
