use std::f32::consts::PI;

use glam::{Quat, Vec3A};
use log::debug;

use crate::{
    consts::{
        limits::{MAX_LEGACY_LINEAR_VELOCITY, MAX_TIMESCALE},
        threshold::{ANGULAR_MOTOR_DELTA_V, DEFLECTION_ANGLE, DEFLECTION_SPEED, LINEAR_MOTOR_DELTA_V},
    },
    math,
};

use crate::sim::{
    DynamicsState, FloatParam, ForceMode, ParameterTable, RigidBody, VectorParam, VehicleContext,
    VehicleFlags, VehicleMotor,
};

/// Turns the nose toward the direction of travel
pub fn angular_deflection(
    ctx: &VehicleContext,
    params: &ParameterTable,
    state: &mut DynamicsState,
    motor: &mut VehicleMotor,
) {
    let world_lin = ctx.world_linear_velocity;
    if !math::any_abs_ge(world_lin, DEFLECTION_SPEED) {
        return;
    }

    let timescale = params.float(FloatParam::AngularDeflectionTimescale).max(ctx.dt);
    if timescale >= MAX_TIMESCALE {
        return;
    }

    let time_pct = ctx.dt / timescale;
    let efficiency = params.float(FloatParam::AngularDeflectionEfficiency);
    let speed_pct = ctx.local_linear_velocity.length().clamp(0.0, MAX_LEGACY_LINEAR_VELOCITY)
        / MAX_LEGACY_LINEAR_VELOCITY;

    let ahead = ctx.to_world(Vec3A::X);
    let tween = math::rot_between(ahead, world_lin.normalize_or_zero());
    let mut angle = math::angle_between(tween, Quat::IDENTITY);

    // reversing turns the tail into the travel direction instead
    if ctx.local_linear_velocity.x < 0.0 {
        angle = PI - angle;
    }

    let mut twist = math::rot_to_euler(tween).normalize_or_zero()
        * speed_pct
        * PI
        * time_pct
        * efficiency
        * (1.0 + angle).ln();

    // damp the oscillation once nearly aligned
    let mut damping = Vec3A::ZERO;
    if angle < DEFLECTION_ANGLE {
        damping = ctx.world_angular_velocity * time_pct * efficiency * (1.0 + PI - angle).ln()
            / (1.0 + PI).ln();
        twist -= damping;
    }

    if motor.is_stalled(ctx, state) {
        twist = Vec3A::ZERO;
    }

    if ctx.debug.deflection {
        debug!("Angular deflection: angle={angle} twist={twist} damping={damping} eff={efficiency} ts={timescale}");
    }

    if math::any_abs_ge(twist, ANGULAR_MOTOR_DELTA_V) {
        motor.add_torque(twist, ForceMode::VelocityChange);
    }
}

/// Redirects part of the velocity along the vehicle's forward axis
pub fn linear_deflection(
    ctx: &VehicleContext,
    params: &ParameterTable,
    body: &mut dyn RigidBody,
) {
    let world_lin = ctx.world_linear_velocity;
    if !math::any_abs_ge(world_lin, LINEAR_MOTOR_DELTA_V) {
        return;
    }

    let timescale = params.float(FloatParam::LinearDeflectionTimescale).max(ctx.dt);
    if timescale >= MAX_TIMESCALE {
        return;
    }

    let time_pct = ctx.dt / timescale;
    let efficiency = params.float(FloatParam::LinearDeflectionEfficiency);
    let speed = world_lin.length();
    let moved = speed * time_pct * efficiency;

    let removed = (-world_lin).normalize_or_zero() * moved;
    let added = ctx.to_world(Vec3A::new(moved, 0.0, 0.0));
    let mut deflection = added + removed;

    if ctx.flags.contains(VehicleFlags::NO_DEFLECTION_UP) && deflection.z > 0.0 {
        deflection.z = 0.0;
    }

    if ctx.debug.deflection {
        debug!("Linear deflection: speed={speed} added={added} removed={removed} eff={efficiency} ts={timescale}");
    }

    if math::any_abs_gt(deflection, LINEAR_MOTOR_DELTA_V) {
        VehicleMotor::add_force(
            body,
            params.vector(VectorParam::LinearMotorOffset),
            deflection,
            ForceMode::VelocityChange,
        );
    }
}
