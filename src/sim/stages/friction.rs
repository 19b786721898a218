//! Per-axis exponential slowdown in the vehicle frame.
//!
//! Each axis loses `growth(dt, timescale)` of its velocity per tick. Once the residual motion
//! is tiny the whole velocity is cancelled so the body can come to rest.

use glam::Vec3A;
use log::debug;

use crate::{
    consts::{
        MIN_PHYSICS_FORCE,
        limits::{MAX_ANGULAR_VELOCITY, MAX_TIMESCALE},
        threshold::{ANGULAR_FRICTION_DELTA_V, LINEAR_FRICTION_DELTA_V},
    },
    math,
};

use crate::sim::{
    ForceMode, ParameterTable, RigidBody, VectorParam, VehicleContext, VehicleMotor,
};

/// Growth per axis, `None` when every axis is switched off
fn friction_growth(timescale: Vec3A, dt: f32) -> Option<Vec3A> {
    if !timescale.cmplt(Vec3A::splat(MAX_TIMESCALE)).any() {
        return None;
    }

    let timescale = timescale.max(Vec3A::splat(dt));
    Some(Vec3A::new(
        math::growth(dt, timescale.x),
        math::growth(dt, timescale.y),
        math::growth(dt, timescale.z),
    ))
}

/// The engine ignores forces under its floor, so tiny components are rounded up to it
fn lift_to_floor(v: Vec3A) -> Vec3A {
    Vec3A::select(
        v.abs().cmplt(Vec3A::splat(MIN_PHYSICS_FORCE)),
        math::posneg_vec(v) * MIN_PHYSICS_FORCE,
        v,
    )
}

pub fn angular_friction(ctx: &VehicleContext, params: &ParameterTable, motor: &mut VehicleMotor) {
    let Some(growth) = friction_growth(params.vector(VectorParam::AngularFrictionTimescale), ctx.dt)
    else {
        return;
    };

    let local = ctx.local_angular_velocity;
    let slowdown = (-local * growth).clamp(
        Vec3A::splat(-MAX_ANGULAR_VELOCITY),
        Vec3A::splat(MAX_ANGULAR_VELOCITY),
    );
    let mut world = ctx.to_world(lift_to_floor(slowdown));

    if !math::any_abs_ge(local, MIN_PHYSICS_FORCE * 2.0) {
        return;
    }

    if ctx.world_angular_velocity.length() < ANGULAR_FRICTION_DELTA_V {
        world = -ctx.world_angular_velocity;
    }

    if ctx.debug.angular_friction {
        debug!("Angular friction: growth={growth} local={local} torque={world}");
    }

    if world.length() > 0.0 {
        motor.add_torque(world, ForceMode::VelocityChange);
    }
}

/// Same as [`angular_friction`] but never pushes up, so gravity is left alone
pub fn linear_friction(ctx: &VehicleContext, params: &ParameterTable, body: &mut dyn RigidBody) {
    let Some(growth) = friction_growth(params.vector(VectorParam::LinearFrictionTimescale), ctx.dt)
    else {
        return;
    };

    let local = ctx.local_linear_velocity;
    let mut world = ctx.to_world(lift_to_floor(-local * growth));
    if world.z > 0.0 {
        world.z = 0.0;
    }

    if !math::any_abs_ge(local, MIN_PHYSICS_FORCE * 2.0) {
        return;
    }

    if ctx.world_linear_velocity.length() < LINEAR_FRICTION_DELTA_V {
        world = -ctx.world_linear_velocity;
    }

    if ctx.debug.linear_friction {
        debug!("Linear friction: growth={growth} local={local} force={world}");
    }

    if world.length() > 0.0 {
        VehicleMotor::add_force(
            body,
            params.vector(VectorParam::LinearMotorOffset),
            world,
            ForceMode::VelocityChange,
        );
    }
}
