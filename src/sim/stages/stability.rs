//! Workarounds for engine artifacts and terrain contact: velocity spikes, ground
//! penetration, boats running aground and the sled's slope assist.

use std::f32::consts::PI;

use glam::Vec3A;
use log::info;

use crate::{
    consts::{
        decay,
        limits::MAX_GROUND_PENETRATION,
        spike,
        threshold::{DEFLECTION_ANGLE, LINEAR_MOTOR_DELTA_V},
    },
    math,
};

use crate::sim::{
    DynamicsState, ForceMode, RigidBody, Scene, VectorParam, VehicleContext, VehicleFlags,
    VehicleMotor, VehicleType, ParameterTable,
};

/// Compresses the angular and upward kicks the engine produces on rough terrain and prim edges.
///
/// `actual_step` is the wall-clock time since the previous tick; the nominal timestep does not
/// always reflect it.
pub fn mitigate_spiking(
    ctx: &VehicleContext,
    state: &DynamicsState,
    body: &mut dyn RigidBody,
    motor: &mut VehicleMotor,
    actual_step: f32,
) {
    // less sensitive the further the vehicle is tilted
    let angle = math::tilt_angle(ctx.rotation);
    let accel = (ctx.local_angular_velocity.y - state.local_angular_velocity.y) / actual_step
        * ((PI - angle) / PI);

    if accel.abs() > spike::ANGULAR_ACCEL {
        let mut excess = ctx.to_local(body.angular_velocity());
        excess.z = 0.0;
        let excess = ctx.to_world(excess);
        motor.add_torque(-excess, ForceMode::VelocityChange);

        if ctx.debug.spike_detection {
            info!("Angular spike: accel={accel} vel={excess}");
        }
    }

    // only upward kicks
    let accel = (ctx.local_linear_velocity.z - state.local_linear_velocity.z) / actual_step;
    if accel > spike::LINEAR_ACCEL {
        let mut excess = ctx.to_local(body.linear_velocity());
        excess.x = 0.0;
        excess.y *= 0.5;
        let excess = ctx.to_world(excess);
        body.add_force(-excess, ForceMode::VelocityChange, true);

        if ctx.debug.spike_detection {
            info!("Linear spike: accel={accel} vel={excess}");
        }
    }
}

/// Pops a vehicle that was pushed through the terrain back up
pub fn fix_ground_penetration(ctx: &VehicleContext, body: &mut dyn RigidBody, scene: &dyn Scene) {
    let ground = scene.ground_height_at(ctx.position.x, ctx.position.y);

    if ctx.position.z - ground < MAX_GROUND_PENETRATION {
        let lift = Vec3A::new(0.0, 0.0, 1.0 + (ctx.local_linear_velocity.z * 3.0).abs());
        body.add_force(lift, ForceMode::VelocityChange, true);
    }
}

/// Kills the linear motor of a water-only boat that runs its hull onto land
pub fn boat_ground_drag(
    ctx: &VehicleContext,
    state: &mut DynamicsState,
    body: &dyn RigidBody,
    scene: &dyn Scene,
) {
    let Some(obb) = body.bounding_box() else {
        return;
    };

    let local = ctx.local_linear_velocity;
    if !ctx.vehicle_type.is_boat()
        || !ctx.flags.contains(VehicleFlags::HOVER_WATER_ONLY)
        || ctx.flags.contains(VehicleFlags::HOVER_TERRAIN_ONLY)
        || local.length() <= LINEAR_MOTOR_DELTA_V
    {
        return;
    }

    let ext = obb.extent;
    let depth = -ext.z * 0.98;
    let grounded = |corner: Vec3A| {
        let corner = ctx.to_world(corner);
        let ground = scene.ground_height_at(ctx.position.x + corner.x, ctx.position.y + corner.y);
        let bottom = ctx.position.z + obb.center.z + corner.z;
        bottom <= ground
    };

    let aground = (local.x > LINEAR_MOTOR_DELTA_V && grounded(Vec3A::new(ext.x * 0.9, 0.0, depth)))
        || (local.x < -LINEAR_MOTOR_DELTA_V && grounded(Vec3A::new(-ext.x * 0.9, 0.0, depth)))
        || (local.y > LINEAR_MOTOR_DELTA_V && grounded(Vec3A::new(0.0, ext.y * 0.9, depth)))
        || (local.y < -LINEAR_MOTOR_DELTA_V && grounded(Vec3A::new(0.0, -ext.y * 0.9, depth)));

    if aground {
        state.kill_linear_motor(decay::IDLE_INDEX);
    }
}

/// Gravity assist for sleds on slopes, weaker when pointing uphill
pub fn sled_movement(
    ctx: &VehicleContext,
    params: &ParameterTable,
    state: &mut DynamicsState,
    body: &mut dyn RigidBody,
    motor: &mut VehicleMotor,
) {
    if ctx.vehicle_type != VehicleType::Sled {
        return;
    }

    // -1 nose down, 1 nose up
    let pitch = ctx.to_world(Vec3A::X).z;
    if pitch.abs() <= DEFLECTION_ANGLE {
        return;
    }

    let mut force = Vec3A::new(-ctx.gravity * 3.0, 0.0, 0.0);
    if pitch > 0.0 {
        force *= -0.1;
    }

    if motor.is_stalled(ctx, state) {
        return;
    }

    let force = force * ctx.dt * pitch.abs().sqrt();
    if math::any_abs_ge(force, LINEAR_MOTOR_DELTA_V) {
        VehicleMotor::add_force(
            body,
            params.vector(VectorParam::LinearMotorOffset),
            ctx.to_world(force) * ctx.mass,
            ForceMode::Force,
        );
    }
}
