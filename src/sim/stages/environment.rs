//! Wind and water currents from the region's coarse velocity grids.

use glam::{Vec2, Vec3A};
use log::debug;

use crate::{
    consts::{
        MIN_PHYSICS_FORCE, TICKS_PER_WIND_CHECK,
        wind::{CELL_METERS, GRID_SIZE, MIN_TERRAIN_RANGE},
    },
    math,
};

use crate::sim::{
    DynamicsState, ForceMode, ParameterTable, RigidBody, Scene, VectorParam, VehicleContext,
    VehicleFlags, VehicleMotor, WindField,
};

/// Bilinear sample of the layer the vehicle is in: currents under water, ground wind up to the
/// local terrain range, aloft above that
fn sample_wind(field: &WindField, position: Vec3A, water_height: f32) -> Vec2 {
    let last = GRID_SIZE as i32 - 1;
    let cell = |v: f32| ((v as i32) / CELL_METERS as i32).clamp(0, last);

    let x0 = cell(position.x);
    let y0 = cell(position.y);
    let x1 = (x0 + 1).min(last);
    let y1 = (y0 + 1).min(last);

    let index = |x: i32, y: i32| (y * GRID_SIZE as i32 + x) as usize;

    let max_height = field.terrain_max_heights[index(x0, y0)];
    let range = field.terrain_ranges[index(x0, y0)].max(MIN_TERRAIN_RANGE);
    let boundary = water_height + max_height + range;

    let layer = if position.z < water_height {
        &field.currents
    } else if position.z <= boundary {
        &field.ground
    } else {
        &field.aloft
    };

    let dx = (position.x - x0 as f32 * CELL_METERS) / CELL_METERS;
    let dy = (position.y - y0 as f32 * CELL_METERS) / CELL_METERS;

    let low = layer[index(x0, y0)].lerp(layer[index(x1, y0)], dx);
    let high = layer[index(x0, y1)].lerp(layer[index(x1, y1)], dx);
    low.lerp(high, dy)
}

/// Refreshes the cached wind every few ticks for vehicles that react to it
pub fn build_wind_data(ctx: &VehicleContext, state: &mut DynamicsState, scene: &dyn Scene) {
    let mut wind = state.wind_direction;

    if let Some(field) = scene.wind_field()
        && ctx.frame % TICKS_PER_WIND_CHECK == 0
        && ctx.has(VehicleFlags::ENVIRONMENT_ANY)
    {
        let water_height = scene.water_height_at(ctx.position.x, ctx.position.y);
        let sample = sample_wind(field, ctx.position, water_height);
        wind.x = sample.x;
        wind.y = sample.y;

        if ctx.debug.wind {
            debug!("Wind sample: pos={} water={water_height} wind={wind}", ctx.position);
        }
    }

    state.wind_direction = wind;
    state.water_direction = wind;
}

/// Zeroes the components where the body already moves at least as fast as the wind, in the same direction
fn taper(wind: Vec3A, velocity: Vec3A) -> Vec3A {
    let same_way = (velocity * wind).cmpge(Vec3A::ZERO);
    let outrunning = (math::posneg_vec(velocity) * (velocity - wind)).cmpgt(Vec3A::ZERO);
    Vec3A::select(same_way & outrunning, Vec3A::ZERO, wind)
}

/// Pushes the vehicle along with the wind and turns it downwind
pub fn wind_forces(
    ctx: &VehicleContext,
    params: &ParameterTable,
    state: &DynamicsState,
    body: &mut dyn RigidBody,
    motor: &mut VehicleMotor,
) {
    let wind = ctx.to_local(state.wind_direction);
    let push = taper(wind, ctx.local_linear_velocity)
        * params.vector(VectorParam::LinearWindEfficiency);

    if push.length() >= MIN_PHYSICS_FORCE {
        body.add_force(ctx.to_world(push * ctx.dt * ctx.mass), ForceMode::Impulse, true);
    }

    let wind_rot = ctx.to_local(state.wind_direction);
    let turn = Vec3A::new(-wind_rot.y, wind_rot.x, 0.0);
    let efficiency = params.vector(VectorParam::AngularWindEfficiency);
    let mut turn = taper(turn, ctx.local_angular_velocity);
    turn.x *= efficiency.x;
    turn.y *= efficiency.y;
    turn.z = 0.0;

    if turn.length() >= MIN_PHYSICS_FORCE {
        motor.add_torque(
            ctx.to_world(turn * ctx.dt * ctx.frame_inertia()),
            ForceMode::Impulse,
        );
    }

    if ctx.debug.wind {
        debug!("Wind forces: wind={} push={push} turn={turn}", state.wind_direction);
    }
}
