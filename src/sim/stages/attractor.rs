use std::f32::consts::PI;

use glam::Vec3A;
use log::debug;

use crate::{
    consts::{
        limits::{
            MAX_ATTRACT_DORMANCY, MAX_ATTRACT_TIMESCALE, MAX_LEGACY_LINEAR_VELOCITY, MAX_TIMESCALE,
        },
        threshold::{ANGULAR_MOTOR_DELTA_V, ATTRACTOR_ANGLE, BANK_ANGLE, OVERTURN_ANGLE},
    },
    math,
};

use crate::sim::{
    DynamicsState, FloatParam, ForceMode, ParameterTable, VehicleContext, VehicleFlags,
    VehicleMotor, VehicleType,
};

/// What the vertical attractor did this tick
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Attraction {
    /// World torque impulse applied, zero when dormant
    pub forces: Vec3A,
    /// Tilt away from upright. Folded back below a half turn for an inverted airplane.
    pub angle: f32,
    /// An airplane flying upside down
    pub inverted: bool,
}

/// Rights the vehicle toward world up.
///
/// Goes dormant once the tilt has been steady for a while, unless the vehicle is overturned.
/// Non-airplanes that stay overturned get an escalating push.
pub fn vertical_attractor(
    ctx: &VehicleContext,
    params: &ParameterTable,
    state: &mut DynamicsState,
    motor: &mut VehicleMotor,
) -> Attraction {
    let mut result = Attraction::default();

    let timescale = params.float(FloatParam::VerticalAttractionTimescale).max(ctx.dt);
    if timescale >= MAX_ATTRACT_TIMESCALE {
        return result;
    }

    let efficiency = params.float(FloatParam::VerticalAttractionEfficiency);
    let x_rot = ctx.to_world(Vec3A::X);
    let y_rot = ctx.to_world(Vec3A::Y);
    let mut angle = math::tilt_angle(ctx.rotation).abs();

    if ctx.vehicle_type == VehicleType::Airplane && angle > PI / 2.0 {
        angle = PI - angle;
        result.inverted = true;
    }
    result.angle = angle;

    let angle_pct = math::half_turn_pct(angle);

    if (state.last_vertical_angle - angle).abs() >= ATTRACTOR_ANGLE {
        state.last_vertical_frame = ctx.frame;
    }

    let steady_frames = ctx.frame.wrapping_sub(state.last_vertical_frame) as f32;
    let overturned = angle >= OVERTURN_ANGLE;
    if !overturned && steady_frames >= MAX_ATTRACT_DORMANCY / ctx.dt {
        if ctx.debug.attractor {
            debug!("Attractor dormant: angle={angle} frames={steady_frames}");
        }
        return result;
    }

    let mut twist = Vec3A::new(-y_rot.z, x_rot.z, 0.0) * PI * (efficiency * 3.0).exp();

    if ctx.vehicle_type != VehicleType::Airplane {
        twist *= 1.0 + (1.0 + angle_pct).powi(4);
    }

    if ctx.flags.contains(VehicleFlags::LIMIT_ROLL_ONLY) {
        if matches!(ctx.vehicle_type, VehicleType::Airplane | VehicleType::Balloon) {
            twist.y = 0.0;
        } else {
            twist.y *= 0.1;
        }
    }

    if ctx.vehicle_type != VehicleType::Airplane {
        if overturned && angle >= state.last_vertical_angle {
            state.vertical_force_adjust *= 1.3;
        } else {
            state.vertical_force_adjust = (state.vertical_force_adjust / 1.1).max(1.0);
        }
        twist *= state.vertical_force_adjust;
    }

    let soften = math::soft_growth(efficiency, 1.0);
    let removed = Vec3A::new(
        ctx.local_angular_velocity.x * soften,
        ctx.local_angular_velocity.y * soften,
        0.0,
    );

    let twist = ctx.to_world(twist * ctx.frame_inertia());

    if twist != Vec3A::ZERO {
        result.forces = twist * ctx.dt / timescale;
        motor.add_torque(result.forces, ForceMode::Impulse);
    }

    if removed.length() > 0.0 {
        motor.add_torque(-ctx.to_world(removed), ForceMode::VelocityChange);
    }

    if ctx.debug.attractor {
        debug!(
            "Attractor: angle={angle} inverted={} adjust={} forces={} removed={removed} eff={efficiency} ts={timescale}",
            result.inverted,
            state.vertical_force_adjust,
            result.forces,
        );
    }

    state.last_vertical_angle = angle;
    result
}

/// Works out the yaw rate the banking motor should chase from the current roll.
///
/// `mix` blends a static turn rate with one that scales with forward speed.
pub fn banking_to_yaw(
    ctx: &VehicleContext,
    params: &ParameterTable,
    state: &mut DynamicsState,
    attraction: Attraction,
    enabled: bool,
) {
    let timescale = params.float(FloatParam::BankingTimescale).max(ctx.dt);
    if timescale >= MAX_ATTRACT_TIMESCALE || !enabled || timescale >= MAX_TIMESCALE {
        return;
    }

    let mut efficiency = params.float(FloatParam::BankingEfficiency);
    let inverted_modifier = params.float(FloatParam::InvertedBankingModifier);
    let mix = params.float(FloatParam::BankingMix);

    let forward = ctx.local_linear_velocity.x;
    let x_speed = if forward.abs() > ANGULAR_MOTOR_DELTA_V {
        forward.abs().clamp(0.0, MAX_LEGACY_LINEAR_VELOCITY)
    } else {
        0.0
    };
    let x_speed_pct = x_speed / MAX_LEGACY_LINEAR_VELOCITY;

    let attitude = if attraction.angle > PI / 2.0 { -1.0 } else { 1.0 };
    let roll = ctx.to_world(Vec3A::Y).z;
    let roll = (roll * PI * 0.5 / params.float(FloatParam::BankingAzimuth)).clamp(-1.0, 1.0);

    if attraction.inverted {
        efficiency *= inverted_modifier;
    }

    state.banking_direction = if roll.abs() > BANK_ANGLE {
        let lean = -roll * attitude * efficiency;
        lean * (1.0 - mix) * PI + lean * mix * x_speed_pct * PI
    } else {
        0.0
    };

    if ctx.debug.banking {
        debug!(
            "Banking: roll={roll} attitude={attitude} eff={efficiency} mix={mix} speed_pct={x_speed_pct} direction={}",
            state.banking_direction
        );
    }
}
