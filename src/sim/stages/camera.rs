use std::f32::consts::PI;

use arrayvec::ArrayVec;
use glam::Vec3A;
use log::debug;

use crate::{consts::threshold::MOUSELOOK_ANGLE, math};

use crate::sim::{CameraData, FloatParam, ParameterTable, VectorParam, VehicleContext, VehicleFlags};

/// Dead zone then soft exponential shaping of a normalized camera offset
fn shape(offset: f32) -> f32 {
    if offset.abs() > MOUSELOOK_ANGLE {
        math::soft_exp_shape(offset)
    } else {
        0.0
    }
}

/// Angular motor commands that steer or bank the vehicle toward where the driver's camera points.
///
/// `camera` must be a valid snapshot taken this tick.
#[must_use]
pub fn camera_steering(
    ctx: &VehicleContext,
    params: &ParameterTable,
    camera: &CameraData,
) -> ArrayVec<Vec3A, 2> {
    let mut commands = ArrayVec::new();

    // camera relative to the vehicle
    let local_cam = camera.rotation * ctx.rotation.inverse();
    // forward swings left/right with yaw, left swings up/down with pitch
    let yaw_axis = local_cam * Vec3A::X;
    let pitch_axis = local_cam * Vec3A::Y;

    let azimuth = params.float(FloatParam::MouselookAzimuth);
    let altitude = params.float(FloatParam::MouselookAltitude);
    let x = shape((yaw_axis.y * PI * 0.5 / azimuth).clamp(-1.0, 1.0));
    let mut y = shape((pitch_axis.z * PI * 0.5 / altitude).clamp(-1.0, 1.0));
    if ctx.flags.contains(VehicleFlags::LIMIT_ROLL_ONLY) {
        y = 0.0;
    }

    let steering = (ctx.flags.contains(VehicleFlags::MOUSELOOK_STEER) && camera.mouselook)
        || ctx.flags.contains(VehicleFlags::MOUSEPOINT_STEER);
    let banking = (ctx.flags.contains(VehicleFlags::MOUSELOOK_BANK) && camera.mouselook)
        || ctx.flags.contains(VehicleFlags::MOUSEPOINT_BANK);

    let direction = params.vector(VectorParam::AngularMotorDirection);

    if steering && (x != 0.0 || y != 0.0) {
        commands.push(Vec3A::new(0.0, y * direction.y, x * direction.z));
    }

    if banking && x != 0.0 {
        commands.push(Vec3A::new(-x * direction.x, 0.0, 0.0));
    }

    if ctx.debug.angular && !commands.is_empty() {
        debug!("Camera steering: x={x} y={y} mouselook={} commands={commands:?}", camera.mouselook);
    }

    commands
}
