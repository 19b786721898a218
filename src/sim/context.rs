use glam::{Quat, Vec3A};

use super::{DebugSwitches, VehicleFlags, VehicleType};

/// Per-tick snapshot of the vehicle shared by every stage.
///
/// Built once after spike mitigation and never mutated afterward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleContext {
    /// Smoothed timestep
    pub dt: f32,
    pub frame: u32,
    pub vehicle_type: VehicleType,
    pub flags: VehicleFlags,
    pub position: Vec3A,
    /// The vehicle's reference frame parameter
    pub reference_frame: Quat,
    /// Body rotation composed with the reference frame
    pub rotation: Quat,
    pub world_linear_velocity: Vec3A,
    pub world_angular_velocity: Vec3A,
    pub local_linear_velocity: Vec3A,
    pub local_angular_velocity: Vec3A,
    pub mass: f32,
    pub inertia: Vec3A,
    /// World Z gravity acceleration
    pub gravity: f32,
    pub debug: DebugSwitches,
}

impl VehicleContext {
    #[inline]
    #[must_use]
    pub fn to_local(&self, world: Vec3A) -> Vec3A {
        self.rotation.inverse() * world
    }

    #[inline]
    #[must_use]
    pub fn to_world(&self, local: Vec3A) -> Vec3A {
        self.rotation * local
    }

    /// Inertia tensor diagonal expressed in the reference frame
    #[inline]
    #[must_use]
    pub fn frame_inertia(&self) -> Vec3A {
        self.reference_frame * self.inertia
    }

    #[inline]
    #[must_use]
    pub fn has(&self, flags: VehicleFlags) -> bool {
        self.flags.intersects(flags)
    }
}
