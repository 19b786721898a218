use glam::Vec3A;

use crate::consts::{MIN_PHYSICS_TIMESTEP, decay};

use super::ExponentialTimer;

/// The per-vehicle simulation state carried from tick to tick,
/// and across saves and region crossings.
///
/// Motor values are in the vehicle's local frame unless noted.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DynamicsState {
    pub local_linear_velocity: Vec3A,
    pub local_angular_velocity: Vec3A,
    /// Jitter-smoothed world velocities from the previous tick
    pub world_linear_velocity: Vec3A,
    pub world_angular_velocity: Vec3A,

    pub linear_target_velocity: Vec3A,
    pub linear_decay: ExponentialTimer,
    pub angular_target_velocity: Vec3A,
    pub angular_decay: ExponentialTimer,
    pub linear_direction: Vec3A,
    pub angular_direction: Vec3A,
    pub target_linear_delta: Vec3A,
    pub target_angular_delta: Vec3A,

    /// Wall clock seconds (UNIX epoch) of the last tick or motor command
    pub last_access: f64,
    pub last_position: Vec3A,
    /// Smoothed per-tick position change used for stall detection
    pub short_term_position_delta: Vec3A,

    pub last_vertical_angle: f32,
    /// Escalating multiplier for the vertical attractor while overturned, never below 1
    pub vertical_force_adjust: f32,
    pub last_vertical_frame: u32,

    /// Smoothed timestep of the previous tick
    pub timestep: f32,

    /// World Z yaw rate commanded by the bank-to-turn logic
    pub banking_direction: f32,
    pub banking_target_velocity: f32,

    /// World frame
    pub wind_direction: Vec3A,
    pub water_direction: Vec3A,
}

impl Default for DynamicsState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl DynamicsState {
    pub const DEFAULT: Self = Self {
        local_linear_velocity: Vec3A::ZERO,
        local_angular_velocity: Vec3A::ZERO,
        world_linear_velocity: Vec3A::ZERO,
        world_angular_velocity: Vec3A::ZERO,
        linear_target_velocity: Vec3A::ZERO,
        linear_decay: ExponentialTimer::IDLE,
        angular_target_velocity: Vec3A::ZERO,
        angular_decay: ExponentialTimer::IDLE,
        linear_direction: Vec3A::ZERO,
        angular_direction: Vec3A::ZERO,
        target_linear_delta: Vec3A::ZERO,
        target_angular_delta: Vec3A::ZERO,
        last_access: 0.0,
        last_position: Vec3A::ZERO,
        short_term_position_delta: Vec3A::ZERO,
        last_vertical_angle: 0.0,
        vertical_force_adjust: 1.0,
        last_vertical_frame: 0,
        timestep: MIN_PHYSICS_TIMESTEP,
        banking_direction: 0.0,
        banking_target_velocity: 0.0,
        wind_direction: Vec3A::ZERO,
        water_direction: Vec3A::ZERO,
    };

    /// Stops every motor and forgets the attractor history.
    ///
    /// Directions are kept, so a motor resumes on the next command.
    pub fn reset(&mut self, now: f64, position: Vec3A, local_linear: Vec3A, local_angular: Vec3A) {
        self.last_access = now;
        self.last_position = position;
        self.local_linear_velocity = local_linear;
        self.local_angular_velocity = local_angular;

        self.last_vertical_angle = 0.0;
        self.vertical_force_adjust = 1.0;

        self.linear_decay.park(decay::IDLE_INDEX);
        self.angular_decay.park(decay::IDLE_INDEX);
        self.linear_target_velocity = Vec3A::ZERO;
        self.angular_target_velocity = Vec3A::ZERO;

        self.banking_direction = 0.0;
        self.banking_target_velocity = 0.0;

        self.target_linear_delta = Vec3A::ZERO;
        self.target_angular_delta = Vec3A::ZERO;
    }

    /// Parks the linear motor, used when it has to let go at once
    pub fn kill_linear_motor(&mut self, index: f32) {
        self.linear_decay.park(index);
        self.linear_target_velocity = Vec3A::ZERO;
    }

    pub fn kill_angular_motor(&mut self, index: f32) {
        self.angular_decay.park(index);
        self.angular_target_velocity = Vec3A::ZERO;
    }
}
