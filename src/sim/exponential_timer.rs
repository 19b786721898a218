use glam::Vec3A;

use crate::{
    consts::{MIN_PHYSICS_TIMESTEP, decay as decay_consts, threshold},
    math,
};

/// Elapsed time since a motor was last commanded, driving the motor's exponential decay.
///
/// The index grows by the timestep every tick and is restarted near zero by a new command.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ExponentialTimer {
    index: f32,
}

impl Default for ExponentialTimer {
    fn default() -> Self {
        Self::IDLE
    }
}

impl ExponentialTimer {
    /// A motor that has been idle long enough to be fully decayed
    pub const IDLE: Self = Self::new(decay_consts::IDLE_INDEX);

    #[must_use]
    pub const fn new(index: f32) -> Self {
        Self { index }
    }

    #[must_use]
    pub const fn index(self) -> f32 {
        self.index
    }

    #[inline]
    #[must_use]
    pub fn factor(self, timescale: f32) -> f32 {
        math::decay(self.index, timescale)
    }

    /// Per-axis decay factors for the given per-axis timescales
    #[inline]
    #[must_use]
    pub fn factors(self, timescale: Vec3A) -> Vec3A {
        Vec3A::new(
            self.factor(timescale.x),
            self.factor(timescale.y),
            self.factor(timescale.z),
        )
    }

    #[inline]
    pub fn advance(&mut self, dt: f32) {
        self.index += dt;
    }

    /// Restarts the clock for a new motor command.
    ///
    /// Short motor timescales push the start slightly negative so the ramp-up
    /// gets a head start before the decay kicks in.
    pub fn restart(&mut self, motor_timescale: Vec3A) {
        let mag = motor_timescale.length();
        let delay = if mag < 0.9 { 1.0 - mag } else { 0.0 };
        self.index = MIN_PHYSICS_TIMESTEP * (1.0 - delay) - threshold::DELAY_FUBAR * delay;
    }

    /// True while the motor was commanded less than `threshold` seconds ago
    #[inline]
    #[must_use]
    pub fn is_engaged(self, threshold: f32) -> bool {
        self.index < threshold
    }

    /// True once more than `threshold` seconds have passed since the last command
    #[inline]
    #[must_use]
    pub fn has_elapsed(self, threshold: f32) -> bool {
        self.index > threshold
    }

    #[inline]
    pub fn park(&mut self, index: f32) {
        self.index = index;
    }

    #[inline]
    pub fn bump(&mut self, secs: f32) {
        self.index += secs;
    }
}
