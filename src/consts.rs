use std::f32::consts::PI;

/// Smallest physics step the engine will run, and the floor for every timescale parameter
pub const MIN_PHYSICS_TIMESTEP: f32 = 0.0156;
/// Smallest force component the engine does not treat as zero
pub const MIN_PHYSICS_FORCE: f32 = 0.001;

pub const TICKS_PER_RAYCAST: u32 = 8;
pub const TICKS_PER_WIND_CHECK: u32 = 8;
pub const TICKS_PER_CAMERA_CHECK: u32 = 8;
pub const TICKS_PER_PARAM_DUMP: u32 = 600;

/// Real-time gap after which the motors are treated as stale (edit or rez)
pub const RESET_GAP_SECS: f64 = 1.0;

pub const REGION_MIN_HEIGHT: f32 = -128.0;
pub const REGION_MAX_HEIGHT: f32 = 10000.0;

pub const DEFAULT_GRAVITY_Z: f32 = -9.8;
pub const DEFAULT_SLEEP_THRESHOLD: f32 = 0.005;

pub mod threshold {
    use super::PI;

    pub const LINEAR_MOTOR_DELTA_V: f32 = 0.005;
    pub const ANGULAR_MOTOR_DELTA_V: f32 = PI / 512.0;
    /// Speed change below which friction hands over to a full stop
    pub const LINEAR_FRICTION_DELTA_V: f32 = 0.002;
    pub const ANGULAR_FRICTION_DELTA_V: f32 = 0.004;
    /// Deflection stays off below this speed, otherwise the object squirms
    pub const DEFLECTION_SPEED: f32 = 0.2;
    pub const DEFLECTION_ANGLE: f32 = PI / 64.0;
    pub const STICTION_FACTOR: f32 = 0.002;
    pub const ANGULAR_MOTOR_ENGAGED: f32 = 0.9;
    pub const LINEAR_MOTOR_ENGAGED: f32 = 1.0;
    pub const LINEAR_MOTOR_UNSTUCK: f32 = 0.025;
    pub const ATTRACTOR_ANGLE: f32 = PI / 256.0;
    pub const OVERTURN_ANGLE: f32 = PI * 0.60;
    pub const DELAY_FUBAR: f32 = 0.06;
    pub const BANK_ANGLE: f32 = PI / 128.0;
    pub const MOUSELOOK_ANGLE: f32 = PI / 32.0;
    /// Growth-rate sentinel: decelerate fully this step, rise with the opposite sign next step
    pub const INVERSE_CROSSOVER: f32 = -2.010203;
}

pub mod limits {
    use super::PI;

    /// Legacy speed cap used by the bank-to-turn and deflection shaping
    pub const MAX_LEGACY_LINEAR_VELOCITY: f32 = 30.0;
    pub const MAX_LEGACY_ANGULAR_VELOCITY: f32 = PI;
    pub const MAX_LINEAR_VELOCITY: f32 = 200.0;
    pub const MAX_LINEAR_OFFSET: f32 = 100.0;
    pub const MAX_ANGULAR_VELOCITY: f32 = PI * 4.0;
    pub const MAX_DECAY_TIMESCALE: f32 = 120.0;
    pub const MAX_ATTRACT_TIMESCALE: f32 = 500.0;
    pub const MAX_HOVER_TIMESCALE: f32 = 300.0;
    pub const MAX_TIMESCALE: f32 = 1000.0;
    pub const MAX_GROUND_PENETRATION: f32 = -0.5;
    /// Seconds the attractor keeps running after the angle stops changing
    pub const MAX_ATTRACT_DORMANCY: f32 = 1.5;
    pub const MAX_WIND_EFFICIENCY: f32 = 10.0;
    pub const MAX_INVERTED_BANKING_MODIFIER: f32 = 10.0;
}

pub mod decay {
    use super::limits::MAX_DECAY_TIMESCALE;

    /// Decay index that parks a motor after a reset or a boat grounding
    pub const IDLE_INDEX: f32 = MAX_DECAY_TIMESCALE * 10.0;
    /// Decay index that parks a motor after a stall
    pub const STALLED_INDEX: f32 = MAX_DECAY_TIMESCALE * 100.0;
    /// Extra decay pushed in when the linear motor fights an active hover
    pub const HOVER_MODERATION: f32 = 10.0;
}

pub mod spike {
    /// Angular acceleration (rad/s^2) about local Y treated as an engine spike
    pub const ANGULAR_ACCEL: f32 = 100.0;
    /// Upward linear acceleration (m/s^2) treated as an engine spike
    pub const LINEAR_ACCEL: f32 = 50.0;
}

pub mod raycast {
    pub const INITIAL_HITS: usize = 16;
    pub const MAX_HITS: usize = 256;
}

pub mod wind {
    pub const GRID_SIZE: usize = 16;
    pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;
    pub const CELL_METERS: f32 = 16.0;
    pub const MIN_TERRAIN_RANGE: f32 = 15.0;
}
