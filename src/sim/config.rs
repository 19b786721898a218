use crate::consts::{DEFAULT_GRAVITY_Z, DEFAULT_SLEEP_THRESHOLD};

/// Switches for the individual tick stages
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageEnables {
    pub angular_deflection: bool,
    pub linear_deflection: bool,
    pub motors: bool,
    pub angular_friction: bool,
    pub linear_friction: bool,
    pub vertical_attractor: bool,
    pub banking: bool,
    pub spike_detection: bool,
}

impl Default for StageEnables {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl StageEnables {
    pub const DEFAULT: Self = Self {
        angular_deflection: true,
        linear_deflection: true,
        motors: true,
        angular_friction: true,
        linear_friction: true,
        vertical_attractor: true,
        banking: true,
        spike_detection: true,
    };

    /// Every stage switched off, for isolating one stage at a time
    pub const NONE: Self = Self {
        angular_deflection: false,
        linear_deflection: false,
        motors: false,
        angular_friction: false,
        linear_friction: false,
        vertical_attractor: false,
        banking: false,
        spike_detection: false,
    };
}

/// Verbose tracing toggles. Each one gates the `debug!` lines of its stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugSwitches {
    pub print_params: bool,
    pub timestep: bool,
    pub spike_detection: bool,
    pub vehicle_change: bool,
    pub angular: bool,
    pub banking: bool,
    pub blended_z: bool,
    pub linear: bool,
    pub attractor: bool,
    pub raycast: bool,
    pub wind: bool,
    pub angular_friction: bool,
    pub linear_friction: bool,
    pub angular_motor: bool,
    pub linear_motor: bool,
    pub deflection: bool,
    pub region_change: bool,
}

impl DebugSwitches {
    pub const DEFAULT: Self = Self {
        print_params: false,
        timestep: false,
        spike_detection: false,
        vehicle_change: false,
        angular: false,
        banking: false,
        blended_z: false,
        linear: false,
        attractor: false,
        raycast: false,
        wind: false,
        angular_friction: false,
        linear_friction: false,
        angular_motor: false,
        linear_motor: false,
        deflection: false,
        region_change: false,
    };
}

/// Per-instance simulation settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
    pub enable: StageEnables,
    pub debug: DebugSwitches,
    /// World Z gravity acceleration
    pub gravity: f32,
    /// Sleep threshold restored once camera and environment tracking are off
    pub default_sleep_threshold: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl SimulationConfig {
    pub const DEFAULT: Self = Self {
        enable: StageEnables::DEFAULT,
        debug: DebugSwitches::DEFAULT,
        gravity: DEFAULT_GRAVITY_Z,
        default_sleep_threshold: DEFAULT_SLEEP_THRESHOLD,
    };

    #[must_use]
    pub const fn with_enables(mut self, enable: StageEnables) -> Self {
        self.enable = enable;
        self
    }

    #[must_use]
    pub const fn with_debug(mut self, debug: DebugSwitches) -> Self {
        self.debug = debug;
        self
    }
}
