use std::sync::Arc;

use glam::Quat;
use vehiclesim::consts::MIN_PHYSICS_TIMESTEP;
use vehiclesim::sim::{
    CameraData, CameraSource, ParameterStore, SimulationConfig, StageEnables, VehicleDynamics,
    VehicleType,
};

use super::{ManualClock, MockBody, MockScene};

#[derive(Clone, Copy, Debug, Default)]
pub struct MockCamera {
    pub data: CameraData,
}

impl MockCamera {
    /// A driver in mouselook looking along `rotation`
    pub const fn mouselook(rotation: Quat) -> Self {
        Self {
            data: CameraData {
                valid: true,
                mouselook: true,
                rotation,
            },
        }
    }
}

impl CameraSource for MockCamera {
    fn snapshot(&self) -> CameraData {
        self.data
    }
}

/// Only the given stages switched on
pub fn config_with(enable: StageEnables) -> SimulationConfig {
    SimulationConfig::DEFAULT.with_enables(enable)
}

/// One vehicle ticking in a mock world, with the wall clock advancing in step
pub struct Rig {
    pub dynamics: VehicleDynamics,
    pub body: MockBody,
    pub scene: MockScene,
    pub camera: MockCamera,
    pub clock: ManualClock,
    pub dt: f32,
    pub frame: u32,
}

impl Rig {
    pub fn new(vehicle_type: VehicleType, config: SimulationConfig) -> Self {
        Self::with_body(vehicle_type, config, MockBody::new())
    }

    pub fn with_body(vehicle_type: VehicleType, config: SimulationConfig, body: MockBody) -> Self {
        Self::with_store(Arc::new(ParameterStore::new(vehicle_type)), config, body)
    }

    pub fn with_store(store: Arc<ParameterStore>, config: SimulationConfig, mut body: MockBody) -> Self {
        let clock = ManualClock::default();
        let dynamics =
            VehicleDynamics::with_options(store, config, Box::new(clock.clone()), &mut body);

        Self {
            dynamics,
            body,
            scene: MockScene::new(),
            camera: MockCamera::default(),
            clock,
            dt: MIN_PHYSICS_TIMESTEP,
            frame: 0,
        }
    }

    pub fn store(&self) -> Arc<ParameterStore> {
        self.dynamics.store().clone()
    }

    /// Runs the queued parameter side effects without ticking
    pub fn apply(&mut self) {
        self.dynamics.apply_pending_changes(&mut self.body);
    }

    /// One physics frame. The body log only holds this frame's forces afterward.
    pub fn tick(&mut self) {
        self.clock.advance(f64::from(self.dt));
        self.body.clear_log();

        self.dynamics
            .tick(&mut self.body, &self.scene, &self.camera, self.dt, self.frame);

        self.body.step(self.dt);
        self.frame += 1;
    }

    pub fn ticks_for(&self, secs: f32) -> u32 {
        (secs / self.dt).round() as u32
    }

    pub fn run_for(&mut self, secs: f32) {
        for _ in 0..self.ticks_for(secs) {
            self.tick();
        }
    }
}
