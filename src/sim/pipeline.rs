use std::sync::Arc;

use glam::Vec3A;
use log::{debug, info};

use crate::consts::{
    MIN_PHYSICS_TIMESTEP, RESET_GAP_SECS, TICKS_PER_CAMERA_CHECK, TICKS_PER_PARAM_DUMP,
    limits::MAX_HOVER_TIMESCALE,
};

use super::{
    CameraData, CameraSource, Clock, DynamicsState, FloatParam, HoverFlags, ParamChange,
    ParamSetting, ParameterStore, ParameterTable, RigidBody, RotationParam, RunningStat, Scene,
    SimulationConfig, SystemClock, VectorParam, VehicleContext, VehicleFlags, VehicleMotor,
    VehicleProperties, VehicleType, motor, stages,
};

/// Physics engines report colliding bodies with velocities that flip sign every frame.
/// Same-signed readings are taken as is, flips are averaged with the previous reading.
fn smooth_jitter(previous: Vec3A, reported: Vec3A) -> Vec3A {
    Vec3A::select(
        (previous * reported).cmpge(Vec3A::ZERO),
        reported,
        previous * 0.5 + reported * 0.5,
    )
}

/// The vehicle controller of one physical object.
///
/// Owns a shadow copy of the shared [`ParameterStore`] that only changes between ticks,
/// when the queued parameter changes are applied.
pub struct VehicleDynamics {
    store: Arc<ParameterStore>,
    params: ParameterTable,
    state: DynamicsState,
    motor: VehicleMotor,
    config: SimulationConfig,
    clock: Box<dyn Clock>,
    region_id: Option<u64>,
    camera: CameraData,
    timestep_stats: RunningStat,
}

impl VehicleDynamics {
    /// Attaches a controller to `body` with the default configuration and the system clock
    #[must_use]
    pub fn new(store: Arc<ParameterStore>, body: &mut dyn RigidBody) -> Self {
        Self::with_options(store, SimulationConfig::DEFAULT, Box::new(SystemClock), body)
    }

    #[must_use]
    pub fn with_options(
        store: Arc<ParameterStore>,
        config: SimulationConfig,
        clock: Box<dyn Clock>,
        body: &mut dyn RigidBody,
    ) -> Self {
        Self::build(store, DynamicsState::DEFAULT, config, clock, body)
    }

    /// Restores a controller from saved properties, filling keys the save lacks with defaults
    #[must_use]
    pub fn from_properties(
        saved: &VehicleProperties,
        config: SimulationConfig,
        clock: Box<dyn Clock>,
        body: &mut dyn RigidBody,
    ) -> Self {
        let props = VehicleProperties::restore(saved);
        let store = Arc::new(ParameterStore::from_table(props.table));
        Self::build(store, props.dynamics, config, clock, body)
    }

    fn build(
        store: Arc<ParameterStore>,
        state: DynamicsState,
        config: SimulationConfig,
        clock: Box<dyn Clock>,
        body: &mut dyn RigidBody,
    ) -> Self {
        // the snapshot already holds everything queued so far
        let params = store.snapshot();
        let _ = store.drain_changes();

        let mut dynamics = Self {
            store,
            params,
            state,
            motor: VehicleMotor::new(),
            config,
            clock,
            region_id: None,
            camera: CameraData::INVALID,
            timestep_stats: RunningStat::new(),
        };
        dynamics.default_actions(body);

        if dynamics.config.debug.vehicle_change {
            info!(
                "Vehicle constructed: type={:?} at {}",
                dynamics.params.vehicle_type,
                body.position()
            );
        }

        dynamics
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<ParameterStore> {
        &self.store
    }

    /// The parameters the simulation is running with
    #[must_use]
    pub const fn params(&self) -> &ParameterTable {
        &self.params
    }

    #[must_use]
    pub const fn state(&self) -> &DynamicsState {
        &self.state
    }

    #[must_use]
    pub const fn state_mut(&mut self) -> &mut DynamicsState {
        &mut self.state
    }

    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub const fn set_config(&mut self, config: SimulationConfig) {
        self.config = config;
    }

    #[must_use]
    pub const fn motor(&self) -> &VehicleMotor {
        &self.motor
    }

    /// The camera snapshot taken by the last camera check
    #[must_use]
    pub const fn camera(&self) -> &CameraData {
        &self.camera
    }

    /// Real-vs-nominal timestep slippage, collected while timestep tracing is on
    #[must_use]
    pub const fn timestep_stats(&self) -> &RunningStat {
        &self.timestep_stats
    }

    /// Everything needed to recreate this vehicle elsewhere
    #[must_use]
    pub fn properties(&self) -> VehicleProperties {
        VehicleProperties {
            table: self.store.snapshot(),
            dynamics: self.state,
        }
    }

    /// Runs the side effects of every parameter change queued on the store since the last call
    pub fn apply_pending_changes(&mut self, body: &mut dyn RigidBody) {
        for change in self.store.drain_changes() {
            match change {
                ParamChange::Param(ParamSetting::Float(param, value)) => {
                    self.float_param_changed(body, param, value);
                }
                ParamChange::Param(ParamSetting::Vector(param, value)) => {
                    self.vector_param_changed(body, param, value);
                }
                ParamChange::Param(ParamSetting::Rotation(param, value)) => {
                    self.params.set(ParamSetting::Rotation(param, value));
                    body.wake_up();
                }
                ParamChange::VehicleType(vehicle_type) => {
                    self.vehicle_type_changed(body, vehicle_type);
                }
                ParamChange::Flags(flags) => self.vehicle_flags_changed(body, flags),
            }
        }
    }

    fn float_param_changed(&mut self, body: &mut dyn RigidBody, param: FloatParam, value: f32) {
        match param {
            FloatParam::Buoyancy => {
                // relative to the gravity multiplier so a body with less gravity can still float
                let mut gm = body.gravity_multiplier().abs();
                if gm == 0.0 {
                    gm = 1.0;
                }
                let setting = ParamSetting::Float(param, value.clamp(-gm, gm));
                self.params.set(setting);
                self.store.store_adjusted(setting);
                self.set_buoyancy(body);
            }
            FloatParam::HoverHeight | FloatParam::HoverEfficiency | FloatParam::HoverTimescale => {
                self.params.set(ParamSetting::Float(param, value));
                self.set_hover(body);
            }
            _ => self.params.set(ParamSetting::Float(param, value)),
        }

        body.wake_up();
    }

    fn vector_param_changed(&mut self, body: &mut dyn RigidBody, param: VectorParam, value: Vec3A) {
        self.params.set(ParamSetting::Vector(param, value));

        match param {
            VectorParam::AngularMotorDirection => {
                // the camera owns the angular motor while mouselook steering or banking
                let camera_driven = self.camera.mouselook
                    && self
                        .params
                        .flags
                        .intersects(VehicleFlags::MOUSELOOK_BANK | VehicleFlags::MOUSELOOK_STEER);
                if !camera_driven {
                    self.move_angular(body, value);
                }
            }
            VectorParam::LinearMotorDirection => self.move_linear(body, value),
            _ => {}
        }

        body.wake_up();
    }

    fn vehicle_type_changed(&mut self, body: &mut dyn RigidBody, vehicle_type: VehicleType) {
        info!("Vehicle type changed to {vehicle_type:?}");

        self.params.load_defaults(vehicle_type);
        self.default_actions(body);
        self.reset_dynamics(body);

        self.set_hover(body);
        self.set_buoyancy(body);
        self.prepare_camera_and_wind(body);

        body.stop_rot_look_at();
        body.stop_move_to_target();
        body.wake_up();
    }

    fn vehicle_flags_changed(&mut self, body: &mut dyn RigidBody, flags: VehicleFlags) {
        self.params.flags = flags;

        self.set_hover(body);
        self.set_buoyancy(body);
        self.prepare_camera_and_wind(body);

        body.wake_up();
    }

    /// The object is about to leave the simulation, e.g. for a region crossing
    pub fn on_physics_suspended(&mut self) {}

    /// The object is simulating again after a crossing or a restore.
    ///
    /// Timestamps are not comparable across hosts, so the gap detection starts over.
    pub fn on_physics_resumed(&mut self, body: &mut dyn RigidBody, scene: &dyn Scene) {
        let region = scene.region_id();
        if self.config.debug.region_change {
            info!("Vehicle resumed in region {region}");
        }

        self.region_id = Some(region);
        self.state.last_access = self.clock.now();
        self.default_actions(body);
        body.wake_up();
    }

    /// Commands the linear motor toward `direction`, in meters per second in the vehicle frame
    pub fn move_linear(&mut self, body: &mut dyn RigidBody, direction: Vec3A) {
        if self.params.vehicle_type == VehicleType::None {
            return;
        }

        motor::move_linear(&mut self.state, &self.params, self.clock.now(), direction);
        body.wake_up();
    }

    /// Commands the angular motor toward `direction`, in radians per second in the vehicle frame
    pub fn move_angular(&mut self, body: &mut dyn RigidBody, direction: Vec3A) {
        if self.params.vehicle_type == VehicleType::None {
            return;
        }

        motor::move_angular(&mut self.state, &self.params, self.clock.now(), direction);
        body.wake_up();
    }

    /// Stops every motor and resamples the velocities from `body`
    pub fn reset_dynamics(&mut self, body: &dyn RigidBody) {
        let rotation = body.rotation() * self.params.rotation(RotationParam::ReferenceFrame);
        let inverse = rotation.inverse();

        self.state.reset(
            self.clock.now(),
            body.position(),
            inverse * body.linear_velocity(),
            inverse * body.angular_velocity(),
        );
    }

    fn default_actions(&mut self, body: &mut dyn RigidBody) {
        if self.config.debug.vehicle_change {
            info!(
                "Vehicle default actions: type={:?} at {}",
                self.params.vehicle_type,
                body.position()
            );
        }

        if self.params.vehicle_type == VehicleType::Sled {
            body.set_material_friction(0.0, 0.0);
        }

        self.set_hover(body);
        self.set_buoyancy(body);
        self.prepare_camera_and_wind(body);
    }

    fn set_buoyancy(&self, body: &mut dyn RigidBody) {
        body.set_buoyancy(self.params.float(FloatParam::Buoyancy));
    }

    /// Installs, adjusts or removes the vehicle's hover. It replaces any hover a script set on its own.
    fn set_hover(&mut self, body: &mut dyn RigidBody) {
        let height = self.params.float(FloatParam::HoverHeight);
        let timescale = self.params.float(FloatParam::HoverTimescale);
        let efficiency = self.params.float(FloatParam::HoverEfficiency);

        // legacy scripts switch hover off with a zero height and efficiency
        if timescale >= MAX_HOVER_TIMESCALE || (height <= 0.0 && efficiency == 0.0) {
            if body.hover_flags().contains(HoverFlags::VEHICLE) {
                let setting = ParamSetting::Float(FloatParam::HoverTimescale, MAX_HOVER_TIMESCALE);
                self.params.set(setting);
                self.store.store_adjusted(setting);
                body.clear_hover();
            }
            return;
        }

        let flags = self.params.flags;
        let mut hover = if flags.contains(VehicleFlags::HOVER_GLOBAL_HEIGHT) {
            HoverFlags::GLOBAL
        } else {
            // both limits set means no limit
            let mut hover = HoverFlags::WATER | HoverFlags::GROUND;
            if !flags.contains(VehicleFlags::HOVER_WATER_ONLY | VehicleFlags::HOVER_TERRAIN_ONLY) {
                if flags.contains(VehicleFlags::HOVER_WATER_ONLY) {
                    hover.remove(HoverFlags::GROUND);
                }
                if flags.contains(VehicleFlags::HOVER_TERRAIN_ONLY) {
                    hover.remove(HoverFlags::WATER);
                }
            }
            hover
        };

        if flags.contains(VehicleFlags::HOVER_UP_ONLY) {
            hover |= HoverFlags::UP_ONLY;
        }
        hover |= HoverFlags::VEHICLE;

        body.set_hover(hover, height, timescale, efficiency);
    }

    /// Camera and wind tracking need the body awake at rest, since nothing else would wake it
    fn prepare_camera_and_wind(&mut self, body: &mut dyn RigidBody) {
        self.camera.mouselook = false;
        self.state.wind_direction = Vec3A::ZERO;
        self.state.water_direction = Vec3A::ZERO;

        let tracking = self
            .params
            .flags
            .intersects(VehicleFlags::MOUSE_ANY | VehicleFlags::ENVIRONMENT_ANY);
        body.set_sleep_threshold(if tracking {
            0.0
        } else {
            self.config.default_sleep_threshold
        });
    }

    fn print_params(&self) {
        info!(
            "Vehicle parameters: type={:?} flags={:?}",
            self.params.vehicle_type, self.params.flags
        );

        for (param, value) in self.params.vectors() {
            info!("   {param:?}={value}");
        }
        for (param, value) in self.params.floats() {
            info!("   {param:?}={value}");
        }
        for (param, value) in self.params.rotations() {
            info!("   {param:?}={value}");
        }
    }

    /// Measures the real time since the previous tick and resets the motors after a long gap.
    ///
    /// A gap longer than a second means the object was edited, rezzed or stalled by the host,
    /// and the motors must not resume with stale forces.
    fn check_reset_motors(&mut self, body: &mut dyn RigidBody, dt: f32, frame: u32) -> f32 {
        let now = self.clock.now();
        let gap = now - self.state.last_access;
        let actual_step = if gap == 0.0 {
            MIN_PHYSICS_TIMESTEP
        } else {
            gap as f32
        };

        if self.config.debug.timestep {
            let slippage = actual_step - dt;
            self.timestep_stats.push(f64::from(slippage));

            if slippage.abs() > 0.01 {
                info!("Timestep slippage: actual={gap} nominal={dt}");
            }

            if frame % TICKS_PER_PARAM_DUMP == 0 {
                info!(
                    "Timestep slippage stats: n={} mean={} std_dev={}",
                    self.timestep_stats.count(),
                    self.timestep_stats.mean(),
                    self.timestep_stats.std_dev()
                );
            }
        }

        self.state.last_access = now;
        if gap > RESET_GAP_SECS {
            if self.config.debug.timestep {
                debug!("Vehicle motors reset after a {gap}s gap");
            }
            self.reset_dynamics(body);
            body.wake_up();
        }

        actual_step
    }

    fn camera_input(
        &mut self,
        ctx: &VehicleContext,
        body: &mut dyn RigidBody,
        camera: &dyn CameraSource,
    ) {
        if ctx.frame % TICKS_PER_CAMERA_CHECK != 0 || !ctx.has(VehicleFlags::MOUSE_ANY) {
            return;
        }

        self.camera = camera.snapshot();
        if !self.camera.valid {
            return;
        }

        let commands = stages::camera_steering(ctx, &self.params, &self.camera);
        if commands.is_empty() {
            return;
        }

        let now = self.clock.now();
        for command in commands {
            motor::move_angular(&mut self.state, &self.params, now, command);
        }
        body.wake_up();
    }

    /// Advances the vehicle by one physics frame.
    ///
    /// `dt` is the engine's timestep and `frame` its running frame counter. Forces and torques
    /// go to `body`, to be integrated by the engine's own step.
    pub fn tick(
        &mut self,
        body: &mut dyn RigidBody,
        scene: &dyn Scene,
        camera: &dyn CameraSource,
        dt: f32,
        frame: u32,
    ) {
        self.apply_pending_changes(body);

        if self.params.vehicle_type == VehicleType::None {
            return;
        }

        // shows up on a later tick, the stages that need it skip until then
        if body.bounding_box().is_none() {
            body.request_bounding_box();
        }

        // the engine's timestep bobbles between one and two frames under light load
        let dt = self.state.timestep * 0.8 + dt * 0.2;

        // a save that raced with the type assignment leaves the table empty
        if self.params.is_uninitialized() {
            info!(
                "Vehicle parameters missing, reloading {:?} defaults",
                self.params.vehicle_type
            );
            self.params.load_defaults(self.params.vehicle_type);
            self.default_actions(body);
        }

        if self.config.debug.print_params && frame % TICKS_PER_PARAM_DUMP == 0 {
            self.print_params();
        }

        // fighting a user's drag makes the object thrash
        if body.is_grabbed() {
            return;
        }

        let reference_frame = self.params.rotation(RotationParam::ReferenceFrame);
        let rotation = body.rotation() * reference_frame;
        let inverse = rotation.inverse();

        let world_angular = smooth_jitter(self.state.world_angular_velocity, body.angular_velocity());
        let world_linear = smooth_jitter(self.state.world_linear_velocity, body.linear_velocity());
        self.state.world_angular_velocity = world_angular;
        self.state.world_linear_velocity = world_linear;
        let local_angular = inverse * world_angular;
        let local_linear = inverse * world_linear;

        let region = scene.region_id();
        if self.region_id != Some(region) {
            if self.config.debug.region_change {
                info!("Vehicle changed region: new={region}");
            }

            self.region_id = Some(region);
            // no phantom stall or reset at the crossing
            self.state.last_access = self.clock.now();
            self.default_actions(body);
        }

        let actual_step = self.check_reset_motors(body, dt, frame);
        self.motor.torque_init();
        self.motor.clear_stall();
        self.state.timestep = dt;

        let ctx = VehicleContext {
            dt,
            frame,
            vehicle_type: self.params.vehicle_type,
            flags: self.params.flags,
            position: body.position(),
            reference_frame,
            rotation,
            world_linear_velocity: world_linear,
            world_angular_velocity: world_angular,
            local_linear_velocity: local_linear,
            local_angular_velocity: local_angular,
            mass: body.mass(),
            inertia: body.inertia_tensor(),
            gravity: self.config.gravity,
            debug: self.config.debug,
        };
        let enable = self.config.enable;

        if enable.spike_detection {
            stages::mitigate_spiking(&ctx, &self.state, body, &mut self.motor, actual_step);
        }

        self.camera_input(&ctx, body, camera);
        stages::build_wind_data(&ctx, &mut self.state, scene);
        stages::fix_ground_penetration(&ctx, body, scene);
        stages::boat_ground_drag(&ctx, &mut self.state, &*body, scene);

        if enable.angular_deflection {
            stages::angular_deflection(&ctx, &self.params, &mut self.state, &mut self.motor);
        }

        if enable.linear_deflection {
            stages::linear_deflection(&ctx, &self.params, body);
        }

        stages::sled_movement(&ctx, &self.params, &mut self.state, body, &mut self.motor);

        let mut attraction_forces = Vec3A::ZERO;
        if enable.vertical_attractor {
            let attraction =
                stages::vertical_attractor(&ctx, &self.params, &mut self.state, &mut self.motor);
            stages::banking_to_yaw(&ctx, &self.params, &mut self.state, attraction, enable.banking);
            attraction_forces = attraction.forces;
        }

        if ctx.flags.contains(VehicleFlags::REACT_TO_WIND) {
            stages::wind_forces(&ctx, &self.params, &self.state, body, &mut self.motor);
        }

        if enable.motors {
            self.motor
                .simulate(&ctx, &self.params, &mut self.state, body, scene, attraction_forces);
        }

        if enable.angular_friction {
            stages::angular_friction(&ctx, &self.params, &mut self.motor);
        }

        if enable.linear_friction {
            stages::linear_friction(&ctx, &self.params, body);
        }

        self.motor.torque_fini(body);

        self.state.last_position = body.position();
        self.state.timestep = dt;
        self.state.local_linear_velocity = local_linear;
        self.state.local_angular_velocity = local_angular;
    }
}
