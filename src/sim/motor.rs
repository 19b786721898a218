use glam::Vec3A;
use log::debug;

use crate::{
    consts::{
        MIN_PHYSICS_FORCE, TICKS_PER_RAYCAST, decay,
        limits::{
            MAX_ANGULAR_VELOCITY, MAX_ATTRACT_TIMESCALE, MAX_HOVER_TIMESCALE,
            MAX_LEGACY_ANGULAR_VELOCITY, MAX_LINEAR_VELOCITY, MAX_TIMESCALE,
        },
        raycast::{INITIAL_HITS, MAX_HITS},
        threshold::{
            ANGULAR_MOTOR_DELTA_V, ANGULAR_MOTOR_ENGAGED, INVERSE_CROSSOVER,
            LINEAR_MOTOR_DELTA_V, LINEAR_MOTOR_ENGAGED, LINEAR_MOTOR_UNSTUCK,
        },
    },
    math,
};

use super::{
    DynamicsState, FloatParam, ForceMode, ParameterTable, RaycastHit, RaycastHits, RigidBody,
    Scene, VectorParam, VehicleContext, VehicleFlags,
};

#[inline]
fn growth_rates(start: Vec3A, end: Vec3A, timescale: Vec3A) -> Vec3A {
    Vec3A::new(
        math::growth_rate(start.x, end.x, timescale.x),
        math::growth_rate(start.y, end.y, timescale.y),
        math::growth_rate(start.z, end.z, timescale.z),
    )
}

/// A crossover rate has done its job this step, from here on the velocity grows
#[inline]
fn flip_crossover(rate: Vec3A) -> Vec3A {
    Vec3A::select(rate.cmpeq(Vec3A::splat(INVERSE_CROSSOVER)), -rate, rate)
}

/// Kicks a growing velocity that is stuck near zero
#[inline]
fn unstick(new: Vec3A, rate: Vec3A, dir: Vec3A, dir_sign: Vec3A, threshold: f32) -> Vec3A {
    let stuck = rate.cmpgt(Vec3A::ZERO)
        & dir.cmpne(Vec3A::ZERO)
        & new.abs().cmplt(Vec3A::splat(threshold));
    Vec3A::select(stuck, dir_sign * threshold * 8.0, new)
}

/// The target follows the new velocity when ramping toward zero, otherwise it is capped by the command
#[inline]
fn next_target(new: Vec3A, rate: Vec3A, dir: Vec3A) -> Vec3A {
    let toward_zero = (dir * new).cmplt(Vec3A::ZERO) | rate.cmplt(Vec3A::ZERO);
    Vec3A::select(toward_zero, new, new.clamp(-dir.abs(), dir.abs()))
}

/// Components under the engine's minimum force are dropped
#[inline]
fn zero_small(v: Vec3A) -> Vec3A {
    Vec3A::select(v.abs().cmplt(Vec3A::splat(MIN_PHYSICS_FORCE)), Vec3A::ZERO, v)
}

/// Keeps the angular motor from overpowering the vertical attractor.
///
/// Pitch and roll speeds over the type's clamp point are pulled back logarithmically,
/// harder for short attraction timescales.
fn limit_for_attractor(new: Vec3A, ctx: &VehicleContext, params: &ParameterTable) -> Vec3A {
    let mut timescale = params
        .float(FloatParam::VerticalAttractionTimescale)
        .max(ctx.dt);
    if timescale >= MAX_ATTRACT_TIMESCALE {
        return new;
    }

    let mut clamp = ctx.vehicle_type.attractor_velocity_clamp();
    if timescale < 1.0 {
        clamp *= timescale;
        timescale = 1.0;
    }

    let overthrust = (timescale + 0.06).ln() / MAX_ATTRACT_TIMESCALE.ln();
    let soften = |v: f32| {
        let clamped = v.clamp(-clamp, clamp);
        if v == clamped {
            v
        } else {
            clamped + (v - clamped) * overthrust
        }
    };

    Vec3A::new(soften(new.x), soften(new.y), new.z)
}

/// Per-tick scratch of the linear, angular and banking motors.
///
/// Persistent motor state lives in [`DynamicsState`]; everything here is rebuilt from it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VehicleMotor {
    torque_velocity: Vec3A,
    torque_impulse: Vec3A,
    stall_checked: bool,
    stalled: bool,
    /// Distance to the surface below, refreshed every few ticks
    hit_dist: f32,
    /// Seconds spent above the disable-motors height
    height_exceeded: f32,
}

impl VehicleMotor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            torque_velocity: Vec3A::ZERO,
            torque_impulse: Vec3A::ZERO,
            stall_checked: false,
            stalled: false,
            hit_dist: 0.0,
            height_exceeded: 0.0,
        }
    }

    #[must_use]
    pub const fn hit_dist(&self) -> f32 {
        self.hit_dist
    }

    #[must_use]
    pub const fn height_exceeded(&self) -> f32 {
        self.height_exceeded
    }

    /// Starts a new torque batch
    pub fn torque_init(&mut self) {
        self.torque_velocity = Vec3A::ZERO;
        self.torque_impulse = Vec3A::ZERO;
    }

    /// Queues a torque for the end of the tick. Only velocity-change and impulse torques are batched.
    pub fn add_torque(&mut self, torque: Vec3A, mode: ForceMode) {
        match mode {
            ForceMode::VelocityChange => self.torque_velocity += torque,
            ForceMode::Impulse => self.torque_impulse += torque,
            ForceMode::Force => {}
        }
    }

    /// The velocity-change and impulse torques queued so far
    #[must_use]
    pub const fn pending_torque(&self) -> (Vec3A, Vec3A) {
        (self.torque_velocity, self.torque_impulse)
    }

    /// Applies the batched torques, at most one call per mode
    pub fn torque_fini(&mut self, body: &mut dyn RigidBody) {
        for (torque, mode) in [
            (self.torque_velocity, ForceMode::VelocityChange),
            (self.torque_impulse, ForceMode::Impulse),
        ] {
            let torque = zero_small(torque);
            if torque != Vec3A::ZERO {
                body.add_torque(torque, mode, torque.length() > ANGULAR_MOTOR_DELTA_V);
            }
        }

        self.torque_init();
    }

    /// Applies a linear force through the vehicle's linear motor offset.
    ///
    /// Off-center forces go through the engine's impulse-at-position call, so velocity
    /// changes are converted to impulses first.
    pub fn add_force(body: &mut dyn RigidBody, offset: Vec3A, force: Vec3A, mode: ForceMode) {
        let wake = force.length() > LINEAR_MOTOR_DELTA_V;

        if offset == Vec3A::ZERO {
            body.add_force(force, mode, wake);
        } else {
            let force = if mode == ForceMode::VelocityChange {
                force * body.mass()
            } else {
                force
            };
            body.add_force_at_local_pos(force, offset, ForceMode::Impulse, wake);
        }
    }

    pub fn clear_stall(&mut self) {
        self.stalled = false;
        self.stall_checked = false;
    }

    /// True when the vehicle is jammed against something while its motors push.
    ///
    /// The position history is sampled on the first call of each tick only.
    pub fn is_stalled(&mut self, ctx: &VehicleContext, state: &mut DynamicsState) -> bool {
        let speed = ctx.world_linear_velocity.length();

        if !self.stall_checked {
            self.stall_checked = true;

            // void borders kick the body back positionally, smooth that out
            let delta = ctx.position - state.last_position;
            state.short_term_position_delta = state.short_term_position_delta * 0.8 + delta * 0.2;

            // a motor that just started gets a chance to build up speed
            if state.linear_decay.has_elapsed(LINEAR_MOTOR_ENGAGED)
                && state.angular_decay.has_elapsed(ANGULAR_MOTOR_ENGAGED)
            {
                let st_speed = state.short_term_position_delta.length() / ctx.dt;
                if st_speed < speed * 0.5 && speed >= LINEAR_MOTOR_UNSTUCK {
                    self.stalled = true;
                }
            }
        }

        if ctx.debug.linear_motor && self.stalled {
            debug!("Linear motor stalled: speed={speed}");
        }

        self.stalled
    }

    /// Nearest hit along a ray that does not belong to `self_id`, within `distance`.
    ///
    /// The result buffer grows from 16 to 256 entries while the scene reports an overflow.
    /// Past that the cast counts as a miss.
    pub fn raycast_nearest(
        scene: &dyn Scene,
        self_id: u64,
        origin: Vec3A,
        direction: Vec3A,
        distance: f32,
        trace: bool,
    ) -> Option<RaycastHit> {
        let mut hits = RaycastHits::new();
        let mut capacity = INITIAL_HITS;

        loop {
            hits.clear();
            if scene
                .raycast(origin, direction, distance, capacity, &mut hits)
                .is_ok()
            {
                break;
            }

            capacity *= 2;
            if capacity > MAX_HITS {
                if trace {
                    debug!("Raycast overflowed {MAX_HITS} hits, giving up");
                }
                return None;
            }
        }

        let mut nearest = None;
        let mut lowest = distance + 1.0;
        for (i, hit) in hits.iter().enumerate() {
            if trace {
                debug!(
                    "Raycast hit {} of {}: dist={} body={}",
                    i + 1,
                    hits.len(),
                    hit.distance,
                    hit.body_id
                );
            }

            if hit.body_id == self_id {
                continue;
            }

            if hit.distance < lowest {
                lowest = hit.distance;
                nearest = Some(*hit);
            }
        }

        nearest.filter(|hit| hit.distance <= distance)
    }

    /// Runs the linear, angular and bank-to-turn motors for one tick.
    ///
    /// `aforces` is the attractor torque applied this tick; axes it drives without a motor
    /// command are left to it.
    pub fn simulate(
        &mut self,
        ctx: &VehicleContext,
        params: &ParameterTable,
        state: &mut DynamicsState,
        body: &mut dyn RigidBody,
        scene: &dyn Scene,
        aforces: Vec3A,
    ) {
        let disable = self.motors_disabled(ctx, params, &*body, scene);

        self.simulate_linear(ctx, params, state, body, disable);
        let angular_z = self.simulate_angular(ctx, params, state, disable, aforces);
        let banking_z = self.simulate_banking(ctx, params, state);

        // yaw from the angular motor and the banking motor go out as one torque
        let z = banking_z + angular_z;
        if z.abs() >= ANGULAR_MOTOR_DELTA_V {
            if ctx.debug.blended_z || ctx.debug.angular {
                debug!(
                    "Blended Z: bank={banking_z} angular={angular_z} last={} bank_target={} angular_target={}",
                    ctx.world_angular_velocity.z,
                    state.banking_target_velocity,
                    state.angular_target_velocity.z
                );
            }

            self.add_torque(Vec3A::new(0.0, 0.0, z), ForceMode::VelocityChange);
        }
    }

    /// Airborne detection. Casts down from both bottom edges every few ticks and
    /// reports whether the vehicle has been above the disable height for long enough.
    fn motors_disabled(
        &mut self,
        ctx: &VehicleContext,
        params: &ParameterTable,
        body: &dyn RigidBody,
        scene: &dyn Scene,
    ) -> bool {
        let buoyancy = params.float(FloatParam::Buoyancy);
        let hover_timescale = params.float(FloatParam::HoverTimescale);
        let mut limit = params.float(FloatParam::DisableMotorsAbove);

        if hover_timescale < MAX_HOVER_TIMESCALE
            || buoyancy > 0.0
            || ctx.local_linear_velocity.length() < 0.5
        {
            self.hit_dist = 0.0;
            limit = 0.0;
        }

        if limit > 0.0
            && ctx.frame % TICKS_PER_RAYCAST == 0
            && let Some(obb) = body.bounding_box()
        {
            let origin = ctx.position + ctx.to_world(obb.center);
            let down = ctx.to_world(Vec3A::NEG_Z);
            let lift = ctx.to_world(Vec3A::Z);
            let left = ctx.to_world(Vec3A::new(0.0, obb.extent.y, -obb.extent.z));
            let right = ctx.to_world(Vec3A::new(0.0, -obb.extent.y, -obb.extent.z));

            for (side, edge) in [("left", left), ("right", right)] {
                let hit = Self::raycast_nearest(
                    scene,
                    body.id(),
                    origin + edge + lift,
                    down,
                    limit * 3.0,
                    ctx.debug.raycast,
                );

                self.hit_dist = match hit {
                    Some(hit) => hit.distance - lift.z,
                    None => limit + 1.0,
                };

                if ctx.debug.raycast {
                    debug!("Ground cast {side}: dist={} hit={}", self.hit_dist, hit.is_some());
                }

                if self.hit_dist <= limit {
                    break;
                }
            }
        }

        if self.hit_dist > limit {
            self.height_exceeded += ctx.dt * TICKS_PER_RAYCAST as f32;
            self.height_exceeded >= params.float(FloatParam::DisableMotorsAfter)
        } else {
            self.height_exceeded = 0.0;
            false
        }
    }

    fn simulate_linear(
        &mut self,
        ctx: &VehicleContext,
        params: &ParameterTable,
        state: &mut DynamicsState,
        body: &mut dyn RigidBody,
        disable: bool,
    ) {
        let last = ctx.local_linear_velocity;
        let dir = state.linear_direction;
        let dir_sign = math::posneg_vec(dir);

        // friction at low speed eats small velocity changes, the target keeps the ramp going
        let target = state.linear_target_velocity;
        let adj = Vec3A::select(
            (dir_sign * (target - last)).cmpge(Vec3A::ZERO),
            target,
            last,
        );

        let mut rate = growth_rates(
            adj,
            dir,
            params.vector(VectorParam::LinearMotorTimescale) / ctx.dt,
        );
        let mut dfactor = state
            .linear_decay
            .factors(params.vector(VectorParam::LinearMotorDecayTimescale));
        state.linear_decay.advance(ctx.dt);

        if dfactor.length() == 0.0 {
            state.linear_target_velocity = last;
            return;
        }

        let mut new = adj + adj * rate;
        rate = flip_crossover(rate);
        new = unstick(new, rate, dir, dir_sign, LINEAR_MOTOR_DELTA_V);

        state.linear_target_velocity = next_target(new, rate, dir);
        new = new.clamp(
            Vec3A::splat(-MAX_LINEAR_VELOCITY),
            Vec3A::splat(MAX_LINEAR_VELOCITY),
        );

        let released = state.linear_target_velocity.cmpeq(Vec3A::ZERO) & dir.cmpeq(Vec3A::ZERO);
        new = Vec3A::select(released, last, new);

        // already faster than the motor along an axis, so the motor adds no power there
        let coasting = rate.cmpge(Vec3A::ZERO) & (dir_sign * (last - new)).cmpgt(Vec3A::ZERO);
        dfactor = Vec3A::select(coasting, Vec3A::ZERO, dfactor);

        if dfactor.length() != 0.0 && self.is_stalled(ctx, state) {
            dfactor = Vec3A::ZERO;
            state.kill_linear_motor(decay::STALLED_INDEX);
        }

        new = new * dfactor + last * (1.0 - dfactor);

        let mut world = ctx.to_world(new);
        if !math::any_abs_ge(world, LINEAR_MOTOR_DELTA_V) {
            return;
        }

        world -= ctx.world_linear_velocity;

        if ctx.has(VehicleFlags::LIMIT_MOTOR_UP) && world.z > 0.0 {
            world.z = 0.0;
        }
        if ctx.has(VehicleFlags::LIMIT_MOTOR_DOWN) && world.z < 0.0 {
            world.z = 0.0;
        }

        // upward pushes weaker than effective gravity do nothing
        if world.z > 0.0 {
            let buoyancy = params.float(FloatParam::Buoyancy);
            world.z = (world.z + ctx.gravity * (1.0 - buoyancy)).max(0.0);
        }

        if world.z.abs() > LINEAR_MOTOR_DELTA_V
            && ctx.has(VehicleFlags::HOVER_ANY_LIMIT)
            && params.float(FloatParam::HoverTimescale) < MAX_HOVER_TIMESCALE
        {
            state.linear_decay.bump(decay::HOVER_MODERATION);
        }

        if !disable {
            Self::add_force(
                body,
                params.vector(VectorParam::LinearMotorOffset),
                world,
                ForceMode::VelocityChange,
            );

            if ctx.debug.linear {
                debug!(
                    "Linear motor: rate={rate} decay={dfactor} delta={} last={last} index={}",
                    ctx.to_local(world),
                    state.linear_decay.index()
                );
            }
        }
    }

    /// Returns the world Z velocity change, which is blended with banking by the caller
    fn simulate_angular(
        &mut self,
        ctx: &VehicleContext,
        params: &ParameterTable,
        state: &mut DynamicsState,
        disable: bool,
        aforces: Vec3A,
    ) -> f32 {
        let mut dfactor = state
            .angular_decay
            .factors(params.vector(VectorParam::AngularMotorDecayTimescale));
        state.angular_decay.advance(ctx.dt);

        if dfactor.length() == 0.0 || disable {
            state.angular_target_velocity = Vec3A::ZERO;
            return 0.0;
        }

        let world_z = ctx.has(VehicleFlags::TORQUE_WORLD_Z);
        let last = if world_z {
            // local pitch and roll, world yaw
            let world = ctx.world_angular_velocity;
            let mut local = ctx.to_local(Vec3A::new(world.x, world.y, 0.0));
            local.z = world.z;
            local
        } else {
            ctx.local_angular_velocity
        };

        let dir = state.angular_direction;
        let dir_sign = math::posneg_vec(dir);
        let target = state.angular_target_velocity;
        let adj = Vec3A::select(
            (dir_sign * (target - last)).cmpgt(Vec3A::ZERO),
            target,
            last,
        );

        let mut rate = growth_rates(
            adj,
            dir,
            params.vector(VectorParam::AngularMotorTimescale) / ctx.dt,
        );

        let mut new = adj + adj * rate;
        rate = flip_crossover(rate);
        new = unstick(new, rate, dir, dir_sign, ANGULAR_MOTOR_DELTA_V);
        new = limit_for_attractor(new, ctx, params);

        state.angular_target_velocity = next_target(new, rate, dir);
        new = new.clamp(
            Vec3A::splat(-MAX_ANGULAR_VELOCITY),
            Vec3A::splat(MAX_ANGULAR_VELOCITY),
        );

        let released = dfactor.cmpeq(Vec3A::ZERO) & dir.cmpeq(Vec3A::ZERO);
        new = Vec3A::select(released, last, new);

        // axes the attractor is working on are left to it unless commanded
        let attracted = aforces.cmpne(Vec3A::ZERO) & dir.cmpeq(Vec3A::ZERO);
        let coasting = rate.cmpge(Vec3A::ZERO) & (dir_sign * (last - new)).cmpgt(Vec3A::ZERO);
        dfactor = Vec3A::select(attracted | coasting, Vec3A::ZERO, dfactor);

        if dfactor.length() != 0.0 && self.is_stalled(ctx, state) {
            dfactor = Vec3A::ZERO;
            state.kill_angular_motor(decay::STALLED_INDEX);
        }

        new = new * dfactor + last * (1.0 - dfactor);

        let mut world = if world_z {
            ctx.to_world(Vec3A::new(new.x, new.y, 0.0)) + Vec3A::new(0.0, 0.0, new.z)
        } else {
            ctx.to_world(new)
        };
        world -= ctx.world_angular_velocity;

        let angular_z = world.z;
        world.z = 0.0;

        if math::any_abs_ge(world, ANGULAR_MOTOR_DELTA_V) {
            self.add_torque(world, ForceMode::VelocityChange);

            if ctx.debug.angular || ctx.debug.angular_motor {
                debug!(
                    "Angular motor: rate={rate} decay={dfactor} torque={world} target={} dir={dir} index={}",
                    state.angular_target_velocity,
                    state.angular_decay.index()
                );
            }
        }

        angular_z
    }

    /// The bank-to-turn motor ramps toward the banking direction and never decays on its own.
    /// Returns its world Z velocity change.
    fn simulate_banking(
        &mut self,
        ctx: &VehicleContext,
        params: &ParameterTable,
        state: &mut DynamicsState,
    ) -> f32 {
        let timescale = params.float(FloatParam::BankingTimescale);
        let dir = state.banking_direction;

        if dir == 0.0 || timescale >= MAX_TIMESCALE {
            state.banking_target_velocity = 0.0;
            return 0.0;
        }

        let last = ctx.world_angular_velocity.z;
        let dir_sign = math::posneg(dir);
        let adj = if dir_sign * (state.banking_target_velocity - last) > 0.0 {
            state.banking_target_velocity
        } else {
            last
        };

        let mut rate = math::growth_rate(adj, dir, timescale / ctx.dt);
        let mut new = adj + adj * rate;

        // an engaged angular motor lowers the banking ceiling
        if state.angular_decay.is_engaged(ANGULAR_MOTOR_ENGAGED)
            && new.abs() > MAX_LEGACY_ANGULAR_VELOCITY
        {
            new = MAX_LEGACY_ANGULAR_VELOCITY * math::posneg(new);
        }

        if rate == INVERSE_CROSSOVER {
            rate = -rate;
        }

        if rate > 0.0 && new.abs() < ANGULAR_MOTOR_DELTA_V {
            new = dir_sign * ANGULAR_MOTOR_DELTA_V * 8.0;
        }

        state.banking_target_velocity = if dir * new < 0.0 || rate < 0.0 {
            new
        } else {
            new.clamp(-dir.abs(), dir.abs())
        };

        new = new.clamp(-MAX_ANGULAR_VELOCITY, MAX_ANGULAR_VELOCITY);

        if rate >= 0.0 && dir_sign * (last - new) > 0.0 {
            new = last;
        }

        if self.is_stalled(ctx, state) {
            state.banking_target_velocity = 0.0;
            new = last;
        }

        if ctx.debug.banking {
            debug!("Banking motor: rate={rate} new={new} last={last} target={}", state.banking_target_velocity);
        }

        new - last
    }
}

/// Applies a new linear motor command
pub fn move_linear(state: &mut DynamicsState, params: &ParameterTable, now: f64, direction: Vec3A) {
    state.last_access = now;

    // a motor that was decaying restarts from its decayed target
    if state.linear_decay.has_elapsed(LINEAR_MOTOR_ENGAGED) {
        state.linear_target_velocity *= state
            .linear_decay
            .factors(params.vector(VectorParam::LinearMotorDecayTimescale));
    }

    state
        .linear_decay
        .restart(params.vector(VectorParam::LinearMotorTimescale));

    state.target_linear_delta = direction - state.linear_direction;
    state.linear_direction = direction;
}

/// Applies a new angular motor command.
///
/// A fast, efficient angular deflection also rate-limits the command, even at rest.
pub fn move_angular(state: &mut DynamicsState, params: &ParameterTable, now: f64, direction: Vec3A) {
    state.last_access = now;

    if state.angular_decay.has_elapsed(ANGULAR_MOTOR_ENGAGED) {
        state.angular_target_velocity *= state
            .angular_decay
            .factors(params.vector(VectorParam::AngularMotorDecayTimescale));
    }

    state
        .angular_decay
        .restart(params.vector(VectorParam::AngularMotorTimescale));

    let timescale = params.float(FloatParam::AngularDeflectionTimescale);
    let efficiency = params.float(FloatParam::AngularDeflectionEfficiency);
    let rate_limit = (timescale + 0.001) / (efficiency + 0.000_01);
    let direction = if rate_limit < 1.0 {
        direction * rate_limit.max(0.1)
    } else {
        direction
    };

    state.target_angular_delta = direction - state.angular_direction;
    state.angular_direction = direction;
}
