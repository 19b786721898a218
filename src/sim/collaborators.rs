//! The seams between the vehicle controller and the host: the rigid body being driven,
//! the scene it lives in, the camera of whoever is driving it and the wall clock.

use std::time::{SystemTime, UNIX_EPOCH};

use arrayvec::ArrayVec;
use glam::{Quat, Vec2, Vec3A};

use crate::consts::{raycast::MAX_HITS, wind::GRID_CELLS};

/// How a force or torque is applied by the physics engine
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum ForceMode {
    /// Continuous, scaled by mass and the engine timestep
    #[default]
    Force,
    /// Single-tick, scaled by mass
    Impulse,
    /// Instantaneous, independent of mass
    VelocityChange,
}

bitflags::bitflags! {
    /// Hover configuration handed to the body
    #[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
    pub struct HoverFlags: u32 {
        const GROUND  = 1 << 0;
        const WATER   = 1 << 1;
        const GLOBAL  = 1 << 2;
        const UP_ONLY = 1 << 3;
        /// The hover was installed by the vehicle controller, not by a script's own hover call
        const VEHICLE = 1 << 4;
    }
}

/// Oriented bounding box of the vehicle's shape, in its local frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    pub center: Vec3A,
    /// Half size along each local axis
    pub extent: Vec3A,
}

/// The rigid body a vehicle controller drives
pub trait RigidBody {
    /// Identifies the body in raycast results
    fn id(&self) -> u64;
    fn position(&self) -> Vec3A;
    fn rotation(&self) -> Quat;
    fn linear_velocity(&self) -> Vec3A;
    fn angular_velocity(&self) -> Vec3A;
    fn mass(&self) -> f32;
    /// Diagonal of the inertia tensor in the body frame
    fn inertia_tensor(&self) -> Vec3A;
    fn gravity_multiplier(&self) -> f32;

    /// True while the object is being dragged by a user
    fn is_grabbed(&self) -> bool;

    fn bounding_box(&self) -> Option<BoundingBox>;
    /// Asks the host to compute the bounding box. It shows up on a later tick.
    fn request_bounding_box(&mut self) {}

    fn add_force(&mut self, force: Vec3A, mode: ForceMode, wake: bool);
    fn add_force_at_local_pos(&mut self, force: Vec3A, offset: Vec3A, mode: ForceMode, wake: bool);
    fn add_torque(&mut self, torque: Vec3A, mode: ForceMode, wake: bool);

    fn wake_up(&mut self);
    fn set_sleep_threshold(&mut self, threshold: f32);
    fn set_material_friction(&mut self, static_friction: f32, dynamic_friction: f32);

    fn hover_flags(&self) -> HoverFlags;
    fn set_hover(&mut self, flags: HoverFlags, height: f32, timescale: f32, efficiency: f32);
    fn clear_hover(&mut self);
    fn set_buoyancy(&mut self, buoyancy: f32);

    /// Cancels a script-driven look-at rotation
    fn stop_rot_look_at(&mut self) {}
    /// Cancels a script-driven move-to-target
    fn stop_move_to_target(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastHit {
    pub body_id: u64,
    pub distance: f32,
    pub position: Vec3A,
}

/// The result buffer handed to a raycast was too small for every hit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RaycastOverflow;

pub type RaycastHits = ArrayVec<RaycastHit, MAX_HITS>;

/// Per-region 16x16 velocity grids, one cell per 16 meters
#[derive(Clone, Debug, PartialEq)]
pub struct WindField {
    pub ground: [Vec2; GRID_CELLS],
    pub aloft: [Vec2; GRID_CELLS],
    pub currents: [Vec2; GRID_CELLS],
    pub terrain_max_heights: [f32; GRID_CELLS],
    pub terrain_ranges: [f32; GRID_CELLS],
}

impl Default for WindField {
    fn default() -> Self {
        Self::CALM
    }
}

impl WindField {
    pub const CALM: Self = Self {
        ground: [Vec2::ZERO; GRID_CELLS],
        aloft: [Vec2::ZERO; GRID_CELLS],
        currents: [Vec2::ZERO; GRID_CELLS],
        terrain_max_heights: [0.0; GRID_CELLS],
        terrain_ranges: [0.0; GRID_CELLS],
    };

    /// Every cell of every layer set to the same velocity
    #[must_use]
    pub const fn uniform(ground: Vec2, aloft: Vec2, currents: Vec2) -> Self {
        Self {
            ground: [ground; GRID_CELLS],
            aloft: [aloft; GRID_CELLS],
            currents: [currents; GRID_CELLS],
            ..Self::CALM
        }
    }
}

/// The world around the vehicle
pub trait Scene {
    /// Changes whenever the vehicle crosses into another region
    fn region_id(&self) -> u64;

    /// Collects every hit along the ray into `hits`, in no particular order.
    ///
    /// Fails when more than `capacity` hits exist. Hits from the querying body are included.
    fn raycast(
        &self,
        origin: Vec3A,
        direction: Vec3A,
        distance: f32,
        capacity: usize,
        hits: &mut RaycastHits,
    ) -> Result<(), RaycastOverflow>;

    fn ground_height_at(&self, x: f32, y: f32) -> f32;
    fn water_height_at(&self, x: f32, y: f32) -> f32;

    /// `None` for regions without wind data
    fn wind_field(&self) -> Option<&WindField>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraData {
    pub valid: bool,
    pub mouselook: bool,
    /// World rotation of the camera
    pub rotation: Quat,
}

impl Default for CameraData {
    fn default() -> Self {
        Self::INVALID
    }
}

impl CameraData {
    pub const INVALID: Self = Self {
        valid: false,
        mouselook: false,
        rotation: Quat::IDENTITY,
    };
}

/// The camera of the avatar driving the vehicle
pub trait CameraSource {
    fn snapshot(&self) -> CameraData;
}

/// A vehicle without a driver
impl CameraSource for () {
    fn snapshot(&self) -> CameraData {
        CameraData::INVALID
    }
}

/// Wall clock used for gap detection
pub trait Clock: Send + Sync {
    /// Seconds since the UNIX epoch
    fn now(&self) -> f64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0.0, |d| d.as_secs_f64())
    }
}
