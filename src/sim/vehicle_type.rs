use crate::error::{Result, VehicleError};

#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum VehicleType {
    #[default]
    None = 0,
    Sled = 1,
    Car = 2,
    Boat = 3,
    Airplane = 4,
    Balloon = 5,
    Sailboat = 10001,
    Motorcycle = 10002,
}

impl VehicleType {
    pub const ALL: [Self; 8] = [
        Self::None,
        Self::Sled,
        Self::Car,
        Self::Boat,
        Self::Airplane,
        Self::Balloon,
        Self::Sailboat,
        Self::Motorcycle,
    ];

    #[must_use]
    pub const fn id(self) -> u32 {
        self as u32
    }

    pub fn from_id(id: u32) -> Result<Self> {
        Ok(match id {
            0 => Self::None,
            1 => Self::Sled,
            2 => Self::Car,
            3 => Self::Boat,
            4 => Self::Airplane,
            5 => Self::Balloon,
            10001 => Self::Sailboat,
            10002 => Self::Motorcycle,
            _ => return Err(VehicleError::InvalidVehicleType(id)),
        })
    }

    #[must_use]
    pub const fn is_boat(self) -> bool {
        matches!(self, Self::Boat | Self::Sailboat)
    }

    /// Cap on the angular motor's pitch/roll speed while the vertical attractor is active
    #[must_use]
    pub const fn attractor_velocity_clamp(self) -> f32 {
        use std::f32::consts::PI;

        match self {
            Self::Car | Self::Motorcycle => PI * 1.1,
            Self::Boat | Self::Sailboat => PI * 0.95,
            _ => PI * 0.8,
        }
    }
}

bitflags::bitflags! {
    /// Behavior toggles for a vehicle. Any subset may be set.
    #[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct VehicleFlags: u32 {
        /// Linear deflection may not push the vehicle upward
        const NO_DEFLECTION_UP    = 1 << 0;
        const LIMIT_ROLL_ONLY     = 1 << 1;
        const HOVER_WATER_ONLY    = 1 << 2;
        const HOVER_TERRAIN_ONLY  = 1 << 3;
        const HOVER_GLOBAL_HEIGHT = 1 << 4;
        const HOVER_UP_ONLY       = 1 << 5;
        const LIMIT_MOTOR_UP      = 1 << 6;
        const MOUSELOOK_STEER     = 1 << 7;
        const MOUSELOOK_BANK      = 1 << 8;
        const CAMERA_DECOUPLED    = 1 << 9;
        const LIMIT_MOTOR_DOWN    = 1 << 10;
        const MOUSEPOINT_STEER    = 1 << 11;
        const MOUSEPOINT_BANK     = 1 << 12;
        const REACT_TO_WIND       = 1 << 13;
        const REACT_TO_CURRENTS   = 1 << 14;
        /// Angular motor yaw is applied about world Z instead of local Z
        const TORQUE_WORLD_Z      = 1 << 15;

        const MOUSE_ANY = Self::MOUSELOOK_STEER.bits()
            | Self::MOUSELOOK_BANK.bits()
            | Self::MOUSEPOINT_STEER.bits()
            | Self::MOUSEPOINT_BANK.bits();
        const ENVIRONMENT_ANY = Self::REACT_TO_WIND.bits() | Self::REACT_TO_CURRENTS.bits();
        const HOVER_ANY_LIMIT = Self::HOVER_GLOBAL_HEIGHT.bits()
            | Self::HOVER_TERRAIN_ONLY.bits()
            | Self::HOVER_WATER_ONLY.bits();
    }
}
