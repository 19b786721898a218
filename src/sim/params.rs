use std::f32::consts::PI;

use glam::{Quat, Vec3A};

use crate::consts::{MIN_PHYSICS_TIMESTEP, REGION_MAX_HEIGHT, REGION_MIN_HEIGHT, limits, threshold};
use crate::error::{Result, VehicleError};

#[inline]
fn zero_nan(f: f32) -> f32 {
    if f.is_nan() { 0.0 } else { f }
}

#[inline]
fn zero_nan_vec(v: Vec3A) -> Vec3A {
    Vec3A::new(zero_nan(v.x), zero_nan(v.y), zero_nan(v.z))
}

/// Scalar vehicle parameters
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum FloatParam {
    HoverHeight = 24,
    HoverEfficiency = 25,
    HoverTimescale = 26,
    Buoyancy = 27,
    LinearDeflectionEfficiency = 28,
    LinearDeflectionTimescale = 29,
    AngularDeflectionEfficiency = 32,
    AngularDeflectionTimescale = 33,
    VerticalAttractionEfficiency = 36,
    VerticalAttractionTimescale = 37,
    BankingEfficiency = 38,
    BankingMix = 39,
    BankingTimescale = 40,
    MouselookAzimuth = 11001,
    MouselookAltitude = 11002,
    BankingAzimuth = 11003,
    DisableMotorsAbove = 11004,
    DisableMotorsAfter = 11005,
    InvertedBankingModifier = 11006,
}

impl FloatParam {
    pub const ALL: [Self; 19] = [
        Self::HoverHeight,
        Self::HoverEfficiency,
        Self::HoverTimescale,
        Self::Buoyancy,
        Self::LinearDeflectionEfficiency,
        Self::LinearDeflectionTimescale,
        Self::AngularDeflectionEfficiency,
        Self::AngularDeflectionTimescale,
        Self::VerticalAttractionEfficiency,
        Self::VerticalAttractionTimescale,
        Self::BankingEfficiency,
        Self::BankingMix,
        Self::BankingTimescale,
        Self::MouselookAzimuth,
        Self::MouselookAltitude,
        Self::BankingAzimuth,
        Self::DisableMotorsAbove,
        Self::DisableMotorsAfter,
        Self::InvertedBankingModifier,
    ];

    /// Ids that used to be scalar motor timescales and are now vector parameters
    pub const DEPRECATED_IDS: [u32; 4] = [30, 31, 34, 35];

    #[must_use]
    pub const fn id(self) -> u32 {
        self as u32
    }

    pub fn from_id(id: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.id() == id)
            .ok_or(VehicleError::InvalidParam(id))
    }

    /// Legal `(min, max)` range, or `None` when the parameter is stored as given
    #[must_use]
    pub const fn range(self) -> Option<(f32, f32)> {
        Some(match self {
            Self::AngularDeflectionEfficiency
            | Self::LinearDeflectionEfficiency
            | Self::HoverEfficiency
            | Self::BankingMix => (0.0, 1.0),
            Self::AngularDeflectionTimescale
            | Self::LinearDeflectionTimescale
            | Self::BankingTimescale => (MIN_PHYSICS_TIMESTEP, limits::MAX_TIMESCALE),
            Self::BankingEfficiency => (-1.0, 1.0),
            Self::InvertedBankingModifier => (
                -limits::MAX_INVERTED_BANKING_MODIFIER,
                limits::MAX_INVERTED_BANKING_MODIFIER,
            ),
            Self::MouselookAltitude | Self::MouselookAzimuth => (threshold::MOUSELOOK_ANGLE, PI),
            Self::BankingAzimuth => (threshold::BANK_ANGLE, PI),
            // wider than [-1, 1] because of the gravity multiplier
            Self::Buoyancy => (-2.0, 30.0),
            Self::HoverHeight => (REGION_MIN_HEIGHT, REGION_MAX_HEIGHT),
            Self::HoverTimescale => (MIN_PHYSICS_TIMESTEP, limits::MAX_HOVER_TIMESCALE),
            Self::VerticalAttractionTimescale => (MIN_PHYSICS_TIMESTEP, limits::MAX_ATTRACT_TIMESCALE),
            Self::VerticalAttractionEfficiency
            | Self::DisableMotorsAbove
            | Self::DisableMotorsAfter => return None,
        })
    }

    /// Replaces NaN with 0 and clamps into the legal range. Pure, callable from any thread.
    #[must_use]
    pub fn clamp(self, value: f32) -> f32 {
        let value = zero_nan(value);
        match self.range() {
            Some((min, max)) => value.clamp(min, max),
            None => value,
        }
    }
}

/// Vector vehicle parameters, clamped per axis
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum VectorParam {
    LinearFrictionTimescale = 16,
    AngularFrictionTimescale = 17,
    LinearMotorDirection = 18,
    AngularMotorDirection = 19,
    LinearMotorOffset = 20,
    LinearMotorTimescale = 30,
    LinearMotorDecayTimescale = 31,
    AngularMotorTimescale = 34,
    AngularMotorDecayTimescale = 35,
    LinearWindEfficiency = 12001,
    AngularWindEfficiency = 12002,
}

impl VectorParam {
    pub const ALL: [Self; 11] = [
        Self::LinearFrictionTimescale,
        Self::AngularFrictionTimescale,
        Self::LinearMotorDirection,
        Self::AngularMotorDirection,
        Self::LinearMotorOffset,
        Self::LinearMotorTimescale,
        Self::LinearMotorDecayTimescale,
        Self::AngularMotorTimescale,
        Self::AngularMotorDecayTimescale,
        Self::LinearWindEfficiency,
        Self::AngularWindEfficiency,
    ];

    #[must_use]
    pub const fn id(self) -> u32 {
        self as u32
    }

    pub fn from_id(id: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.id() == id)
            .ok_or(VehicleError::InvalidParam(id))
    }

    /// Legal per-axis `(min, max)` range
    #[must_use]
    pub const fn range(self) -> (f32, f32) {
        match self {
            Self::AngularMotorDirection => (-limits::MAX_ANGULAR_VELOCITY, limits::MAX_ANGULAR_VELOCITY),
            Self::LinearMotorDirection => (-limits::MAX_LINEAR_VELOCITY, limits::MAX_LINEAR_VELOCITY),
            Self::LinearMotorOffset => (-limits::MAX_LINEAR_OFFSET, limits::MAX_LINEAR_OFFSET),
            Self::LinearWindEfficiency | Self::AngularWindEfficiency => {
                (-limits::MAX_WIND_EFFICIENCY, limits::MAX_WIND_EFFICIENCY)
            }
            Self::LinearFrictionTimescale
            | Self::AngularFrictionTimescale
            | Self::LinearMotorTimescale
            | Self::LinearMotorDecayTimescale
            | Self::AngularMotorTimescale
            | Self::AngularMotorDecayTimescale => (MIN_PHYSICS_TIMESTEP, limits::MAX_TIMESCALE),
        }
    }

    #[must_use]
    pub fn clamp(self, value: Vec3A) -> Vec3A {
        let (min, max) = self.range();
        zero_nan_vec(value).clamp(Vec3A::splat(min), Vec3A::splat(max))
    }
}

/// Rotation vehicle parameters
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum RotationParam {
    ReferenceFrame = 44,
}

impl RotationParam {
    pub const ALL: [Self; 1] = [Self::ReferenceFrame];

    #[must_use]
    pub const fn id(self) -> u32 {
        self as u32
    }

    pub fn from_id(id: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.id() == id)
            .ok_or(VehicleError::InvalidParam(id))
    }

    /// Replaces NaN components with 0 and renormalizes. A degenerate input becomes identity.
    #[must_use]
    pub fn clamp(self, value: Quat) -> Quat {
        let q = Quat::from_xyzw(
            zero_nan(value.x),
            zero_nan(value.y),
            zero_nan(value.z),
            zero_nan(value.w),
        );

        if q.length_squared() <= f32::EPSILON {
            Quat::IDENTITY
        } else {
            q.normalize()
        }
    }
}

/// A parameter id together with its value, one variant per value kind
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamSetting {
    Float(FloatParam, f32),
    Vector(VectorParam, Vec3A),
    Rotation(RotationParam, Quat),
}

impl ParamSetting {
    /// Builds a setting from a raw scalar id.
    ///
    /// The retired scalar motor timescale ids are promoted to their vector
    /// parameter with the value on every axis.
    pub fn from_scalar_id(id: u32, value: f32) -> Result<Self> {
        if FloatParam::DEPRECATED_IDS.contains(&id) {
            return Ok(Self::Vector(VectorParam::from_id(id)?, Vec3A::splat(value)));
        }

        Ok(Self::Float(FloatParam::from_id(id)?, value))
    }

    #[must_use]
    pub fn id(self) -> u32 {
        match self {
            Self::Float(p, _) => p.id(),
            Self::Vector(p, _) => p.id(),
            Self::Rotation(p, _) => p.id(),
        }
    }

    #[must_use]
    pub fn clamped(self) -> Self {
        match self {
            Self::Float(p, v) => Self::Float(p, p.clamp(v)),
            Self::Vector(p, v) => Self::Vector(p, p.clamp(v)),
            Self::Rotation(p, v) => Self::Rotation(p, p.clamp(v)),
        }
    }
}
