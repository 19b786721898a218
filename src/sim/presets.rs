use std::f32::consts::PI;

use glam::{Quat, Vec3A};

use super::{FloatParam, RotationParam, VectorParam, VehicleFlags, VehicleType};

pub const MOUSELOOK_AZIMUTH: f32 = PI / 4.0;
pub const MOUSELOOK_ALTITUDE: f32 = PI / 4.0;
pub const BANKING_AZIMUTH: f32 = PI / 2.0;

/// Default parameter values a vehicle archetype starts from
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArchetypePreset {
    pub linear_friction_timescale: Vec3A,
    pub angular_friction_timescale: Vec3A,
    pub linear_motor_offset: Vec3A,
    pub linear_motor_timescale: Vec3A,
    pub angular_motor_timescale: Vec3A,
    pub linear_motor_decay_timescale: Vec3A,
    pub angular_motor_decay_timescale: Vec3A,
    pub linear_wind_efficiency: Vec3A,
    pub angular_wind_efficiency: Vec3A,
    pub hover_height: f32,
    pub hover_efficiency: f32,
    pub hover_timescale: f32,
    pub buoyancy: f32,
    pub linear_deflection_efficiency: f32,
    pub linear_deflection_timescale: f32,
    pub angular_deflection_efficiency: f32,
    pub angular_deflection_timescale: f32,
    pub vertical_attraction_efficiency: f32,
    pub vertical_attraction_timescale: f32,
    pub banking_efficiency: f32,
    pub inverted_banking_modifier: f32,
    pub banking_mix: f32,
    pub banking_timescale: f32,
    pub disable_motors_above: f32,
    pub disable_motors_after: f32,
    pub flags: VehicleFlags,
}

const fn flags(list: &[VehicleFlags]) -> VehicleFlags {
    let mut bits = 0;
    let mut i = 0;
    while i < list.len() {
        bits |= list[i].bits();
        i += 1;
    }
    VehicleFlags::from_bits_retain(bits)
}

/// Presets in the order of [`VehicleType::ALL`]
pub const PRESETS: [ArchetypePreset; 8] = [
    // NONE
    ArchetypePreset {
        linear_friction_timescale: Vec3A::ZERO,
        angular_friction_timescale: Vec3A::ZERO,
        linear_motor_offset: Vec3A::ZERO,
        linear_motor_timescale: Vec3A::splat(1000.0),
        angular_motor_timescale: Vec3A::splat(1000.0),
        linear_motor_decay_timescale: Vec3A::ZERO,
        angular_motor_decay_timescale: Vec3A::ZERO,
        linear_wind_efficiency: Vec3A::ZERO,
        angular_wind_efficiency: Vec3A::ZERO,
        hover_height: 0.0,
        hover_efficiency: 0.0,
        hover_timescale: 1000.0,
        buoyancy: 0.0,
        linear_deflection_efficiency: 0.0,
        linear_deflection_timescale: 1000.0,
        angular_deflection_efficiency: 0.0,
        angular_deflection_timescale: 1000.0,
        vertical_attraction_efficiency: 0.0,
        vertical_attraction_timescale: 1000.0,
        banking_efficiency: 0.0,
        inverted_banking_modifier: 1.0,
        banking_mix: 0.0,
        banking_timescale: 1000.0,
        disable_motors_above: 0.0,
        disable_motors_after: 0.0,
        flags: VehicleFlags::empty(),
    },
    // SLED
    ArchetypePreset {
        linear_friction_timescale: Vec3A::new(1000.0, 1.0, 1000.0),
        angular_friction_timescale: Vec3A::splat(1000.0),
        linear_motor_offset: Vec3A::new(0.0, 0.0, -0.1),
        linear_motor_timescale: Vec3A::splat(1000.0),
        angular_motor_timescale: Vec3A::splat(1000.0),
        linear_motor_decay_timescale: Vec3A::splat(120.0),
        angular_motor_decay_timescale: Vec3A::splat(120.0),
        linear_wind_efficiency: Vec3A::ZERO,
        angular_wind_efficiency: Vec3A::ZERO,
        hover_height: 0.0,
        hover_efficiency: 0.0,
        hover_timescale: 1000.0,
        buoyancy: 0.0,
        linear_deflection_efficiency: 1.0,
        linear_deflection_timescale: 0.3,
        angular_deflection_efficiency: 1.0,
        angular_deflection_timescale: 1.0,
        vertical_attraction_efficiency: 0.1,
        vertical_attraction_timescale: 10.0,
        banking_efficiency: 0.0,
        inverted_banking_modifier: 1.0,
        banking_mix: 1.0,
        banking_timescale: 10.0,
        disable_motors_above: 0.0,
        disable_motors_after: 0.0,
        flags: flags(&[
            VehicleFlags::NO_DEFLECTION_UP,
            VehicleFlags::LIMIT_ROLL_ONLY,
            VehicleFlags::LIMIT_MOTOR_UP,
        ]),
    },
    // CAR
    ArchetypePreset {
        linear_friction_timescale: Vec3A::new(100.0, 0.1, 10.0),
        angular_friction_timescale: Vec3A::new(100.0, 100.0, 0.3),
        linear_motor_offset: Vec3A::ZERO,
        linear_motor_timescale: Vec3A::new(0.5, 1.0, 1.0),
        angular_motor_timescale: Vec3A::new(0.2, 0.2, 0.05),
        linear_motor_decay_timescale: Vec3A::new(10.0, 2.0, 2.0),
        angular_motor_decay_timescale: Vec3A::new(0.3, 0.3, 0.1),
        linear_wind_efficiency: Vec3A::ZERO,
        angular_wind_efficiency: Vec3A::ZERO,
        hover_height: 0.0,
        hover_efficiency: 0.0,
        hover_timescale: 1000.0,
        buoyancy: 0.0,
        linear_deflection_efficiency: 1.0,
        linear_deflection_timescale: 2.0,
        angular_deflection_efficiency: 0.5,
        angular_deflection_timescale: 2.0,
        vertical_attraction_efficiency: 0.6,
        vertical_attraction_timescale: 2.0,
        banking_efficiency: -0.2,
        inverted_banking_modifier: 1.0,
        banking_mix: 1.0,
        banking_timescale: 1.0,
        disable_motors_above: 0.75,
        disable_motors_after: 2.5,
        flags: flags(&[
            VehicleFlags::NO_DEFLECTION_UP,
            VehicleFlags::LIMIT_ROLL_ONLY,
            VehicleFlags::HOVER_UP_ONLY,
            VehicleFlags::LIMIT_MOTOR_UP,
        ]),
    },
    // BOAT
    ArchetypePreset {
        linear_friction_timescale: Vec3A::new(200.0, 0.5, 3.0),
        angular_friction_timescale: Vec3A::new(10.0, 1.0, 0.1),
        linear_motor_offset: Vec3A::ZERO,
        linear_motor_timescale: Vec3A::new(1.0, 5.0, 5.0),
        angular_motor_timescale: Vec3A::new(0.2, 2.0, 0.1),
        linear_motor_decay_timescale: Vec3A::new(1.0, 10.0, 10.0),
        angular_motor_decay_timescale: Vec3A::new(0.3, 0.3, 0.1),
        linear_wind_efficiency: Vec3A::ZERO,
        angular_wind_efficiency: Vec3A::ZERO,
        hover_height: 0.5,
        hover_efficiency: 0.8,
        hover_timescale: 0.2,
        buoyancy: 0.0,
        linear_deflection_efficiency: 0.5,
        linear_deflection_timescale: 3.0,
        angular_deflection_efficiency: 0.5,
        angular_deflection_timescale: 5.0,
        vertical_attraction_efficiency: 0.5,
        vertical_attraction_timescale: 0.2,
        banking_efficiency: 1.0,
        inverted_banking_modifier: 1.0,
        banking_mix: 0.5,
        banking_timescale: 0.2,
        disable_motors_above: 0.0,
        disable_motors_after: 0.0,
        flags: flags(&[
            VehicleFlags::NO_DEFLECTION_UP,
            VehicleFlags::HOVER_WATER_ONLY,
            VehicleFlags::LIMIT_MOTOR_UP,
            VehicleFlags::LIMIT_MOTOR_DOWN,
            VehicleFlags::TORQUE_WORLD_Z,
        ]),
    },
    // AIRPLANE
    ArchetypePreset {
        linear_friction_timescale: Vec3A::new(200.0, 10.0, 5.0),
        angular_friction_timescale: Vec3A::new(1.0, 0.1, 0.5),
        linear_motor_offset: Vec3A::ZERO,
        linear_motor_timescale: Vec3A::splat(2.0),
        angular_motor_timescale: Vec3A::new(1.0, 2.0, 1.0),
        linear_motor_decay_timescale: Vec3A::splat(60.0),
        angular_motor_decay_timescale: Vec3A::splat(8.0),
        linear_wind_efficiency: Vec3A::new(0.1, 0.0, 0.0),
        angular_wind_efficiency: Vec3A::new(0.05, 0.0, 0.0),
        hover_height: 0.0,
        hover_efficiency: 0.5,
        hover_timescale: 1000.0,
        buoyancy: 0.0,
        linear_deflection_efficiency: 0.5,
        linear_deflection_timescale: 0.5,
        angular_deflection_efficiency: 1.0,
        angular_deflection_timescale: 2.0,
        vertical_attraction_efficiency: 0.9,
        vertical_attraction_timescale: 2.0,
        banking_efficiency: 1.0,
        inverted_banking_modifier: 1.0,
        banking_mix: 0.7,
        banking_timescale: 1.0,
        disable_motors_above: 0.0,
        disable_motors_after: 0.0,
        flags: flags(&[VehicleFlags::TORQUE_WORLD_Z, VehicleFlags::LIMIT_ROLL_ONLY]),
    },
    // BALLOON
    ArchetypePreset {
        linear_friction_timescale: Vec3A::new(1.0, 1.0, 5.0),
        angular_friction_timescale: Vec3A::new(2.0, 0.5, 1.0),
        linear_motor_offset: Vec3A::ZERO,
        linear_motor_timescale: Vec3A::new(1.0, 5.0, 5.0),
        angular_motor_timescale: Vec3A::new(2.0, 2.0, 0.3),
        linear_motor_decay_timescale: Vec3A::splat(60.0),
        angular_motor_decay_timescale: Vec3A::new(0.3, 0.3, 1.0),
        linear_wind_efficiency: Vec3A::splat(0.1),
        angular_wind_efficiency: Vec3A::new(0.01, 0.01, 0.0),
        hover_height: 5.0,
        hover_efficiency: 0.8,
        hover_timescale: 10.0,
        buoyancy: 1.0,
        linear_deflection_efficiency: 0.0,
        linear_deflection_timescale: 5.0,
        angular_deflection_efficiency: 0.0,
        angular_deflection_timescale: 5.0,
        vertical_attraction_efficiency: 0.5,
        vertical_attraction_timescale: 4.0,
        banking_efficiency: 0.05,
        inverted_banking_modifier: 1.0,
        banking_mix: 0.5,
        banking_timescale: 5.0,
        disable_motors_above: 0.0,
        disable_motors_after: 0.0,
        flags: VehicleFlags::REACT_TO_WIND,
    },
    // SAILBOAT
    ArchetypePreset {
        linear_friction_timescale: Vec3A::new(200.0, 0.5, 3.0),
        angular_friction_timescale: Vec3A::new(10.0, 1.0, 0.2),
        linear_motor_offset: Vec3A::ZERO,
        linear_motor_timescale: Vec3A::new(1.0, 5.0, 5.0),
        angular_motor_timescale: Vec3A::new(2.0, 2.0, 0.1),
        linear_motor_decay_timescale: Vec3A::new(1.0, 10.0, 10.0),
        angular_motor_decay_timescale: Vec3A::new(0.3, 0.3, 0.1),
        linear_wind_efficiency: Vec3A::new(0.02, 0.001, 0.0),
        angular_wind_efficiency: Vec3A::new(0.1, 0.01, 0.0),
        hover_height: 0.0001,
        hover_efficiency: 0.8,
        hover_timescale: 0.5,
        buoyancy: 0.0,
        linear_deflection_efficiency: 0.5,
        linear_deflection_timescale: 3.0,
        angular_deflection_efficiency: 0.5,
        angular_deflection_timescale: 5.0,
        vertical_attraction_efficiency: 0.5,
        vertical_attraction_timescale: 0.3,
        banking_efficiency: 0.8,
        inverted_banking_modifier: -0.2,
        banking_mix: 0.5,
        banking_timescale: 0.5,
        disable_motors_above: 0.0,
        disable_motors_after: 0.0,
        flags: flags(&[
            VehicleFlags::NO_DEFLECTION_UP,
            VehicleFlags::HOVER_WATER_ONLY,
            VehicleFlags::LIMIT_MOTOR_UP,
            VehicleFlags::LIMIT_MOTOR_DOWN,
            VehicleFlags::REACT_TO_WIND,
            VehicleFlags::REACT_TO_CURRENTS,
            VehicleFlags::TORQUE_WORLD_Z,
        ]),
    },
    // MOTORCYCLE
    ArchetypePreset {
        linear_friction_timescale: Vec3A::new(100.0, 0.1, 10.0),
        angular_friction_timescale: Vec3A::new(3.0, 0.2, 10.0),
        linear_motor_offset: Vec3A::new(0.0, 0.0, -0.1),
        linear_motor_timescale: Vec3A::new(0.5, 1.0, 1.0),
        angular_motor_timescale: Vec3A::new(0.1, 0.1, 0.05),
        linear_motor_decay_timescale: Vec3A::new(10.0, 1.0, 1.0),
        angular_motor_decay_timescale: Vec3A::new(0.2, 0.8, 0.1),
        linear_wind_efficiency: Vec3A::ZERO,
        angular_wind_efficiency: Vec3A::ZERO,
        hover_height: 0.0,
        hover_efficiency: 0.0,
        hover_timescale: 1000.0,
        buoyancy: 0.0,
        linear_deflection_efficiency: 1.0,
        linear_deflection_timescale: 2.0,
        angular_deflection_efficiency: 0.8,
        angular_deflection_timescale: 2.0,
        vertical_attraction_efficiency: 1.0,
        vertical_attraction_timescale: 1.0,
        banking_efficiency: 0.95,
        inverted_banking_modifier: -0.5,
        banking_mix: 0.5,
        banking_timescale: 0.1,
        disable_motors_above: 1.5,
        disable_motors_after: 2.5,
        flags: flags(&[
            VehicleFlags::NO_DEFLECTION_UP,
            VehicleFlags::HOVER_UP_ONLY,
            VehicleFlags::LIMIT_MOTOR_UP,
            VehicleFlags::LIMIT_MOTOR_DOWN,
            VehicleFlags::LIMIT_ROLL_ONLY,
            VehicleFlags::TORQUE_WORLD_Z,
        ]),
    },
];

impl ArchetypePreset {
    #[must_use]
    pub const fn for_type(vehicle_type: VehicleType) -> &'static Self {
        match vehicle_type {
            VehicleType::None => &PRESETS[0],
            VehicleType::Sled => &PRESETS[1],
            VehicleType::Car => &PRESETS[2],
            VehicleType::Boat => &PRESETS[3],
            VehicleType::Airplane => &PRESETS[4],
            VehicleType::Balloon => &PRESETS[5],
            VehicleType::Sailboat => &PRESETS[6],
            VehicleType::Motorcycle => &PRESETS[7],
        }
    }

    #[must_use]
    pub const fn float(&self, param: FloatParam) -> f32 {
        match param {
            FloatParam::HoverHeight => self.hover_height,
            FloatParam::HoverEfficiency => self.hover_efficiency,
            FloatParam::HoverTimescale => self.hover_timescale,
            FloatParam::Buoyancy => self.buoyancy,
            FloatParam::LinearDeflectionEfficiency => self.linear_deflection_efficiency,
            FloatParam::LinearDeflectionTimescale => self.linear_deflection_timescale,
            FloatParam::AngularDeflectionEfficiency => self.angular_deflection_efficiency,
            FloatParam::AngularDeflectionTimescale => self.angular_deflection_timescale,
            FloatParam::VerticalAttractionEfficiency => self.vertical_attraction_efficiency,
            FloatParam::VerticalAttractionTimescale => self.vertical_attraction_timescale,
            FloatParam::BankingEfficiency => self.banking_efficiency,
            FloatParam::BankingMix => self.banking_mix,
            FloatParam::BankingTimescale => self.banking_timescale,
            FloatParam::MouselookAzimuth => MOUSELOOK_AZIMUTH,
            FloatParam::MouselookAltitude => MOUSELOOK_ALTITUDE,
            FloatParam::BankingAzimuth => BANKING_AZIMUTH,
            FloatParam::DisableMotorsAbove => self.disable_motors_above,
            FloatParam::DisableMotorsAfter => self.disable_motors_after,
            FloatParam::InvertedBankingModifier => self.inverted_banking_modifier,
        }
    }

    #[must_use]
    pub const fn vector(&self, param: VectorParam) -> Vec3A {
        match param {
            VectorParam::LinearFrictionTimescale => self.linear_friction_timescale,
            VectorParam::AngularFrictionTimescale => self.angular_friction_timescale,
            VectorParam::LinearMotorDirection | VectorParam::AngularMotorDirection => Vec3A::ZERO,
            VectorParam::LinearMotorOffset => self.linear_motor_offset,
            VectorParam::LinearMotorTimescale => self.linear_motor_timescale,
            VectorParam::LinearMotorDecayTimescale => self.linear_motor_decay_timescale,
            VectorParam::AngularMotorTimescale => self.angular_motor_timescale,
            VectorParam::AngularMotorDecayTimescale => self.angular_motor_decay_timescale,
            VectorParam::LinearWindEfficiency => self.linear_wind_efficiency,
            VectorParam::AngularWindEfficiency => self.angular_wind_efficiency,
        }
    }

    #[must_use]
    pub const fn rotation(&self, param: RotationParam) -> Quat {
        match param {
            RotationParam::ReferenceFrame => Quat::IDENTITY,
        }
    }
}
