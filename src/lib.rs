//! Vehicle dynamics for physical objects in a rigid-body simulation.
//!
//! A [`VehicleDynamics`] drives one body through the [`RigidBody`] and [`Scene`] traits,
//! running motors, deflection, vertical attraction, banking, wind and friction once per
//! physics frame. Parameters are set from any thread through a shared [`ParameterStore`].

pub use glam;

pub mod consts;
pub mod error;
pub mod logging;
pub mod math;
pub mod sim;

pub use error::{Result, VehicleError};
pub use sim::{
    CameraSource, ParameterStore, RigidBody, Scene, SimulationConfig, VehicleDynamics,
    VehicleFlags, VehicleType,
};
