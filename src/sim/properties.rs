use super::{DynamicsState, ParameterTable, VehicleType};

/// A vehicle's parameters and simulation state, as saved with the object
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VehicleProperties {
    pub table: ParameterTable,
    pub dynamics: DynamicsState,
}

impl VehicleProperties {
    /// Defaults of `vehicle_type` with a fresh simulation state
    #[must_use]
    pub fn new(vehicle_type: VehicleType) -> Self {
        Self {
            table: ParameterTable::new(vehicle_type),
            dynamics: DynamicsState::DEFAULT,
        }
    }

    /// Overlays `other`: its type, flags, every key it has and its simulation state
    pub fn merge(&mut self, other: &Self) {
        self.table.merge(&other.table);
        self.dynamics = other.dynamics;
    }

    /// Brings a save up to date. Keys missing from an older save take the defaults of its type,
    /// saved values are clamped like live sets.
    #[must_use]
    pub fn restore(saved: &Self) -> Self {
        let mut props = Self::new(saved.table.vehicle_type);
        props.merge(saved);
        props.table.clamp_all();
        props
    }
}
