use ahash::AHashMap;
use glam::{Quat, Vec3A};
use parking_lot::{Mutex, RwLock};

use crate::error::Result;

use super::{
    ArchetypePreset, FloatParam, ParamSetting, RotationParam, VectorParam, VehicleFlags,
    VehicleType,
};

/// A vehicle's type, flags and typed parameter maps.
///
/// Reads of a key that is not present fall back to the archetype default of the current type.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParameterTable {
    pub vehicle_type: VehicleType,
    pub flags: VehicleFlags,
    floats: AHashMap<FloatParam, f32>,
    vectors: AHashMap<VectorParam, Vec3A>,
    rotations: AHashMap<RotationParam, Quat>,
}

impl ParameterTable {
    /// A table populated with the defaults of `vehicle_type`
    #[must_use]
    pub fn new(vehicle_type: VehicleType) -> Self {
        let mut table = Self::uninitialized(vehicle_type);
        table.load_defaults(vehicle_type);
        table
    }

    /// A table with a type but no parameters yet, as left behind by a save
    /// that raced with type assignment
    #[must_use]
    pub fn uninitialized(vehicle_type: VehicleType) -> Self {
        Self {
            vehicle_type,
            ..Self::default()
        }
    }

    /// No rotation parameters means the archetype defaults were never applied
    #[must_use]
    pub fn is_uninitialized(&self) -> bool {
        self.rotations.is_empty()
    }

    /// Switches to `vehicle_type` and overwrites every parameter and the flags with its defaults.
    ///
    /// The `None` type also drops keys that are not part of the current parameter set.
    pub fn load_defaults(&mut self, vehicle_type: VehicleType) {
        let preset = ArchetypePreset::for_type(vehicle_type);
        self.vehicle_type = vehicle_type;

        if vehicle_type == VehicleType::None {
            self.floats.clear();
            self.vectors.clear();
            self.rotations.clear();
        }

        for param in VectorParam::ALL {
            self.vectors.insert(param, preset.vector(param));
        }
        for param in FloatParam::ALL {
            self.floats.insert(param, preset.float(param));
        }
        for param in RotationParam::ALL {
            self.rotations.insert(param, preset.rotation(param));
        }

        self.flags = preset.flags;
    }

    #[must_use]
    pub fn float(&self, param: FloatParam) -> f32 {
        self.floats
            .get(&param)
            .copied()
            .unwrap_or_else(|| ArchetypePreset::for_type(self.vehicle_type).float(param))
    }

    #[must_use]
    pub fn vector(&self, param: VectorParam) -> Vec3A {
        self.vectors
            .get(&param)
            .copied()
            .unwrap_or_else(|| ArchetypePreset::for_type(self.vehicle_type).vector(param))
    }

    #[must_use]
    pub fn rotation(&self, param: RotationParam) -> Quat {
        self.rotations
            .get(&param)
            .copied()
            .unwrap_or_else(|| ArchetypePreset::for_type(self.vehicle_type).rotation(param))
    }

    /// Stores `setting` as given, without clamping
    pub fn set(&mut self, setting: ParamSetting) {
        match setting {
            ParamSetting::Float(p, v) => {
                self.floats.insert(p, v);
            }
            ParamSetting::Vector(p, v) => {
                self.vectors.insert(p, v);
            }
            ParamSetting::Rotation(p, v) => {
                self.rotations.insert(p, v);
            }
        }
    }

    /// Runs every present value through its parameter's clamp
    pub fn clamp_all(&mut self) {
        for (param, value) in &mut self.floats {
            *value = (*param).clamp(*value);
        }
        for (param, value) in &mut self.vectors {
            *value = (*param).clamp(*value);
        }
        for (param, value) in &mut self.rotations {
            *value = (*param).clamp(*value);
        }
    }

    /// Copies the type, flags and every present key of `other` over this table
    pub fn merge(&mut self, other: &Self) {
        self.vehicle_type = other.vehicle_type;
        self.flags = other.flags;
        self.floats.extend(other.floats.iter().map(|(k, v)| (*k, *v)));
        self.vectors.extend(other.vectors.iter().map(|(k, v)| (*k, *v)));
        self.rotations.extend(other.rotations.iter().map(|(k, v)| (*k, *v)));
    }

    /// Present float entries ordered by id
    #[must_use]
    pub fn floats(&self) -> Vec<(FloatParam, f32)> {
        let mut entries: Vec<_> = self.floats.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_unstable_by_key(|(k, _)| k.id());
        entries
    }

    #[must_use]
    pub fn vectors(&self) -> Vec<(VectorParam, Vec3A)> {
        let mut entries: Vec<_> = self.vectors.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_unstable_by_key(|(k, _)| k.id());
        entries
    }

    #[must_use]
    pub fn rotations(&self) -> Vec<(RotationParam, Quat)> {
        let mut entries: Vec<_> = self.rotations.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_unstable_by_key(|(k, _)| k.id());
        entries
    }
}

/// A parameter mutation waiting for the physics side to run its side effects
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamChange {
    Param(ParamSetting),
    VehicleType(VehicleType),
    Flags(VehicleFlags),
}

/// The thread-safe home of a vehicle's parameters.
///
/// Setters may run on any thread while the vehicle is ticking. Each one clamps its input,
/// stores it under the lock in a single step and queues a [`ParamChange`] for the tick to pick up.
#[derive(Debug, Default)]
pub struct ParameterStore {
    table: RwLock<ParameterTable>,
    pending: Mutex<Vec<ParamChange>>,
}

impl ParameterStore {
    #[must_use]
    pub fn new(vehicle_type: VehicleType) -> Self {
        Self::from_table(ParameterTable::new(vehicle_type))
    }

    #[must_use]
    pub fn from_table(table: ParameterTable) -> Self {
        Self {
            table: RwLock::new(table),
            pending: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn vehicle_type(&self) -> VehicleType {
        self.table.read().vehicle_type
    }

    #[must_use]
    pub fn flags(&self) -> VehicleFlags {
        self.table.read().flags
    }

    #[must_use]
    pub fn float(&self, param: FloatParam) -> f32 {
        self.table.read().float(param)
    }

    #[must_use]
    pub fn vector(&self, param: VectorParam) -> Vec3A {
        self.table.read().vector(param)
    }

    #[must_use]
    pub fn rotation(&self, param: RotationParam) -> Quat {
        self.table.read().rotation(param)
    }

    /// A consistent copy of the whole table
    #[must_use]
    pub fn snapshot(&self) -> ParameterTable {
        self.table.read().clone()
    }

    /// Clamps and stores `setting`, returning the value actually stored
    pub fn set(&self, setting: ParamSetting) -> ParamSetting {
        let clamped = setting.clamped();
        let mut table = self.table.write();
        table.set(clamped);
        self.pending.lock().push(ParamChange::Param(clamped));
        clamped
    }

    pub fn set_float(&self, param: FloatParam, value: f32) -> f32 {
        let value = param.clamp(value);
        self.set(ParamSetting::Float(param, value));
        value
    }

    pub fn set_vector(&self, param: VectorParam, value: Vec3A) -> Vec3A {
        let value = param.clamp(value);
        self.set(ParamSetting::Vector(param, value));
        value
    }

    pub fn set_rotation(&self, param: RotationParam, value: Quat) -> Quat {
        let value = param.clamp(value);
        self.set(ParamSetting::Rotation(param, value));
        value
    }

    /// Sets a scalar parameter by raw id. The retired scalar motor timescale ids set all three axes.
    pub fn set_scalar_by_id(&self, id: u32, value: f32) -> Result<ParamSetting> {
        Ok(self.set(ParamSetting::from_scalar_id(id, value)?))
    }

    pub fn set_vector_by_id(&self, id: u32, value: Vec3A) -> Result<ParamSetting> {
        Ok(self.set(ParamSetting::Vector(VectorParam::from_id(id)?, value)))
    }

    pub fn set_rotation_by_id(&self, id: u32, value: Quat) -> Result<ParamSetting> {
        Ok(self.set(ParamSetting::Rotation(RotationParam::from_id(id)?, value)))
    }

    /// Switches the vehicle type, resetting every parameter and the flags to its defaults
    pub fn set_vehicle_type(&self, vehicle_type: VehicleType) {
        let mut table = self.table.write();
        table.load_defaults(vehicle_type);
        self.pending.lock().push(ParamChange::VehicleType(vehicle_type));
    }

    pub fn set_vehicle_type_id(&self, id: u32) -> Result<()> {
        self.set_vehicle_type(VehicleType::from_id(id)?);
        Ok(())
    }

    pub fn set_flags(&self, flags: VehicleFlags) {
        self.update_flags(|_| flags);
    }

    /// Turns on `flags`, leaving the others as they are
    pub fn insert_flags(&self, flags: VehicleFlags) {
        self.update_flags(|cur| cur | flags);
    }

    pub fn remove_flags(&self, flags: VehicleFlags) {
        self.update_flags(|cur| cur - flags);
    }

    fn update_flags(&self, f: impl FnOnce(VehicleFlags) -> VehicleFlags) {
        let mut table = self.table.write();
        table.flags = f(table.flags);
        self.pending.lock().push(ParamChange::Flags(table.flags));
    }

    /// Takes every change queued since the last call, oldest first
    #[must_use]
    pub fn drain_changes(&self) -> Vec<ParamChange> {
        std::mem::take(&mut *self.pending.lock())
    }

    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        !self.pending.lock().is_empty()
    }

    /// Writes back a value the simulation adjusted on its own. Nothing is queued.
    pub(crate) fn store_adjusted(&self, setting: ParamSetting) {
        self.table.write().set(setting);
    }
}
