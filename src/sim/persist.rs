//! Binary save format for [`VehicleProperties`].
//!
//! A record is a magic, a version and a run of tagged fields. Each field is a tag byte,
//! a kind byte and the payload, all little-endian. Readers skip tags they don't know by kind,
//! so old readers accept newer saves and missing tags keep their defaults.

use std::io::{self, Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::{Quat, Vec3A};

use crate::error::{Result, VehicleError};

use super::{
    DynamicsState, ExponentialTimer, FloatParam, ParamSetting, ParameterTable, RotationParam,
    VectorParam, VehicleFlags, VehicleProperties, VehicleType,
};

pub const SAVE_MAGIC: [u8; 4] = *b"VSIM";
pub const SAVE_VERSION: u16 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
enum Kind {
    Bool = 0,
    U32 = 1,
    F32 = 2,
    F64 = 3,
    Vec3 = 4,
    Quat = 5,
    /// `u32` length followed by that many bytes
    Block = 6,
}

impl Kind {
    fn from_u8(kind: u8) -> Result<Self> {
        Ok(match kind {
            0 => Self::Bool,
            1 => Self::U32,
            2 => Self::F32,
            3 => Self::F64,
            4 => Self::Vec3,
            5 => Self::Quat,
            6 => Self::Block,
            _ => return Err(VehicleError::Codec(format!("unknown field kind {kind}"))),
        })
    }

    /// Payload size of the fixed-size kinds
    const fn size(self) -> Option<u64> {
        match self {
            Self::Bool => Some(1),
            Self::U32 | Self::F32 => Some(4),
            Self::F64 => Some(8),
            Self::Vec3 => Some(12),
            Self::Quat => Some(16),
            Self::Block => None,
        }
    }
}

trait Field: Sized {
    const KIND: Kind;

    fn read_from(bytes: &mut Cursor<&[u8]>) -> io::Result<Self>;
    fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()>;
}

impl Field for bool {
    const KIND: Kind = Kind::Bool;

    fn read_from(bytes: &mut Cursor<&[u8]>) -> io::Result<Self> {
        Ok(bytes.read_u8()? != 0)
    }

    fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_u8(u8::from(*self))
    }
}

impl Field for u32 {
    const KIND: Kind = Kind::U32;

    fn read_from(bytes: &mut Cursor<&[u8]>) -> io::Result<Self> {
        bytes.read_u32::<LittleEndian>()
    }

    fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_u32::<LittleEndian>(*self)
    }
}

impl Field for f32 {
    const KIND: Kind = Kind::F32;

    fn read_from(bytes: &mut Cursor<&[u8]>) -> io::Result<Self> {
        bytes.read_f32::<LittleEndian>()
    }

    fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_f32::<LittleEndian>(*self)
    }
}

impl Field for f64 {
    const KIND: Kind = Kind::F64;

    fn read_from(bytes: &mut Cursor<&[u8]>) -> io::Result<Self> {
        bytes.read_f64::<LittleEndian>()
    }

    fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_f64::<LittleEndian>(*self)
    }
}

impl Field for Vec3A {
    const KIND: Kind = Kind::Vec3;

    fn read_from(bytes: &mut Cursor<&[u8]>) -> io::Result<Self> {
        Ok(Self::new(
            bytes.read_f32::<LittleEndian>()?,
            bytes.read_f32::<LittleEndian>()?,
            bytes.read_f32::<LittleEndian>()?,
        ))
    }

    fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for c in self.to_array() {
            out.write_f32::<LittleEndian>(c)?;
        }
        Ok(())
    }
}

impl Field for Quat {
    const KIND: Kind = Kind::Quat;

    fn read_from(bytes: &mut Cursor<&[u8]>) -> io::Result<Self> {
        Ok(Self::from_xyzw(
            bytes.read_f32::<LittleEndian>()?,
            bytes.read_f32::<LittleEndian>()?,
            bytes.read_f32::<LittleEndian>()?,
            bytes.read_f32::<LittleEndian>()?,
        ))
    }

    fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for c in self.to_array() {
            out.write_f32::<LittleEndian>(c)?;
        }
        Ok(())
    }
}

/// Truncation is a format problem, not an I/O failure
fn decode_err(err: io::Error) -> VehicleError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        VehicleError::Codec("truncated input".to_string())
    } else {
        VehicleError::Io(err)
    }
}

fn has_more(bytes: &Cursor<&[u8]>) -> bool {
    (bytes.position() as usize) < bytes.get_ref().len()
}

fn put<W: Write, T: Field>(out: &mut W, tag: u8, value: T) -> io::Result<()> {
    out.write_u8(tag)?;
    out.write_u8(T::KIND as u8)?;
    value.write_to(out)
}

fn put_block<W: Write>(out: &mut W, tag: u8, block: &[u8]) -> io::Result<()> {
    out.write_u8(tag)?;
    out.write_u8(Kind::Block as u8)?;
    out.write_u32::<LittleEndian>(block.len() as u32)?;
    out.write_all(block)
}

fn read_header(bytes: &mut Cursor<&[u8]>) -> Result<(u8, Kind)> {
    let tag = bytes.read_u8().map_err(decode_err)?;
    let kind = Kind::from_u8(bytes.read_u8().map_err(decode_err)?)?;
    Ok((tag, kind))
}

fn read<T: Field>(bytes: &mut Cursor<&[u8]>) -> Result<T> {
    T::read_from(bytes).map_err(decode_err)
}

fn read_block<'a>(bytes: &mut Cursor<&'a [u8]>) -> Result<&'a [u8]> {
    let len = u64::from(bytes.read_u32::<LittleEndian>().map_err(decode_err)?);
    let start = bytes.position();
    let data: &'a [u8] = *bytes.get_ref();

    let end = start + len;
    if end > data.len() as u64 {
        return Err(VehicleError::Codec("truncated input".to_string()));
    }

    bytes.set_position(end);
    Ok(&data[start as usize..end as usize])
}

fn skip(bytes: &mut Cursor<&[u8]>, kind: Kind) -> Result<()> {
    match kind.size() {
        Some(size) => {
            let copied = io::copy(&mut (&mut *bytes).take(size), &mut io::sink())?;
            if copied < size {
                return Err(VehicleError::Codec("truncated input".to_string()));
            }
        }
        None => {
            read_block(bytes)?;
        }
    }

    Ok(())
}

mod tags {
    pub const VEHICLE_TYPE: u8 = 1;
    pub const FLAGS: u8 = 2;
    pub const FLOATS: u8 = 3;
    pub const ROTATIONS: u8 = 4;
    pub const VECTORS: u8 = 5;
    pub const DYNAMICS: u8 = 6;
}

mod dyn_tags {
    /// Retired, read and dropped
    pub const VALID: u8 = 1;
    /// Retired, read and dropped
    pub const LAST_ROTATION: u8 = 2;
    pub const LOCAL_LINEAR_VELOCITY: u8 = 3;
    pub const LOCAL_ANGULAR_VELOCITY: u8 = 4;
    pub const LINEAR_TARGET_VELOCITY: u8 = 5;
    pub const LINEAR_DECAY: u8 = 6;
    pub const ANGULAR_TARGET_VELOCITY: u8 = 7;
    pub const ANGULAR_DECAY: u8 = 8;
    pub const LAST_ACCESS: u8 = 9;
    pub const ANGULAR_DIRECTION: u8 = 10;
    pub const LINEAR_DIRECTION: u8 = 11;
    pub const LAST_POSITION: u8 = 12;
    pub const SHORT_TERM_POSITION_DELTA: u8 = 13;
    pub const LAST_VERTICAL_ANGLE: u8 = 14;
    pub const VERTICAL_FORCE_ADJUST: u8 = 15;
    pub const TARGET_ANGULAR_DELTA: u8 = 16;
    pub const TARGET_LINEAR_DELTA: u8 = 17;
    pub const TIMESTEP: u8 = 18;
    pub const BANKING_DIRECTION: u8 = 19;
    pub const BANKING_TARGET_VELOCITY: u8 = 20;
    pub const LAST_VERTICAL_FRAME: u8 = 21;
    pub const WIND_DIRECTION: u8 = 22;
    pub const WATER_DIRECTION: u8 = 23;
    pub const WORLD_LINEAR_VELOCITY: u8 = 24;
    pub const WORLD_ANGULAR_VELOCITY: u8 = 25;
}

fn encode_dynamics(state: &DynamicsState) -> io::Result<Vec<u8>> {
    use dyn_tags::*;

    let mut out = Vec::new();
    put(&mut out, LOCAL_LINEAR_VELOCITY, state.local_linear_velocity)?;
    put(&mut out, LOCAL_ANGULAR_VELOCITY, state.local_angular_velocity)?;
    put(&mut out, LINEAR_TARGET_VELOCITY, state.linear_target_velocity)?;
    put(&mut out, LINEAR_DECAY, state.linear_decay.index())?;
    put(&mut out, ANGULAR_TARGET_VELOCITY, state.angular_target_velocity)?;
    put(&mut out, ANGULAR_DECAY, state.angular_decay.index())?;
    put(&mut out, LAST_ACCESS, state.last_access)?;
    put(&mut out, ANGULAR_DIRECTION, state.angular_direction)?;
    put(&mut out, LINEAR_DIRECTION, state.linear_direction)?;
    put(&mut out, LAST_POSITION, state.last_position)?;
    put(&mut out, SHORT_TERM_POSITION_DELTA, state.short_term_position_delta)?;
    put(&mut out, LAST_VERTICAL_ANGLE, state.last_vertical_angle)?;
    put(&mut out, VERTICAL_FORCE_ADJUST, state.vertical_force_adjust)?;
    put(&mut out, TARGET_ANGULAR_DELTA, state.target_angular_delta)?;
    put(&mut out, TARGET_LINEAR_DELTA, state.target_linear_delta)?;
    put(&mut out, TIMESTEP, state.timestep)?;
    put(&mut out, BANKING_DIRECTION, state.banking_direction)?;
    put(&mut out, BANKING_TARGET_VELOCITY, state.banking_target_velocity)?;
    put(&mut out, LAST_VERTICAL_FRAME, state.last_vertical_frame)?;
    put(&mut out, WIND_DIRECTION, state.wind_direction)?;
    put(&mut out, WATER_DIRECTION, state.water_direction)?;
    put(&mut out, WORLD_LINEAR_VELOCITY, state.world_linear_velocity)?;
    put(&mut out, WORLD_ANGULAR_VELOCITY, state.world_angular_velocity)?;
    Ok(out)
}

fn decode_dynamics(block: &[u8]) -> Result<DynamicsState> {
    use dyn_tags::*;

    let mut state = DynamicsState::DEFAULT;
    let mut bytes = Cursor::new(block);

    while has_more(&bytes) {
        let (tag, kind) = read_header(&mut bytes)?;
        let b = &mut bytes;

        match (tag, kind) {
            (VALID, Kind::Bool) => {
                read::<bool>(b)?;
            }
            (LAST_ROTATION, Kind::Quat) => {
                read::<Quat>(b)?;
            }
            (LOCAL_LINEAR_VELOCITY, Kind::Vec3) => state.local_linear_velocity = read(b)?,
            (LOCAL_ANGULAR_VELOCITY, Kind::Vec3) => state.local_angular_velocity = read(b)?,
            (LINEAR_TARGET_VELOCITY, Kind::Vec3) => state.linear_target_velocity = read(b)?,
            (LINEAR_DECAY, Kind::F32) => state.linear_decay = ExponentialTimer::new(read(b)?),
            (ANGULAR_TARGET_VELOCITY, Kind::Vec3) => state.angular_target_velocity = read(b)?,
            (ANGULAR_DECAY, Kind::F32) => state.angular_decay = ExponentialTimer::new(read(b)?),
            (LAST_ACCESS, Kind::F64) => state.last_access = read(b)?,
            (ANGULAR_DIRECTION, Kind::Vec3) => state.angular_direction = read(b)?,
            (LINEAR_DIRECTION, Kind::Vec3) => state.linear_direction = read(b)?,
            (LAST_POSITION, Kind::Vec3) => state.last_position = read(b)?,
            (SHORT_TERM_POSITION_DELTA, Kind::Vec3) => state.short_term_position_delta = read(b)?,
            (LAST_VERTICAL_ANGLE, Kind::F32) => state.last_vertical_angle = read(b)?,
            (VERTICAL_FORCE_ADJUST, Kind::F32) => state.vertical_force_adjust = read(b)?,
            (TARGET_ANGULAR_DELTA, Kind::Vec3) => state.target_angular_delta = read(b)?,
            (TARGET_LINEAR_DELTA, Kind::Vec3) => state.target_linear_delta = read(b)?,
            (TIMESTEP, Kind::F32) => state.timestep = read(b)?,
            (BANKING_DIRECTION, Kind::F32) => state.banking_direction = read(b)?,
            (BANKING_TARGET_VELOCITY, Kind::F32) => state.banking_target_velocity = read(b)?,
            (LAST_VERTICAL_FRAME, Kind::U32) => state.last_vertical_frame = read(b)?,
            (WIND_DIRECTION, Kind::Vec3) => state.wind_direction = read(b)?,
            (WATER_DIRECTION, Kind::Vec3) => state.water_direction = read(b)?,
            (WORLD_LINEAR_VELOCITY, Kind::Vec3) => state.world_linear_velocity = read(b)?,
            (WORLD_ANGULAR_VELOCITY, Kind::Vec3) => state.world_angular_velocity = read(b)?,
            _ => skip(b, kind)?,
        }
    }

    Ok(state)
}

fn encode_map<T: Field + Copy>(entries: impl ExactSizeIterator<Item = (u32, T)>) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    out.write_u8(T::KIND as u8)?;
    out.write_u32::<LittleEndian>(entries.len() as u32)?;
    for (id, value) in entries {
        out.write_u32::<LittleEndian>(id)?;
        value.write_to(&mut out)?;
    }
    Ok(out)
}

/// Reads a parameter map, handing every entry with a known id and the expected kind to `set`
fn decode_map<T: Field>(block: &[u8], mut set: impl FnMut(u32, T)) -> Result<()> {
    let mut bytes = Cursor::new(block);
    let kind = Kind::from_u8(bytes.read_u8().map_err(decode_err)?)?;
    let count = bytes.read_u32::<LittleEndian>().map_err(decode_err)?;

    for _ in 0..count {
        let id = bytes.read_u32::<LittleEndian>().map_err(decode_err)?;
        if kind == T::KIND {
            set(id, read(&mut bytes)?);
        } else {
            skip(&mut bytes, kind)?;
        }
    }

    Ok(())
}

impl VehicleProperties {
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        let table = &self.table;

        out.write_all(&SAVE_MAGIC)?;
        out.write_u16::<LittleEndian>(SAVE_VERSION)?;

        put(out, tags::VEHICLE_TYPE, table.vehicle_type.id())?;
        put(out, tags::FLAGS, table.flags.bits())?;

        let floats = table.floats();
        let floats = encode_map(floats.iter().map(|(p, v)| (p.id(), *v)))?;
        put_block(out, tags::FLOATS, &floats)?;

        let rotations = table.rotations();
        let rotations = encode_map(rotations.iter().map(|(p, v)| (p.id(), *v)))?;
        put_block(out, tags::ROTATIONS, &rotations)?;

        let vectors = table.vectors();
        let vectors = encode_map(vectors.iter().map(|(p, v)| (p.id(), *v)))?;
        put_block(out, tags::VECTORS, &vectors)?;

        put_block(out, tags::DYNAMICS, &encode_dynamics(&self.dynamics)?)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Decodes a save exactly as written, without filling in defaults
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut bytes = Cursor::new(bytes);

        let mut magic = [0; 4];
        bytes.read_exact(&mut magic).map_err(decode_err)?;
        if magic != SAVE_MAGIC {
            return Err(VehicleError::Codec("bad magic".to_string()));
        }

        let version = bytes.read_u16::<LittleEndian>().map_err(decode_err)?;
        if version > SAVE_VERSION {
            return Err(VehicleError::Codec(format!("unsupported version {version}")));
        }

        let mut table = ParameterTable::default();
        let mut dynamics = DynamicsState::DEFAULT;

        while has_more(&bytes) {
            let (tag, kind) = read_header(&mut bytes)?;

            match (tag, kind) {
                (tags::VEHICLE_TYPE, Kind::U32) => {
                    table.vehicle_type = VehicleType::from_id(read(&mut bytes)?)?;
                }
                (tags::FLAGS, Kind::U32) => {
                    table.flags = VehicleFlags::from_bits_truncate(read(&mut bytes)?);
                }
                (tags::FLOATS, Kind::Block) => {
                    decode_map(read_block(&mut bytes)?, |id, value: f32| {
                        if let Ok(param) = FloatParam::from_id(id) {
                            table.set(ParamSetting::Float(param, value).clamped());
                        }
                    })?;
                }
                (tags::ROTATIONS, Kind::Block) => {
                    decode_map(read_block(&mut bytes)?, |id, value: Quat| {
                        if let Ok(param) = RotationParam::from_id(id) {
                            table.set(ParamSetting::Rotation(param, value).clamped());
                        }
                    })?;
                }
                (tags::VECTORS, Kind::Block) => {
                    decode_map(read_block(&mut bytes)?, |id, value: Vec3A| {
                        if let Ok(param) = VectorParam::from_id(id) {
                            table.set(ParamSetting::Vector(param, value).clamped());
                        }
                    })?;
                }
                (tags::DYNAMICS, Kind::Block) => {
                    dynamics = decode_dynamics(read_block(&mut bytes)?)?;
                }
                _ => skip(&mut bytes, kind)?,
            }
        }

        Ok(Self { table, dynamics })
    }

    /// Decodes a save and merges it over the defaults of its vehicle type
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::restore(&Self::decode(bytes)?))
    }
}
