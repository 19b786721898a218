use thiserror::Error;

#[derive(Error, Debug)]
pub enum VehicleError {
    #[error("Unknown or deprecated vehicle parameter id: {0}")]
    InvalidParam(u32),

    #[error("Unknown vehicle type: {0}")]
    InvalidVehicleType(u32),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VehicleError>;
