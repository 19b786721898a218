mod collaborators;
mod config;
mod context;
mod dynamics_state;
mod exponential_timer;
mod motor;
mod parameter_store;
mod params;
mod persist;
mod pipeline;
mod presets;
mod properties;
mod running_stat;
mod stages;
mod vehicle_type;

pub use collaborators::*;
pub use config::*;
pub use context::*;
pub use dynamics_state::*;
pub use exponential_timer::*;
pub use motor::*;
pub use parameter_store::*;
pub use params::*;
pub use persist::*;
pub use pipeline::*;
pub use presets::*;
pub use properties::*;
pub use running_stat::*;
pub use vehicle_type::*;
