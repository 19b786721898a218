mod attractor;
mod camera;
mod deflection;
mod environment;
mod friction;
mod stability;

pub use attractor::*;
pub use camera::*;
pub use deflection::*;
pub use environment::*;
pub use friction::*;
pub use stability::*;
