//! Systems - logic that operates on components

mod drone;
mod environment;
mod registry;
mod robot;
mod shift;
mod spawning;
mod steering;
mod targeting;

pub use drone::*;
pub use environment::*;
pub use registry::*;
pub use robot::*;
pub use shift::*;
pub use spawning::*;
pub use steering::*;
pub use targeting::*;
