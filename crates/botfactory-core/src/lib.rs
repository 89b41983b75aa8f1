//! botfactory Core - Factory Floor Simulation Engine
//!
//! Repair robots and attack drones contend over a shared set of machines.
//! Robots fix damaged machines; drones hunt down fixed ones and break them
//! again. Each agent runs its own finite-state machine every tick.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: robots and drones (machines live in an ordered registry)
//! - **Components**: Pure data attached to entities (Position, Robot, Drone, Name)
//! - **Systems**: Logic that steps the agents and mutates machines
//!
//! # Example
//!
//! ```rust,no_run
//! use botfactory_core::prelude::*;
//!
//! let mut engine = SimulationEngine::with_config(SimConfig::default()).unwrap();
//! engine.generate();
//!
//! while !engine.is_shift_over() {
//!     engine.update(1.0 / 60.0); // 60 FPS
//! }
//! println!("repairs: {}", engine.repair_score());
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod report;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::{ConfigError, SimConfig};
    pub use crate::engine::{SimulationEngine, TickReport};
    pub use crate::report::SimulationSnapshot;
}
