//! Environment - ambient light and the per-tick context handed to agents

use serde::{Deserialize, Serialize};

use crate::config::EnvironmentConfig;

/// Factory-wide ambient state (stored in engine)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    light_level: f32,
    dim_level: f32,
}

impl Environment {
    pub fn new(config: &EnvironmentConfig) -> Self {
        Self {
            light_level: config.initial_light.clamp(0.0, 1.0),
            dim_level: config.dim_light.clamp(0.0, 1.0),
        }
    }

    pub fn light_level(&self) -> f32 {
        self.light_level
    }

    pub fn set_light_level(&mut self, level: f32) {
        self.light_level = level.clamp(0.0, 1.0);
    }

    /// Flip the light switch: a bright floor (> 0.5) dims, anything else goes to full
    pub fn toggle_light(&mut self) -> f32 {
        self.light_level = if self.light_level > 0.5 {
            self.dim_level
        } else {
            1.0
        };
        log::info!("Light level is now {:.2}", self.light_level);
        self.light_level
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(&EnvironmentConfig::default())
    }
}

/// Read-only snapshot passed to every agent step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    /// Elapsed simulation time for this tick
    pub delta_seconds: f32,
    /// Ambient light sampled at the start of the tick
    pub light_level: f32,
}

impl TickContext {
    pub fn new(delta_seconds: f32, light_level: f32) -> Self {
        Self {
            delta_seconds,
            light_level,
        }
    }
}
