//! Simulation configuration.
//!
//! Every section deserializes with defaults, so a JSON file only needs the
//! keys it wants to change:
//!
//! ```json
//! { "seed": 42, "drone_spawner": { "max_drones": 5 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{Bounds, DEFAULT_REPAIR_GOAL};

/// Errors raised while loading or validating a [`SimConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value is out of its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    /// The JSON could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// The file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-robot tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    /// Base movement speed (units per second)
    pub move_speed: f32,
    /// Radius searched for damaged machines
    pub detect_range: f32,
    /// Distance to a machine that counts as arrived
    pub arrive_distance: f32,
    /// Radius of the random wander circle while confused
    pub wander_radius: f32,
    /// Fraction of base speed used while wandering
    pub wander_speed_factor: f32,
    pub wander_arrive_distance: f32,
    /// Repair units applied per second
    pub repair_rate: f32,
    /// Robots become confused when light drops below this
    pub confusion_light_threshold: f32,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            detect_range: 8.0,
            arrive_distance: 0.5,
            wander_radius: 3.0,
            wander_speed_factor: 0.7,
            wander_arrive_distance: 0.5,
            repair_rate: 40.0,
            confusion_light_threshold: 0.4,
        }
    }
}

/// Per-drone tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DroneConfig {
    pub move_speed: f32,
    /// Radius searched for fixed machines
    pub detect_range: f32,
    /// Distance to a machine at which the drone strikes
    pub attack_distance: f32,
    /// Seconds between target scans while patrolling
    pub retarget_interval: f32,
    pub patrol_radius: f32,
    pub patrol_arrive_distance: f32,
}

impl Default for DroneConfig {
    fn default() -> Self {
        Self {
            move_speed: 4.0,
            detect_range: 10.0,
            attack_distance: 0.7,
            retarget_interval: 1.0,
            patrol_radius: 5.0,
            patrol_arrive_distance: 0.3,
        }
    }
}

/// Machine placement at session start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineLayoutConfig {
    pub count: u32,
    pub repair_goal: f32,
    /// Region machines are placed in (inside the factory walls)
    pub bounds: Bounds,
    /// No two machines closer than this
    pub min_spacing: f32,
    /// Placement attempts allowed per requested machine
    pub attempts_per_machine: u32,
}

impl Default for MachineLayoutConfig {
    fn default() -> Self {
        Self {
            count: 5,
            repair_goal: DEFAULT_REPAIR_GOAL,
            bounds: Bounds::new(-13.0, 13.0, -8.0, 8.0),
            min_spacing: 2.0,
            attempts_per_machine: 20,
        }
    }
}

/// Robots placed at session start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotCrewConfig {
    pub count: u32,
    pub bounds: Bounds,
    /// Robots are not placed on top of machines
    pub machine_clearance: f32,
}

impl Default for RobotCrewConfig {
    fn default() -> Self {
        Self {
            count: 3,
            bounds: Bounds::new(-13.0, 13.0, -8.0, 8.0),
            machine_clearance: 1.0,
        }
    }
}

/// Periodic drone spawning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DroneSpawnerConfig {
    /// Population cap; no spawn while this many drones exist
    pub max_drones: u32,
    /// Seconds between spawn attempts
    pub spawn_interval: f32,
    pub bounds: Bounds,
    /// Minimum distance between a spawn point and any machine
    pub machine_clearance: f32,
    /// Candidate points tried per spawn attempt
    pub placement_attempts: u32,
}

impl Default for DroneSpawnerConfig {
    fn default() -> Self {
        Self {
            max_drones: 3,
            spawn_interval: 10.0,
            bounds: Bounds::new(-25.0, 25.0, -15.0, 15.0),
            machine_clearance: 1.0,
            placement_attempts: 20,
        }
    }
}

/// Session length
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftConfig {
    pub time_limit_seconds: f32,
}

impl Default for ShiftConfig {
    fn default() -> Self {
        Self {
            time_limit_seconds: 120.0,
        }
    }
}

/// Ambient lighting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub initial_light: f32,
    /// Level the light switch dims to
    pub dim_light: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            initial_light: 1.0,
            dim_light: 0.2,
        }
    }
}

/// Top-level simulation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Optional RNG seed for reproducible sessions
    pub seed: Option<u64>,
    pub robot: RobotConfig,
    pub drone: DroneConfig,
    pub machines: MachineLayoutConfig,
    pub robots: RobotCrewConfig,
    pub drone_spawner: DroneSpawnerConfig,
    pub shift: ShiftConfig,
    pub environment: EnvironmentConfig,
}

impl SimConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let robot = &self.robot;
        if !(robot.move_speed >= 0.0) {
            return Err(ConfigError::Invalid("robot.move_speed must be non-negative"));
        }
        if !(robot.detect_range >= 0.0) {
            return Err(ConfigError::Invalid("robot.detect_range must be non-negative"));
        }
        if !(robot.arrive_distance > 0.0) || !(robot.wander_arrive_distance > 0.0) {
            return Err(ConfigError::Invalid("robot arrival distances must be positive"));
        }
        if !(robot.wander_radius >= 0.0) {
            return Err(ConfigError::Invalid("robot.wander_radius must be non-negative"));
        }
        if !(0.0..=1.0).contains(&robot.wander_speed_factor) {
            return Err(ConfigError::Invalid("robot.wander_speed_factor must be within 0.0..=1.0"));
        }
        if !(robot.repair_rate >= 0.0) {
            return Err(ConfigError::Invalid("robot.repair_rate must be non-negative"));
        }
        if !(0.0..=1.0).contains(&robot.confusion_light_threshold) {
            return Err(ConfigError::Invalid(
                "robot.confusion_light_threshold must be within 0.0..=1.0",
            ));
        }

        let drone = &self.drone;
        if !(drone.move_speed >= 0.0) {
            return Err(ConfigError::Invalid("drone.move_speed must be non-negative"));
        }
        if !(drone.detect_range >= 0.0) {
            return Err(ConfigError::Invalid("drone.detect_range must be non-negative"));
        }
        if !(drone.attack_distance > 0.0) || !(drone.patrol_arrive_distance > 0.0) {
            return Err(ConfigError::Invalid("drone arrival distances must be positive"));
        }
        if !(drone.retarget_interval > 0.0) {
            return Err(ConfigError::Invalid("drone.retarget_interval must be positive"));
        }
        if !(drone.patrol_radius >= 0.0) {
            return Err(ConfigError::Invalid("drone.patrol_radius must be non-negative"));
        }

        let machines = &self.machines;
        if !(machines.repair_goal > 0.0) {
            return Err(ConfigError::Invalid("machines.repair_goal must be positive"));
        }
        if !(machines.min_spacing >= 0.0) {
            return Err(ConfigError::Invalid("machines.min_spacing must be non-negative"));
        }
        if !bounds_valid(&machines.bounds) || !bounds_valid(&self.robots.bounds) {
            return Err(ConfigError::Invalid(
                "placement bounds must be finite with min <= max",
            ));
        }
        if !(self.robots.machine_clearance >= 0.0) {
            return Err(ConfigError::Invalid("robots.machine_clearance must be non-negative"));
        }

        let spawner = &self.drone_spawner;
        if !(spawner.spawn_interval > 0.0) {
            return Err(ConfigError::Invalid("drone_spawner.spawn_interval must be positive"));
        }
        if !bounds_valid(&spawner.bounds) {
            return Err(ConfigError::Invalid(
                "drone_spawner.bounds must be finite with min <= max",
            ));
        }
        if !(spawner.machine_clearance >= 0.0) {
            return Err(ConfigError::Invalid(
                "drone_spawner.machine_clearance must be non-negative",
            ));
        }

        if !(self.shift.time_limit_seconds > 0.0) {
            return Err(ConfigError::Invalid("shift.time_limit_seconds must be positive"));
        }

        let env = &self.environment;
        if !(0.0..=1.0).contains(&env.initial_light) || !(0.0..=1.0).contains(&env.dim_light) {
            return Err(ConfigError::Invalid("light levels must be within 0.0..=1.0"));
        }

        Ok(())
    }
}

/// Finite corners with min <= max, and a width and height that fit in an f32
fn bounds_valid(bounds: &Bounds) -> bool {
    let corners = [bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y];
    corners.iter().all(|v| v.is_finite())
        && bounds.min_x <= bounds.max_x
        && bounds.min_y <= bounds.max_y
        && bounds.width().is_finite()
        && bounds.height().is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            SimConfig::from_json_str(r#"{ "seed": 42, "drone_spawner": { "max_drones": 5 } }"#)
                .unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.drone_spawner.max_drones, 5);
        assert_eq!(config.drone_spawner.spawn_interval, 10.0);
        assert_eq!(config.robot, RobotConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = SimConfig::default();
        config.drone.retarget_interval = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SimConfig::default();
        config.robot.confusion_light_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.machines.bounds = Bounds::new(5.0, -5.0, 0.0, 1.0);
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.robot.move_speed = f32::NAN;
        assert!(config.validate().is_err());

        // Width overflows f32 even though every corner is finite
        let mut config = SimConfig::default();
        config.machines.bounds = Bounds::new(-3.0e38, 3.0e38, -1.0, 1.0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SimConfig::default();
        config.drone_spawner.bounds = Bounds::new(f32::NEG_INFINITY, 0.0, 0.0, 1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overflowing_bounds_json_rejected() {
        let json = r#"{ "machines": { "bounds": {
            "min_x": -3.0e38, "max_x": 3.0e38, "min_y": -1.0, "max_y": 1.0
        } } }"#;
        assert!(matches!(SimConfig::from_json_str(json), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let err = SimConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SimConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
