//! Agent components: repair robots and attacking drones.
//!
//! Each agent kind carries its own FSM state, its target handle and the
//! timers/anchors its behavior needs. Tuning values are copied in from the
//! config at spawn time so every agent can be adjusted individually.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::common::Vec2;
use super::machine::MachineId;
use crate::config::{DroneConfig, RobotConfig};
use crate::systems::random_point_in_circle;

/// Robot FSM states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RobotState {
    /// Looking for the nearest damaged machine
    #[default]
    Idle,
    /// Same behavior as `MovingToTarget`; nothing transitions into it yet
    Searching,
    /// Driving toward the target machine
    MovingToTarget,
    /// Adding repair work to the target every tick
    Repairing,
    /// Too dark to work - wandering aimlessly
    Confused,
}

impl RobotState {
    pub fn name(&self) -> &'static str {
        match self {
            RobotState::Idle => "Idle",
            RobotState::Searching => "Searching",
            RobotState::MovingToTarget => "MovingToTarget",
            RobotState::Repairing => "Repairing",
            RobotState::Confused => "Confused",
        }
    }
}

impl std::fmt::Display for RobotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Drone FSM states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DroneState {
    #[default]
    Patrolling,
    ChasingMachine,
    Attacking,
}

impl DroneState {
    pub fn name(&self) -> &'static str {
        match self {
            DroneState::Patrolling => "Patrolling",
            DroneState::ChasingMachine => "ChasingMachine",
            DroneState::Attacking => "Attacking",
        }
    }
}

impl std::fmt::Display for DroneState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Repair robot component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Robot {
    pub state: RobotState,
    pub target: Option<MachineId>,
    /// Where the robot is heading while confused
    pub wander_target: Vec2,
    /// Seconds spent on the current repair
    pub repair_timer: f32,
    pub params: RobotConfig,
}

impl Robot {
    /// Create an idle robot with an initial wander point around `spawn`
    pub fn new(params: RobotConfig, spawn: Vec2, rng: &mut impl Rng) -> Self {
        Self {
            state: RobotState::Idle,
            target: None,
            wander_target: random_point_in_circle(spawn, params.wander_radius, rng),
            repair_timer: 0.0,
            params,
        }
    }
}

/// Attack drone component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drone {
    pub state: DroneState,
    pub target: Option<MachineId>,
    /// Fixed anchor the patrol circle is centered on (the spawn point)
    pub patrol_center: Vec2,
    pub patrol_target: Vec2,
    /// Seconds accumulated toward the next target scan
    pub retarget_timer: f32,
    pub params: DroneConfig,
}

impl Drone {
    /// Create a patrolling drone anchored at `spawn`
    pub fn new(params: DroneConfig, spawn: Vec2, rng: &mut impl Rng) -> Self {
        Self {
            state: DroneState::Patrolling,
            target: None,
            patrol_center: spawn,
            patrol_target: random_point_in_circle(spawn, params.patrol_radius, rng),
            retarget_timer: 0.0,
            params,
        }
    }

    /// Pick a fresh point inside the patrol circle
    pub fn choose_patrol_point(&mut self, rng: &mut impl Rng) {
        self.patrol_target =
            random_point_in_circle(self.patrol_center, self.params.patrol_radius, rng);
    }
}
