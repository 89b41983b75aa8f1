//! Read-only reports on the simulation for status displays and JSON export.

use serde::Serialize;

use crate::components::{MachineId, Vec2};

/// Name and state of one agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentStatus {
    pub name: String,
    pub state: &'static str,
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.state)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MachineReport {
    pub id: MachineId,
    pub position: Vec2,
    pub damaged: bool,
    pub repair_progress: f32,
    pub repair_goal: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    /// "robot" or "drone"
    pub kind: &'static str,
    pub state: &'static str,
    pub position: Vec2,
    pub target: Option<MachineId>,
    /// Seconds spent on the current repair, for robots that are repairing
    pub repair_seconds: Option<f32>,
}

/// Point-in-time view of a whole session
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSnapshot {
    pub sim_time: f64,
    pub light_level: f32,
    pub repair_score: u32,
    pub remaining_seconds: f32,
    pub shift_over: bool,
    /// Agents spawned this session, including despawned ones
    pub robots_spawned: u32,
    pub drones_spawned: u32,
    pub machines: Vec<MachineReport>,
    pub agents: Vec<AgentReport>,
}

impl SimulationSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
