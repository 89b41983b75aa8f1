//! Machine component: the repairable units robots and drones fight over.

use serde::{Deserialize, Serialize};

/// Default amount of repair work needed to fix a machine
pub const DEFAULT_REPAIR_GOAL: f32 = 100.0;

/// Stable handle to a machine in the [`MachineRegistry`](crate::systems::MachineRegistry).
///
/// Agents hold this instead of a reference; it has to be looked up again every
/// tick and the lookup fails once the machine is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MachineId(pub u32);

impl std::fmt::Display for MachineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Machine-{}", self.0)
    }
}

/// Observable side effect of a machine mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineEventKind {
    /// Progress reached the goal; the machine flipped from damaged to fixed
    Repaired,
    /// A fixed machine was knocked back to damaged
    Damaged,
}

/// A machine event tagged with the machine it happened to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineEvent {
    pub machine: MachineId,
    pub kind: MachineEventKind,
}

/// Repair/damage state for one machine.
///
/// Fields are private so the two mutators are the only way to change state:
/// a fixed machine always has `progress == goal`, and a machine that was just
/// damaged always has `progress == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    damaged: bool,
    repair_progress: f32,
    repair_goal: f32,
}

impl Machine {
    /// New machines start out damaged with no progress
    pub fn new(repair_goal: f32) -> Self {
        Self {
            damaged: true,
            repair_progress: 0.0,
            repair_goal,
        }
    }

    pub fn is_damaged(&self) -> bool {
        self.damaged
    }

    pub fn is_fixed(&self) -> bool {
        !self.damaged
    }

    pub fn repair_progress(&self) -> f32 {
        self.repair_progress
    }

    pub fn repair_goal(&self) -> f32 {
        self.repair_goal
    }

    /// Progress as a fraction of the goal (0.0 - 1.0)
    pub fn progress_fraction(&self) -> f32 {
        if self.repair_goal > 0.0 {
            (self.repair_progress / self.repair_goal).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Add repair work. Returns `Repaired` on the call that completes the repair.
    ///
    /// No-op on a fixed machine. Negative amounts are treated as zero.
    pub fn repair(&mut self, amount: f32) -> Option<MachineEventKind> {
        if !self.damaged {
            return None;
        }

        self.repair_progress += amount.max(0.0);

        if self.repair_progress >= self.repair_goal {
            self.repair_progress = self.repair_goal;
            self.damaged = false;
            Some(MachineEventKind::Repaired)
        } else {
            None
        }
    }

    /// Knock a fixed machine back to damaged, wiping all progress.
    ///
    /// No-op on a machine that is already damaged (partial progress survives).
    pub fn damage(&mut self) -> Option<MachineEventKind> {
        if self.damaged {
            return None;
        }

        self.damaged = true;
        self.repair_progress = 0.0;
        Some(MachineEventKind::Damaged)
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(DEFAULT_REPAIR_GOAL)
    }
}
