//! Shift clock - counts completed repairs and ends the session on a time limit

use serde::{Deserialize, Serialize};

use crate::components::{MachineEvent, MachineEventKind};
use crate::config::ShiftConfig;

/// Timed session state (stored in engine)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftClock {
    pub time_limit_seconds: f32,
    elapsed_seconds: f32,
    repair_score: u32,
    ended: bool,
}

impl ShiftClock {
    pub fn new(config: &ShiftConfig) -> Self {
        Self {
            time_limit_seconds: config.time_limit_seconds,
            elapsed_seconds: 0.0,
            repair_score: 0,
            ended: false,
        }
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed_seconds
    }

    pub fn remaining_seconds(&self) -> f32 {
        (self.time_limit_seconds - self.elapsed_seconds).max(0.0)
    }

    pub fn repair_score(&self) -> u32 {
        self.repair_score
    }

    pub fn is_over(&self) -> bool {
        self.ended
    }

    /// Count machine events; only completed repairs score
    pub fn record(&mut self, event: &MachineEvent) {
        if self.ended {
            return;
        }
        if event.kind == MachineEventKind::Repaired {
            self.repair_score += 1;
            log::info!(
                "Repair registered ({}), total repairs = {}",
                event.machine,
                self.repair_score
            );
        }
    }

    /// Advance the clock. Returns true on the tick the shift ends.
    pub fn advance(&mut self, delta_seconds: f32) -> bool {
        if self.ended {
            return false;
        }

        self.elapsed_seconds += delta_seconds;
        if self.remaining_seconds() <= 0.0 {
            self.ended = true;
            log::info!("Shift complete: {} repairs", self.repair_score);
            return true;
        }
        false
    }
}

impl Default for ShiftClock {
    fn default() -> Self {
        Self::new(&ShiftConfig::default())
    }
}
