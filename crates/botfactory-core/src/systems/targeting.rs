//! Target selection - nearest eligible machine within detection range

use crate::components::{Machine, MachineId, Vec2};

use super::registry::MachineRegistry;

/// Robots go after machines that still need work
pub fn needs_repair(machine: &Machine) -> bool {
    machine.is_damaged()
}

/// Drones go after machines somebody already fixed
pub fn is_operational(machine: &Machine) -> bool {
    machine.is_fixed()
}

/// Find the nearest machine passing `eligible` within `detect_range` of `origin`.
///
/// Scans the registry in id order and only replaces the current best when a
/// candidate is strictly closer, so on equal distances the lowest id wins.
pub fn find_nearest_machine(
    machines: &MachineRegistry,
    origin: Vec2,
    detect_range: f32,
    eligible: impl Fn(&Machine) -> bool,
) -> Option<MachineId> {
    let mut best: Option<(MachineId, f32)> = None;

    for (id, slot) in machines.iter() {
        if !eligible(&slot.machine) {
            continue;
        }

        let distance = origin.distance(&slot.position);
        if distance > detect_range {
            continue;
        }

        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((id, distance)),
        }
    }

    best.map(|(id, _)| id)
}
