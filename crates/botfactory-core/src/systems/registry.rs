//! Machine registry - the shared set of machines every agent reads and mutates

use serde::{Deserialize, Serialize};

use crate::components::{Machine, MachineEvent, MachineEventKind, MachineId, Vec2};

/// One machine and where it stands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineSlot {
    pub position: Vec2,
    pub machine: Machine,
}

/// Insertion-ordered machine storage (stored in engine).
///
/// Iteration order is always id order, which is what makes nearest-target
/// ties deterministic. Removed slots are never reused, so a stale
/// [`MachineId`] can only ever miss, never alias another machine.
#[derive(Debug, Clone, Default)]
pub struct MachineRegistry {
    slots: Vec<Option<MachineSlot>>,
    pending_events: Vec<MachineEvent>,
}

impl MachineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a machine and return its handle
    pub fn spawn(&mut self, position: Vec2, machine: Machine) -> MachineId {
        let id = MachineId(self.slots.len() as u32);
        self.slots.push(Some(MachineSlot { position, machine }));
        id
    }

    /// Take a machine off the floor. Agents still targeting it fall back on their next tick.
    pub fn remove(&mut self, id: MachineId) -> Option<Machine> {
        self.slots
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .map(|slot| slot.machine)
    }

    pub fn contains(&self, id: MachineId) -> bool {
        self.slot(id).is_some()
    }

    pub fn get(&self, id: MachineId) -> Option<&Machine> {
        self.slot(id).map(|slot| &slot.machine)
    }

    pub fn position(&self, id: MachineId) -> Option<Vec2> {
        self.slot(id).map(|slot| slot.position)
    }

    fn slot(&self, id: MachineId) -> Option<&MachineSlot> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// All live machines in id order
    pub fn iter(&self) -> impl Iterator<Item = (MachineId, &MachineSlot)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|s| (MachineId(idx as u32), s)))
    }

    /// Apply repair work to a machine. Returns `None` when the handle is stale.
    pub fn repair(&mut self, id: MachineId, amount: f32) -> Option<&Machine> {
        let slot = self.slots.get_mut(id.0 as usize)?.as_mut()?;
        if let Some(kind) = slot.machine.repair(amount) {
            log::info!("{} is now fixed", id);
            self.pending_events.push(MachineEvent { machine: id, kind });
        }
        Some(&slot.machine)
    }

    /// Damage a machine. Returns `None` when the handle is stale.
    pub fn damage(&mut self, id: MachineId) -> Option<&Machine> {
        let slot = self.slots.get_mut(id.0 as usize)?.as_mut()?;
        if let Some(kind) = slot.machine.damage() {
            log::info!("{} was damaged by a drone", id);
            self.pending_events.push(MachineEvent { machine: id, kind });
        }
        Some(&slot.machine)
    }

    /// Is any machine within `radius` of `point`?
    pub fn any_within(&self, point: Vec2, radius: f32) -> bool {
        let radius_sq = radius * radius;
        self.iter()
            .any(|(_, slot)| slot.position.distance_squared(&point) <= radius_sq)
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<MachineEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn damaged_count(&self) -> usize {
        self.iter().filter(|(_, s)| s.machine.is_damaged()).count()
    }

    pub fn fixed_count(&self) -> usize {
        self.iter().filter(|(_, s)| s.machine.is_fixed()).count()
    }

    /// Count pending events of one kind without draining them
    pub fn pending_count(&self, kind: MachineEventKind) -> usize {
        self.pending_events.iter().filter(|e| e.kind == kind).count()
    }

    /// Drop every machine and pending event (session restart)
    pub fn clear(&mut self) {
        self.slots.clear();
        self.pending_events.clear();
    }
}
