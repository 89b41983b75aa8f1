//! Drone system - attack drone state machine
//!
//! Drones patrol around their spawn point and periodically scan for machines
//! that have been *fixed*. When they find one they fly over and knock it back
//! to damaged, undoing the robots' work.

use hecs::World;
use rand::Rng;

use crate::components::{Drone, DroneState, MachineId, Name, Position, Vec2};

use super::environment::TickContext;
use super::registry::MachineRegistry;
use super::steering::{has_arrived, steer_toward};
use super::targeting::{find_nearest_machine, is_operational};

/// Run one FSM step for a single drone. Returns the machine struck this tick, if any.
///
/// The retarget timer accumulates every tick regardless of state and is only
/// consumed (and reset) by a scan while patrolling.
pub fn step_drone(
    drone: &mut Drone,
    position: &mut Vec2,
    machines: &mut MachineRegistry,
    ctx: &TickContext,
    rng: &mut impl Rng,
) -> Option<MachineId> {
    drone.retarget_timer += ctx.delta_seconds;

    match drone.state {
        DroneState::Patrolling => {
            patrol(drone, position, ctx, rng);
            if drone.retarget_timer >= drone.params.retarget_interval {
                drone.retarget_timer = 0.0;
                find_machine_to_attack(drone, *position, machines);
            }
            None
        }
        DroneState::ChasingMachine => {
            chase_machine(drone, position, machines, ctx);
            None
        }
        DroneState::Attacking => attack_machine(drone, machines, rng),
    }
}

fn patrol(drone: &mut Drone, position: &mut Vec2, ctx: &TickContext, rng: &mut impl Rng) {
    let arrived = has_arrived(*position, drone.patrol_target, drone.params.patrol_arrive_distance);
    *position = steer_toward(
        *position,
        drone.patrol_target,
        drone.params.move_speed,
        ctx.delta_seconds,
    );

    if arrived {
        drone.choose_patrol_point(rng);
    }
}

fn find_machine_to_attack(drone: &mut Drone, position: Vec2, machines: &MachineRegistry) {
    if let Some(id) =
        find_nearest_machine(machines, position, drone.params.detect_range, is_operational)
    {
        drone.target = Some(id);
        drone.state = DroneState::ChasingMachine;
    }
}

fn chase_machine(
    drone: &mut Drone,
    position: &mut Vec2,
    machines: &MachineRegistry,
    ctx: &TickContext,
) {
    let Some(destination) = drone.target.and_then(|id| machines.position(id)) else {
        drone.target = None;
        drone.state = DroneState::Patrolling;
        return;
    };

    let arrived = has_arrived(*position, destination, drone.params.attack_distance);
    *position = steer_toward(*position, destination, drone.params.move_speed, ctx.delta_seconds);

    if arrived {
        drone.state = DroneState::Attacking;
    }
}

fn attack_machine(
    drone: &mut Drone,
    machines: &mut MachineRegistry,
    rng: &mut impl Rng,
) -> Option<MachineId> {
    let target = drone.target.take();
    drone.state = DroneState::Patrolling;

    let id = target?;
    // A single instantaneous hit; no-op if someone else already broke it
    machines.damage(id)?;
    drone.choose_patrol_point(rng);
    Some(id)
}

/// Step every drone in the world once. Returns the machines struck, in step order.
pub fn drone_system(
    world: &mut World,
    machines: &mut MachineRegistry,
    ctx: &TickContext,
    rng: &mut impl Rng,
) -> Vec<MachineId> {
    let mut strikes = Vec::new();

    for (entity, (drone, pos, name)) in
        world.query_mut::<(&mut Drone, &mut Position, Option<&Name>)>()
    {
        let before = drone.state;
        if let Some(id) = step_drone(drone, &mut pos.point, machines, ctx, rng) {
            strikes.push(id);
        }

        if drone.state != before {
            match name {
                Some(name) => log::debug!("{}: {} -> {}", name, before, drone.state),
                None => log::debug!("drone {:?}: {} -> {}", entity, before, drone.state),
            }
        }
    }

    strikes
}
