//! Robot system - repair robot state machine
//!
//! Robots look for the nearest damaged machine, drive to it and pour repair
//! work into it until it is fixed. Low light overrides everything: the robot
//! drops into `Confused` and wanders until the lights come back.

use hecs::World;
use rand::Rng;

use crate::components::{Name, Position, Robot, RobotState, Vec2};

use super::environment::TickContext;
use super::registry::MachineRegistry;
use super::steering::{has_arrived, random_point_in_circle, steer_toward};
use super::targeting::{find_nearest_machine, needs_repair};

/// Run one FSM step for a single robot.
///
/// The light check runs first and can force `Confused` from any state without
/// clearing the target. The state handler then runs in the same tick.
pub fn step_robot(
    robot: &mut Robot,
    position: &mut Vec2,
    machines: &mut MachineRegistry,
    ctx: &TickContext,
    rng: &mut impl Rng,
) {
    if ctx.light_level < robot.params.confusion_light_threshold {
        robot.state = RobotState::Confused;
    }

    match robot.state {
        RobotState::Idle => look_for_target(robot, *position, machines),
        RobotState::Searching | RobotState::MovingToTarget => {
            move_to_target(robot, position, machines, ctx)
        }
        RobotState::Repairing => do_repair(robot, machines, ctx),
        RobotState::Confused => wander(robot, position, ctx, rng),
    }
}

fn look_for_target(robot: &mut Robot, position: Vec2, machines: &MachineRegistry) {
    if let Some(id) =
        find_nearest_machine(machines, position, robot.params.detect_range, needs_repair)
    {
        robot.target = Some(id);
        robot.state = RobotState::MovingToTarget;
    }
}

fn move_to_target(
    robot: &mut Robot,
    position: &mut Vec2,
    machines: &MachineRegistry,
    ctx: &TickContext,
) {
    let Some(destination) = robot.target.and_then(|id| machines.position(id)) else {
        robot.target = None;
        robot.state = RobotState::Idle;
        return;
    };

    // Arrival is judged from where the robot stood at the start of the tick
    let arrived = has_arrived(*position, destination, robot.params.arrive_distance);
    *position = steer_toward(*position, destination, robot.params.move_speed, ctx.delta_seconds);

    if arrived {
        robot.state = RobotState::Repairing;
        robot.repair_timer = 0.0;
    }
}

fn do_repair(robot: &mut Robot, machines: &mut MachineRegistry, ctx: &TickContext) {
    let Some(id) = robot.target else {
        robot.state = RobotState::Idle;
        return;
    };

    robot.repair_timer += ctx.delta_seconds;
    let amount = robot.params.repair_rate * ctx.delta_seconds;

    let done = match machines.repair(id, amount) {
        Some(machine) => machine.is_fixed(),
        // Machine vanished mid-repair
        None => true,
    };

    if done {
        robot.target = None;
        robot.state = RobotState::Idle;
    }
}

fn wander(robot: &mut Robot, position: &mut Vec2, ctx: &TickContext, rng: &mut impl Rng) {
    let params = robot.params;
    let arrived = has_arrived(*position, robot.wander_target, params.wander_arrive_distance);
    *position = steer_toward(
        *position,
        robot.wander_target,
        params.move_speed * params.wander_speed_factor,
        ctx.delta_seconds,
    );

    if arrived {
        robot.wander_target = random_point_in_circle(*position, params.wander_radius, rng);
    }

    if ctx.light_level >= params.confusion_light_threshold {
        robot.state = RobotState::Idle;
        robot.target = None;
    }
}

/// Step every robot in the world once
pub fn robot_system(
    world: &mut World,
    machines: &mut MachineRegistry,
    ctx: &TickContext,
    rng: &mut impl Rng,
) {
    for (entity, (robot, pos, name)) in
        world.query_mut::<(&mut Robot, &mut Position, Option<&Name>)>()
    {
        let before = robot.state;
        step_robot(robot, &mut pos.point, machines, ctx, rng);

        if robot.state != before {
            match name {
                Some(name) => log::debug!("{}: {} -> {}", name, before, robot.state),
                None => log::debug!("robot {:?}: {} -> {}", entity, before, robot.state),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Machine, MachineId};
    use crate::config::RobotConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f32 = 0.1;

    fn setup() -> (Robot, StdRng) {
        let mut rng = StdRng::seed_from_u64(5);
        let robot = Robot::new(RobotConfig::default(), Vec2::ZERO, &mut rng);
        (robot, rng)
    }

    fn bright() -> TickContext {
        TickContext::new(DT, 1.0)
    }

    #[test]
    fn test_idle_finds_damaged_machine() {
        let (mut robot, mut rng) = setup();
        let mut machines = MachineRegistry::new();
        let id = machines.spawn(Vec2::new(3.0, 4.0), Machine::default());
        let mut pos = Vec2::ZERO;

        step_robot(&mut robot, &mut pos, &mut machines, &bright(), &mut rng);

        assert_eq!(robot.state, RobotState::MovingToTarget);
        assert_eq!(robot.target, Some(id));
        // Target selection does not move the robot
        assert_eq!(pos, Vec2::ZERO);
    }

    #[test]
    fn test_idle_ignores_fixed_and_distant_machines() {
        let (mut robot, mut rng) = setup();
        let mut machines = MachineRegistry::new();
        let mut fixed = Machine::default();
        fixed.repair(100.0);
        machines.spawn(Vec2::new(1.0, 0.0), fixed);
        machines.spawn(Vec2::new(20.0, 0.0), Machine::default());
        let mut pos = Vec2::ZERO;

        step_robot(&mut robot, &mut pos, &mut machines, &bright(), &mut rng);

        assert_eq!(robot.state, RobotState::Idle);
        assert!(robot.target.is_none());
    }

    #[test]
    fn test_moves_then_starts_repairing() {
        let (mut robot, mut rng) = setup();
        let mut machines = MachineRegistry::new();
        machines.spawn(Vec2::new(1.0, 0.0), Machine::default());
        let mut pos = Vec2::ZERO;

        step_robot(&mut robot, &mut pos, &mut machines, &bright(), &mut rng);
        assert_eq!(robot.state, RobotState::MovingToTarget);

        let mut ticks = 0;
        while robot.state == RobotState::MovingToTarget && ticks < 100 {
            step_robot(&mut robot, &mut pos, &mut machines, &bright(), &mut rng);
            ticks += 1;
        }

        assert_eq!(robot.state, RobotState::Repairing);
        assert_eq!(robot.repair_timer, 0.0);
        assert!(pos.distance(&Vec2::new(1.0, 0.0)) <= 0.5);
    }

    #[test]
    fn test_searching_behaves_like_moving() {
        let (mut robot, mut rng) = setup();
        let mut machines = MachineRegistry::new();
        let id = machines.spawn(Vec2::new(5.0, 0.0), Machine::default());
        robot.state = RobotState::Searching;
        robot.target = Some(id);
        let mut pos = Vec2::ZERO;

        step_robot(&mut robot, &mut pos, &mut machines, &bright(), &mut rng);

        assert!((pos.x - robot.params.move_speed * DT).abs() < 0.0001);
        assert_eq!(robot.state, RobotState::Searching);
    }

    #[test]
    fn test_repairing_until_fixed() {
        let (mut robot, mut rng) = setup();
        let mut machines = MachineRegistry::new();
        let id = machines.spawn(Vec2::ZERO, Machine::default());
        robot.state = RobotState::Repairing;
        robot.target = Some(id);
        let mut pos = Vec2::ZERO;

        // 40 units/s at 0.1s per tick = 4 units per tick -> 25 ticks
        for _ in 0..24 {
            step_robot(&mut robot, &mut pos, &mut machines, &bright(), &mut rng);
            assert_eq!(robot.state, RobotState::Repairing);
        }
        step_robot(&mut robot, &mut pos, &mut machines, &bright(), &mut rng);

        assert_eq!(robot.state, RobotState::Idle);
        assert!(robot.target.is_none());
        assert!(machines.get(id).unwrap().is_fixed());
        assert_eq!(machines.drain_events().len(), 1);
    }

    #[test]
    fn test_missing_target_falls_back_to_idle() {
        let (mut robot, mut rng) = setup();
        let mut machines = MachineRegistry::new();
        let id = machines.spawn(Vec2::new(2.0, 0.0), Machine::default());
        machines.remove(id);
        let mut pos = Vec2::ZERO;

        robot.state = RobotState::MovingToTarget;
        robot.target = Some(id);
        step_robot(&mut robot, &mut pos, &mut machines, &bright(), &mut rng);
        assert_eq!(robot.state, RobotState::Idle);
        assert!(robot.target.is_none());

        robot.state = RobotState::Repairing;
        robot.target = Some(id);
        step_robot(&mut robot, &mut pos, &mut machines, &bright(), &mut rng);
        assert_eq!(robot.state, RobotState::Idle);

        robot.state = RobotState::Repairing;
        robot.target = None;
        step_robot(&mut robot, &mut pos, &mut machines, &bright(), &mut rng);
        assert_eq!(robot.state, RobotState::Idle);
        assert_eq!(pos, Vec2::ZERO);
    }

    #[test]
    fn test_darkness_interrupts_repair_and_keeps_target() {
        let (mut robot, mut rng) = setup();
        let mut machines = MachineRegistry::new();
        let id = machines.spawn(Vec2::ZERO, Machine::default());
        robot.state = RobotState::Repairing;
        robot.target = Some(id);
        let mut pos = Vec2::ZERO;

        step_robot(&mut robot, &mut pos, &mut machines, &TickContext::new(DT, 0.2), &mut rng);

        assert_eq!(robot.state, RobotState::Confused);
        assert_eq!(robot.target, Some(id));
        // No repair work was applied this tick
        assert_eq!(machines.get(id).unwrap().repair_progress(), 0.0);
    }

    #[test]
    fn test_confused_wanders_slowly_and_recovers() {
        let (mut robot, mut rng) = setup();
        let mut machines = MachineRegistry::new();
        robot.state = RobotState::Confused;
        robot.target = Some(MachineId(7));
        robot.wander_target = Vec2::new(3.0, 0.0);
        let mut pos = Vec2::ZERO;

        step_robot(&mut robot, &mut pos, &mut machines, &TickContext::new(DT, 0.1), &mut rng);
        let expected = robot.params.move_speed * robot.params.wander_speed_factor * DT;
        assert!((pos.x - expected).abs() < 0.0001);
        assert_eq!(robot.state, RobotState::Confused);

        step_robot(&mut robot, &mut pos, &mut machines, &bright(), &mut rng);
        assert_eq!(robot.state, RobotState::Idle);
        assert!(robot.target.is_none());
    }

    #[test]
    fn test_wander_point_rechosen_on_arrival() {
        let (mut robot, mut rng) = setup();
        let mut machines = MachineRegistry::new();
        robot.state = RobotState::Confused;
        robot.wander_target = Vec2::new(0.2, 0.0);
        let mut pos = Vec2::ZERO;

        step_robot(&mut robot, &mut pos, &mut machines, &TickContext::new(DT, 0.0), &mut rng);

        assert!(robot.wander_target.distance(&pos) <= robot.params.wander_radius + 1e-4);
        assert_eq!(robot.state, RobotState::Confused);
    }

    #[test]
    fn test_robot_system_steps_world() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(1);
        let robot = Robot::new(RobotConfig::default(), Vec2::ZERO, &mut rng);
        let entity = world.spawn((robot, Position::new(0.0, 0.0), Name::new("Robot-1")));

        let mut machines = MachineRegistry::new();
        let id = machines.spawn(Vec2::new(0.0, 2.0), Machine::default());

        robot_system(&mut world, &mut machines, &bright(), &mut rng);
        robot_system(&mut world, &mut machines, &bright(), &mut rng);

        let robot = world.get::<&Robot>(entity).unwrap();
        assert_eq!(robot.target, Some(id));
        let pos = world.get::<&Position>(entity).unwrap();
        assert!(pos.point.y > 0.0);
    }
}
