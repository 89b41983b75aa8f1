//! Spawning - machine layout, robot crew placement and the periodic drone spawner

use hecs::{Entity, World};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::{Bounds, Drone, Machine, Name, Position, Robot, Serial, Vec2};
use crate::config::{
    DroneConfig, DroneSpawnerConfig, MachineLayoutConfig, RobotConfig, RobotCrewConfig,
};

use super::registry::MachineRegistry;

/// Scatter machines inside the layout bounds, keeping them `min_spacing` apart.
///
/// Gives up after `count * attempts_per_machine` tries and returns how many
/// machines actually made it onto the floor.
pub fn place_machines(
    machines: &mut MachineRegistry,
    config: &MachineLayoutConfig,
    rng: &mut impl Rng,
) -> u32 {
    let max_attempts = config.count.saturating_mul(config.attempts_per_machine);
    let mut placed = 0;
    let mut attempts = 0;

    while placed < config.count && attempts < max_attempts {
        attempts += 1;

        let candidate = config.bounds.random_point(rng);
        if machines.any_within(candidate, config.min_spacing) {
            continue;
        }

        machines.spawn(candidate, Machine::new(config.repair_goal));
        placed += 1;
    }

    if placed < config.count {
        log::warn!(
            "Machine layout placed only {} of {} machines after {} attempts",
            placed,
            config.count,
            attempts
        );
    } else {
        log::info!("Machine layout placed {} machines", placed);
    }

    placed
}

/// Random point in `bounds` at least `clearance` away from every machine
pub fn find_clear_point(
    machines: &MachineRegistry,
    bounds: &Bounds,
    clearance: f32,
    attempts: u32,
    rng: &mut impl Rng,
) -> Option<Vec2> {
    (0..attempts.max(1))
        .map(|_| bounds.random_point(rng))
        .find(|candidate| clearance <= 0.0 || !machines.any_within(*candidate, clearance))
}

/// Per-kind spawn counters for a session. Each kind numbers its agents from 1
/// and never hands out the same number twice, even after despawns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCounters {
    robots: u32,
    drones: u32,
}

impl AgentCounters {
    pub fn next_robot(&mut self) -> Serial {
        self.robots += 1;
        Serial(self.robots)
    }

    pub fn next_drone(&mut self) -> Serial {
        self.drones += 1;
        Serial(self.drones)
    }

    pub fn robots_spawned(&self) -> u32 {
        self.robots
    }

    pub fn drones_spawned(&self) -> u32 {
        self.drones
    }
}

/// Spawn robot number `serial` at `spawn`, named "Robot-<serial>"
pub fn spawn_robot(
    world: &mut World,
    params: RobotConfig,
    spawn: Vec2,
    serial: Serial,
    rng: &mut impl Rng,
) -> Entity {
    let robot = Robot::new(params, spawn, rng);
    let name = Name::new(format!("Robot-{}", serial.0));
    world.spawn((robot, Position::from_point(spawn), name, serial))
}

/// Spawn drone number `serial` anchored at `spawn`, named "Drone-<serial>"
pub fn spawn_drone(
    world: &mut World,
    params: DroneConfig,
    spawn: Vec2,
    serial: Serial,
    rng: &mut impl Rng,
) -> Entity {
    let drone = Drone::new(params, spawn, rng);
    let name = Name::new(format!("Drone-{}", serial.0));
    world.spawn((drone, Position::from_point(spawn), name, serial))
}

/// Place the starting robot crew, clear of machines where possible
pub fn place_robot_crew(
    world: &mut World,
    machines: &MachineRegistry,
    crew: &RobotCrewConfig,
    params: RobotConfig,
    counters: &mut AgentCounters,
    rng: &mut impl Rng,
) -> Vec<Entity> {
    let mut robots = Vec::with_capacity(crew.count as usize);

    for _ in 0..crew.count {
        // Fall back to any point in bounds rather than dropping a robot
        let spawn = find_clear_point(machines, &crew.bounds, crew.machine_clearance, 20, rng)
            .unwrap_or_else(|| crew.bounds.random_point(rng));
        robots.push(spawn_robot(world, params, spawn, counters.next_robot(), rng));
    }

    robots
}

/// Periodic drone spawner (stored in engine)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroneSpawner {
    pub config: DroneSpawnerConfig,
    timer: f32,
}

impl DroneSpawner {
    pub fn new(config: DroneSpawnerConfig) -> Self {
        Self { config, timer: 0.0 }
    }

    /// Advance the spawn timer; on each interval try to add one drone under the cap
    pub fn update(
        &mut self,
        world: &mut World,
        machines: &MachineRegistry,
        params: DroneConfig,
        counters: &mut AgentCounters,
        delta_seconds: f32,
        rng: &mut impl Rng,
    ) -> Option<Entity> {
        self.timer += delta_seconds;
        if self.timer < self.config.spawn_interval {
            return None;
        }
        self.timer = 0.0;

        let current = world.query::<&Drone>().iter().count() as u32;
        if current >= self.config.max_drones {
            return None;
        }

        let Some(spawn) = find_clear_point(
            machines,
            &self.config.bounds,
            self.config.machine_clearance,
            self.config.placement_attempts,
            rng,
        ) else {
            log::warn!("Drone spawn skipped: no point clear of machines");
            return None;
        };

        let serial = counters.next_drone();
        log::info!("Drone-{} spawned at ({:.1}, {:.1})", serial.0, spawn.x, spawn.y);
        Some(spawn_drone(world, params, spawn, serial, rng))
    }

    pub fn reset(&mut self) {
        self.timer = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_place_machines_respects_spacing() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut machines = MachineRegistry::new();
        let config = MachineLayoutConfig::default();

        let placed = place_machines(&mut machines, &config, &mut rng);
        assert_eq!(placed, config.count);
        assert_eq!(machines.len(), config.count as usize);

        let slots: Vec<_> = machines.iter().map(|(_, s)| s.position).collect();
        for (i, a) in slots.iter().enumerate() {
            assert!(config.bounds.contains(a));
            for b in &slots[i + 1..] {
                assert!(a.distance(b) > config.min_spacing);
            }
        }
        assert_eq!(machines.damaged_count(), config.count as usize);
    }

    #[test]
    fn test_place_machines_gives_up_when_crowded() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut machines = MachineRegistry::new();
        let config = MachineLayoutConfig {
            count: 10,
            bounds: Bounds::new(0.0, 1.0, 0.0, 1.0),
            min_spacing: 5.0,
            ..Default::default()
        };

        // Only one machine fits in a 1x1 box with 5 units of spacing
        assert_eq!(place_machines(&mut machines, &config, &mut rng), 1);
    }

    #[test]
    fn test_robot_crew_is_named_and_idle() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut world = World::new();
        let machines = MachineRegistry::new();
        let crew = RobotCrewConfig::default();

        let mut counters = AgentCounters::default();
        let params = RobotConfig::default();

        let robots =
            place_robot_crew(&mut world, &machines, &crew, params, &mut counters, &mut rng);
        assert_eq!(robots.len(), 3);
        assert_eq!(counters.robots_spawned(), 3);

        let name = world.get::<&Name>(robots[2]).unwrap();
        assert_eq!(name.as_str(), "Robot-3");
        let pos = world.get::<&Position>(robots[0]).unwrap();
        assert!(crew.bounds.contains(&pos.point));
    }

    #[test]
    fn test_spawner_waits_for_interval_and_respects_cap() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut world = World::new();
        let machines = MachineRegistry::new();
        let mut spawner = DroneSpawner::new(DroneSpawnerConfig {
            max_drones: 2,
            spawn_interval: 10.0,
            ..Default::default()
        });
        let params = DroneConfig::default();
        let mut counters = AgentCounters::default();
        let mut tick = |dt: f32, world: &mut World, rng: &mut StdRng| {
            spawner.update(world, &machines, params, &mut counters, dt, rng)
        };

        assert!(tick(9.0, &mut world, &mut rng).is_none());
        let first = tick(1.0, &mut world, &mut rng).unwrap();
        let second = tick(10.0, &mut world, &mut rng).unwrap();
        // Cap reached
        assert!(tick(10.0, &mut world, &mut rng).is_none());

        assert_eq!(world.query::<&Drone>().iter().count(), 2);
        assert_eq!(world.get::<&Name>(first).unwrap().as_str(), "Drone-1");
        assert_eq!(world.get::<&Name>(second).unwrap().as_str(), "Drone-2");
        assert_eq!(*world.get::<&Serial>(second).unwrap(), Serial(2));
    }

    #[test]
    fn test_spawner_keeps_clear_of_machines() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut world = World::new();
        let mut machines = MachineRegistry::new();
        machines.spawn(Vec2::ZERO, Machine::default());
        let mut spawner = DroneSpawner::new(DroneSpawnerConfig {
            max_drones: 50,
            spawn_interval: 1.0,
            bounds: Bounds::new(-3.0, 3.0, -3.0, 3.0),
            machine_clearance: 1.5,
            ..Default::default()
        });

        let mut counters = AgentCounters::default();

        for _ in 0..30 {
            let params = DroneConfig::default();
            if let Some(entity) =
                spawner.update(&mut world, &machines, params, &mut counters, 1.0, &mut rng)
            {
                let pos = world.get::<&Position>(entity).unwrap();
                assert!(pos.point.distance(&Vec2::ZERO) > 1.5);
            }
        }
    }

    #[test]
    fn test_find_clear_point_fails_when_blocked() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut machines = MachineRegistry::new();
        machines.spawn(Vec2::ZERO, Machine::default());
        let bounds = Bounds::new(-1.0, 1.0, -1.0, 1.0);

        assert!(find_clear_point(&machines, &bounds, 5.0, 10, &mut rng).is_none());
        assert!(find_clear_point(&machines, &bounds, 0.0, 1, &mut rng).is_some());
    }

    #[test]
    fn test_counters_never_reuse_numbers() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut world = World::new();
        let mut counters = AgentCounters::default();
        let params = RobotConfig::default();

        let first = spawn_robot(&mut world, params, Vec2::ZERO, counters.next_robot(), &mut rng);
        world.despawn(first).unwrap();
        let second = spawn_robot(&mut world, params, Vec2::ZERO, counters.next_robot(), &mut rng);

        assert_eq!(world.get::<&Name>(second).unwrap().as_str(), "Robot-2");
        // Drones count separately from robots
        assert_eq!(counters.next_drone(), Serial(1));
    }
}
