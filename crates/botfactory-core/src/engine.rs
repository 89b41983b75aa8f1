//! Simulation engine - main entry point for running the simulation

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::*;
use crate::config::{ConfigError, SimConfig};
use crate::report::{AgentReport, AgentStatus, MachineReport, SimulationSnapshot};
use crate::systems::*;

/// What happened during one call to [`SimulationEngine::update`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Machine events in the order agents caused them
    pub events: Vec<MachineEvent>,
    /// Machines drones struck this tick (including no-op hits)
    pub strikes: Vec<MachineId>,
    /// Drone spawned by the spawner this tick
    pub spawned: Option<Entity>,
    /// True on the tick the shift timer ran out
    pub shift_ended: bool,
}

impl TickReport {
    pub fn repairs(&self) -> usize {
        self.events
            .iter()
            .filter(|e| e.kind == MachineEventKind::Repaired)
            .count()
    }
}

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world containing robots and drones
    pub world: World,
    /// Every machine on the floor
    pub machines: MachineRegistry,
    /// Ambient light shared by all robots
    pub environment: Environment,
    pub spawner: DroneSpawner,
    pub shift: ShiftClock,
    counters: AgentCounters,
    config: SimConfig,
    rng: StdRng,
    /// Simulation time in seconds since the session started
    sim_time: f64,
    ticks: u64,
    time_scale: f32,
}

impl SimulationEngine {
    /// Create an empty simulation with the default configuration
    pub fn new() -> Self {
        Self::build(SimConfig::default())
    }

    /// Create an empty simulation from a validated configuration
    pub fn with_config(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            world: World::new(),
            machines: MachineRegistry::new(),
            environment: Environment::new(&config.environment),
            spawner: DroneSpawner::new(config.drone_spawner),
            shift: ShiftClock::new(&config.shift),
            counters: AgentCounters::default(),
            config,
            rng,
            sim_time: 0.0,
            ticks: 0,
            time_scale: 1.0,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Lay out machines and place the robot crew
    pub fn generate(&mut self) {
        place_machines(&mut self.machines, &self.config.machines, &mut self.rng);
        place_robot_crew(
            &mut self.world,
            &self.machines,
            &self.config.robots,
            self.config.robot,
            &mut self.counters,
            &mut self.rng,
        );
    }

    /// Throw away the whole session and generate a fresh one from the config.
    ///
    /// This is the only way a machine returns to its initial state.
    pub fn restart(&mut self) {
        self.world.clear();
        self.machines.clear();
        self.environment = Environment::new(&self.config.environment);
        self.spawner.reset();
        self.counters = AgentCounters::default();
        self.shift = ShiftClock::new(&self.config.shift);
        self.sim_time = 0.0;
        self.ticks = 0;
        self.generate();
        log::info!("Session restarted");
    }

    /// Update the simulation by delta_seconds. Does nothing once the shift is over.
    pub fn update(&mut self, delta_seconds: f32) -> TickReport {
        if self.shift.is_over() {
            return TickReport::default();
        }

        let scaled_delta = delta_seconds.max(0.0) * self.time_scale;
        self.sim_time += scaled_delta as f64;
        self.ticks += 1;

        let ctx = TickContext::new(scaled_delta, self.environment.light_level());

        robot_system(&mut self.world, &mut self.machines, &ctx, &mut self.rng);
        let strikes = drone_system(&mut self.world, &mut self.machines, &ctx, &mut self.rng);

        let events = self.machines.drain_events();
        for event in &events {
            self.shift.record(event);
        }

        let spawned = self.spawner.update(
            &mut self.world,
            &self.machines,
            self.config.drone,
            &mut self.counters,
            scaled_delta,
            &mut self.rng,
        );

        let shift_ended = self.shift.advance(scaled_delta);

        TickReport {
            events,
            strikes,
            spawned,
            shift_ended,
        }
    }

    /// Add a machine at an explicit position
    pub fn add_machine(&mut self, position: Vec2) -> MachineId {
        self.machines
            .spawn(position, Machine::new(self.config.machines.repair_goal))
    }

    /// Add a robot at an explicit position using the configured tuning
    pub fn spawn_robot_at(&mut self, position: Vec2) -> Entity {
        let serial = self.counters.next_robot();
        spawn_robot(&mut self.world, self.config.robot, position, serial, &mut self.rng)
    }

    /// Add a drone at an explicit position, bypassing the spawner's timer and cap
    pub fn spawn_drone_at(&mut self, position: Vec2) -> Entity {
        let serial = self.counters.next_drone();
        spawn_drone(&mut self.world, self.config.drone, position, serial, &mut self.rng)
    }

    /// Remove an agent (external despawn)
    pub fn despawn(&mut self, entity: Entity) -> bool {
        self.world.despawn(entity).is_ok()
    }

    pub fn set_light_level(&mut self, level: f32) {
        self.environment.set_light_level(level);
    }

    pub fn toggle_light(&mut self) -> f32 {
        self.environment.toggle_light()
    }

    /// Set time scale (1.0 = real-time, 2.0 = 2x speed, etc.)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Simulation time in seconds
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn repair_score(&self) -> u32 {
        self.shift.repair_score()
    }

    pub fn is_shift_over(&self) -> bool {
        self.shift.is_over()
    }

    pub fn robot_count(&self) -> usize {
        self.world.query::<&Robot>().iter().count()
    }

    pub fn drone_count(&self) -> usize {
        self.world.query::<&Drone>().iter().count()
    }

    pub fn robot_state(&self, entity: Entity) -> Option<RobotState> {
        self.world.get::<&Robot>(entity).ok().map(|r| r.state)
    }

    /// One line per robot: name and current state, in spawn order
    pub fn robot_statuses(&self) -> Vec<AgentStatus> {
        let mut statuses: Vec<(Serial, AgentStatus)> = self
            .world
            .query::<(&Robot, &Serial, Option<&Name>)>()
            .iter()
            .map(|(entity, (robot, serial, name))| {
                let status = AgentStatus {
                    name: name
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| format!("{:?}", entity)),
                    state: robot.state.name(),
                };
                (*serial, status)
            })
            .collect();
        statuses.sort_by_key(|(serial, _)| *serial);
        statuses.into_iter().map(|(_, status)| status).collect()
    }

    /// Serializable view of the whole session
    pub fn snapshot(&self) -> SimulationSnapshot {
        let machines = self
            .machines
            .iter()
            .map(|(id, slot)| MachineReport {
                id,
                position: slot.position,
                damaged: slot.machine.is_damaged(),
                repair_progress: slot.machine.repair_progress(),
                repair_goal: slot.machine.repair_goal(),
            })
            .collect();

        // Robots first, then drones, each in spawn order
        let mut agents: Vec<(u8, Serial, AgentReport)> = Vec::new();
        let mut robots = self.world.query::<(&Robot, &Position, &Name, &Serial)>();
        for (_, (robot, pos, name, serial)) in robots.iter() {
            let repairing = robot.state == RobotState::Repairing;
            agents.push((
                0,
                *serial,
                AgentReport {
                    name: name.to_string(),
                    kind: "robot",
                    state: robot.state.name(),
                    position: pos.point,
                    target: robot.target,
                    repair_seconds: repairing.then_some(robot.repair_timer),
                },
            ));
        }
        let mut drones = self.world.query::<(&Drone, &Position, &Name, &Serial)>();
        for (_, (drone, pos, name, serial)) in drones.iter() {
            agents.push((
                1,
                *serial,
                AgentReport {
                    name: name.to_string(),
                    kind: "drone",
                    state: drone.state.name(),
                    position: pos.point,
                    target: drone.target,
                    repair_seconds: None,
                },
            ));
        }
        agents.sort_by_key(|(kind, serial, _)| (*kind, *serial));
        let agents = agents.into_iter().map(|(_, _, report)| report).collect();

        SimulationSnapshot {
            sim_time: self.sim_time,
            light_level: self.environment.light_level(),
            repair_score: self.shift.repair_score(),
            remaining_seconds: self.shift.remaining_seconds(),
            shift_over: self.shift.is_over(),
            robots_spawned: self.counters.robots_spawned(),
            drones_spawned: self.counters.drones_spawned(),
            machines,
            agents,
        }
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}
