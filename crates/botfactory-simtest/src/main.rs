//! botfactory Headless Simulation Harness
//!
//! Runs full shifts in-process and validates the simulation's invariants.
//! No rendering, no input - just the engine and a pass/fail report.
//!
//! Usage:
//!   cargo run -p botfactory-simtest
//!   cargo run -p botfactory-simtest -- --verbose --config factory.json --json
//!   RUST_LOG=botfactory_core=debug cargo run -p botfactory-simtest

use std::path::PathBuf;

use anyhow::{Context, Result};
use botfactory_core::components::{MachineEventKind, RobotState};
use botfactory_core::config::SimConfig;
use botfactory_core::engine::SimulationEngine;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "botfactory-simtest", about = "Headless botfactory simulation harness")]
struct Args {
    /// Print every check, not just failures
    #[arg(long)]
    verbose: bool,
    /// JSON configuration file (defaults are used for missing keys)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Tick duration in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
    /// Print the final snapshot of the full-shift run as JSON
    #[arg(long)]
    json: bool,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimConfig::from_json_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SimConfig::default(),
    };
    anyhow::ensure!(args.dt > 0.0, "--dt must be positive");

    println!("=== botfactory Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Configuration
    results.extend(validate_config(&config));

    // 2. Full shift with invariant checks every tick
    let (shift_results, engine) = run_full_shift(&config, args.dt)?;
    results.extend(shift_results);

    // 3. Lighting
    results.extend(validate_lighting(&config, args.dt)?);

    // 4. Restart
    results.extend(validate_restart(&config, args.dt)?);

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    if args.json {
        println!("\n{}", engine.snapshot().to_json()?);
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        results.len(),
        failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_config(config: &SimConfig) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let mut results = Vec::new();

    results.push(TestResult::new(
        "config_defaults_valid",
        SimConfig::default().validate().is_ok(),
        "default configuration validates",
    ));

    let loaded = config.validate();
    results.push(TestResult::new(
        "config_loaded_valid",
        loaded.is_ok(),
        match loaded {
            Ok(()) => "active configuration validates".to_string(),
            Err(e) => e.to_string(),
        },
    ));

    results
}

// ── 2. Full shift ───────────────────────────────────────────────────────

fn run_full_shift(config: &SimConfig, dt: f32) -> Result<(Vec<TestResult>, SimulationEngine)> {
    println!("--- Full Shift ---");
    let mut results = Vec::new();

    let mut engine = SimulationEngine::with_config(config.clone())?;
    engine.generate();

    results.push(TestResult::new(
        "layout_machines_placed",
        engine.machines.len() == config.machines.count as usize,
        format!("{}/{} machines placed", engine.machines.len(), config.machines.count),
    ));

    let mut repairs = 0u32;
    let mut damages = 0u32;
    let mut invariant_violations = 0usize;
    let mut max_drones = 0usize;
    // Guard against a config where the shift never ends
    let max_ticks = ((config.shift.time_limit_seconds / dt).ceil() as u64).saturating_add(10);

    while !engine.is_shift_over() && engine.tick_count() < max_ticks {
        let report = engine.update(dt);
        for event in &report.events {
            match event.kind {
                MachineEventKind::Repaired => repairs += 1,
                MachineEventKind::Damaged => damages += 1,
            }
        }

        for (_, slot) in engine.machines.iter() {
            let m = &slot.machine;
            let consistent = if m.is_damaged() {
                m.repair_progress() >= 0.0 && m.repair_progress() < m.repair_goal()
            } else {
                m.repair_progress() == m.repair_goal()
            };
            if !consistent {
                invariant_violations += 1;
            }
        }
        max_drones = max_drones.max(engine.drone_count());
    }

    results.push(TestResult::new(
        "shift_completes",
        engine.is_shift_over(),
        format!("{:.1}s simulated in {} ticks", engine.sim_time(), engine.tick_count()),
    ));
    results.push(TestResult::new(
        "machine_invariant_every_tick",
        invariant_violations == 0,
        format!("{} violations", invariant_violations),
    ));
    results.push(TestResult::new(
        "drone_population_capped",
        max_drones <= config.drone_spawner.max_drones as usize,
        format!("peak {} drones (cap {})", max_drones, config.drone_spawner.max_drones),
    ));
    results.push(TestResult::new(
        "score_matches_repair_events",
        engine.repair_score() == repairs,
        format!("score {} / {} repair events", engine.repair_score(), repairs),
    ));
    results.push(TestResult::new(
        "fixed_count_balances",
        engine.machines.fixed_count() as i64 == repairs as i64 - damages as i64,
        format!(
            "{} fixed = {} repairs - {} damages",
            engine.machines.fixed_count(),
            repairs,
            damages
        ),
    ));

    for status in engine.robot_statuses() {
        println!("  {}", status);
    }

    Ok((results, engine))
}

// ── 3. Lighting ─────────────────────────────────────────────────────────

fn validate_lighting(config: &SimConfig, dt: f32) -> Result<Vec<TestResult>> {
    println!("--- Lighting ---");
    let mut results = Vec::new();

    let mut engine = SimulationEngine::with_config(config.clone())?;
    engine.generate();
    for _ in 0..30 {
        engine.update(dt);
    }

    engine.toggle_light();
    let dim = engine.environment.light_level() < config.robot.confusion_light_threshold;
    engine.update(dt);
    let statuses = engine.robot_statuses();
    let confused = statuses
        .iter()
        .filter(|s| s.state == RobotState::Confused.name())
        .count();
    results.push(TestResult::new(
        "darkness_confuses_robots",
        !dim || confused == statuses.len(),
        format!("{}/{} robots confused", confused, statuses.len()),
    ));

    engine.toggle_light();
    engine.update(dt);
    let still_confused = engine
        .robot_statuses()
        .iter()
        .filter(|s| s.state == RobotState::Confused.name())
        .count();
    results.push(TestResult::new(
        "light_restores_robots",
        still_confused == 0,
        format!("{} robots still confused", still_confused),
    ));

    Ok(results)
}

// ── 4. Restart ──────────────────────────────────────────────────────────

fn validate_restart(config: &SimConfig, dt: f32) -> Result<Vec<TestResult>> {
    println!("--- Restart ---");
    let mut results = Vec::new();

    let mut engine = SimulationEngine::with_config(config.clone())?;
    engine.generate();
    let ticks = (30.0 / dt).ceil() as u32;
    for _ in 0..ticks {
        engine.update(dt);
    }
    engine.restart();

    results.push(TestResult::new(
        "restart_resets_session",
        engine.repair_score() == 0
            && engine.sim_time() == 0.0
            && engine.drone_count() == 0
            && engine.machines.fixed_count() == 0,
        format!(
            "score {}, time {:.1}, drones {}, fixed {}",
            engine.repair_score(),
            engine.sim_time(),
            engine.drone_count(),
            engine.machines.fixed_count()
        ),
    ));
    results.push(TestResult::new(
        "restart_replaces_crew",
        engine.robot_count() == config.robots.count as usize,
        format!("{} robots", engine.robot_count()),
    ));

    Ok(results)
}
