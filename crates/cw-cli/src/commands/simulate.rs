use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use cw_simulation::hud::VitalReading;
use cw_simulation::{SimEventKind, Simulation, SpawnerRole};

use super::autopilot::Autopilot;

/// Options of the `simulate` command.
pub struct Options {
    pub seconds: Option<f64>,
    pub dt: f64,
    pub seed: Option<u64>,
    pub config: Option<PathBuf>,
    pub autopilot: bool,
    pub verbose: bool,
    pub json: bool,
}

pub fn run(options: &Options) -> Result<(), String> {
    if !(options.dt.is_finite() && options.dt > 0.0) {
        return Err(format!("--dt must be positive, got {}", options.dt));
    }
    if let Some(seconds) = options.seconds {
        if !(seconds.is_finite() && seconds >= 0.0) {
            return Err(format!("--seconds must be non-negative, got {seconds}"));
        }
    }

    let mut config = super::config_or_default(options.config.as_deref())?;
    if let Some(seed) = options.seed {
        config = config.with_seed(seed);
    }
    config.validate().map_err(|e| e.to_string())?;
    let seed = config.seed;
    let session_length = f64::from(config.clock.max_days) * config.clock.cycle_duration;

    let mut sim = Simulation::on_island(config).map_err(|e| format!("simulation setup failed: {e}"))?;
    sim.init().map_err(|e| format!("simulation init failed: {e}"))?;

    let seconds = options.seconds.unwrap_or(session_length + options.dt);
    let frames = (seconds / options.dt).ceil() as u64;
    let mut pilot = options.autopilot.then(Autopilot::new);

    for _ in 0..frames {
        if sim.is_over() {
            break;
        }
        if let Some(pilot) = pilot.as_mut() {
            pilot
                .step(&mut sim, options.dt)
                .map_err(|e| format!("autopilot error: {e}"))?;
        }
        sim.tick(options.dt)
            .map_err(|e| format!("simulation error: {e}"))?;
    }
    tracing::info!(frames = sim.frame(), "simulation finished");

    if options.json {
        let json = serde_json::to_string_pretty(&sim.hud()).map_err(|e| e.to_string())?;
        println!("{json}");
        return Ok(());
    }

    print_report(&sim, seed, options, pilot.as_ref());
    Ok(())
}

fn print_report(sim: &Simulation, seed: u64, options: &Options, pilot: Option<&Autopilot>) {
    let hud = sim.hud();

    // Header
    println!(
        "  {} '{}' {}",
        "Simulation".bold(),
        sim.world().meta.name,
        format!(
            "({:.1}s, {} frames, seed={seed}, dt={})",
            sim.clock().elapsed(),
            sim.frame(),
            options.dt
        )
        .dimmed()
    );
    println!("  {} events logged", sim.events().len());
    println!();

    // Events
    if options.verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in sim.events().events() {
            let label = format!("[{:>7.1}s]", event.time).dimmed();
            println!("  {label} {}", colorize_event(&event.kind, &event.description));
        }
        if sim.events().is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    } else {
        let notable: Vec<_> = sim
            .events()
            .events()
            .iter()
            .filter(|e| is_notable(&e.kind))
            .collect();
        if !notable.is_empty() {
            println!("  {}", "Notable Events".bold().underline());
            for event in notable {
                println!("  {}", colorize_event(&event.kind, &event.description));
            }
            println!();
        }
    }

    // Status
    println!("  {}", "Survivor Status".bold().underline());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Day", "Time", "Energy", "Thirst", "Health"]);
    let time = if hud.ended {
        "--".to_string()
    } else {
        hud.time_of_day.to_string()
    };
    table.add_row(vec![
        hud.day_label(),
        time,
        format_vital_bar(&hud.energy),
        format_vital_bar(&hud.thirst),
        format_vital_bar(&hud.health),
    ]);
    println!("{table}");
    println!();

    // Spawners
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Spawner", "Alive", "Spawned", "Failed", "State"]);
    for role in [SpawnerRole::Resources, SpawnerRole::Threats] {
        let spawner = sim.spawner(role);
        let state = match spawner.disabled_reason() {
            Some(reason) => format!("disabled: {reason}"),
            None => format!("active by {}", spawner.config().active_phase),
        };
        let alive = match role {
            SpawnerRole::Resources => hud.resources,
            SpawnerRole::Threats => hud.threats,
        };
        table.add_row(vec![
            spawner.config().name.clone(),
            alive.to_string(),
            spawner.spawned_total().to_string(),
            spawner.failed_attempts().to_string(),
            state,
        ]);
    }
    println!("{table}");
    println!();

    if let Some(pilot) = pilot {
        println!(
            "  Autopilot: {} drinks, {} coconuts eaten, {} naps ({} refused)",
            pilot.drinks, pilot.meals, pilot.naps, pilot.refused_naps
        );
        println!();
    }

    if sim.is_player_dead() {
        println!("  {}", "The survivor did not make it.".red().bold());
    } else if hud.ended {
        println!("  {}", hud.day_label().green().bold());
    }
}

fn is_notable(kind: &SimEventKind) -> bool {
    matches!(
        kind,
        SimEventKind::DayStarted { .. }
            | SimEventKind::DayEvent { message: Some(_), .. }
            | SimEventKind::GameCompleted { .. }
            | SimEventKind::SpawnerDisabled { .. }
            | SimEventKind::VitalWarning { .. }
            | SimEventKind::PlayerDied
    )
}

fn colorize_event(kind: &SimEventKind, description: &str) -> colored::ColoredString {
    match kind {
        SimEventKind::PlayerDied | SimEventKind::SpawnerDisabled { .. } => description.red().bold(),
        SimEventKind::VitalWarning { .. } | SimEventKind::SleepRefused { .. } => {
            description.yellow()
        }
        SimEventKind::VitalRecovered { .. }
        | SimEventKind::Drank { .. }
        | SimEventKind::PickedUp { .. }
        | SimEventKind::Slept { .. } => description.green(),
        SimEventKind::DayStarted { .. }
        | SimEventKind::DayEvent { .. }
        | SimEventKind::GameCompleted { .. } => description.bold(),
        SimEventKind::PhaseChanged { .. } => description.cyan(),
        SimEventKind::Spawned { .. } | SimEventKind::Despawned { .. } => description.blue(),
        SimEventKind::SpawnFailed { .. } => description.dimmed(),
        SimEventKind::GuideSpoke { .. } => description.magenta(),
    }
}

fn format_vital_bar(reading: &VitalReading) -> String {
    let fraction = (reading.current / reading.max).clamp(0.0, 1.0);
    let filled = (fraction * 10.0).round() as usize;
    let empty = 10_usize.saturating_sub(filled);
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(empty));
    let value = format!("{:>3.0}/{:.0}", reading.current, reading.max);

    if reading.warning {
        format!("[{}] {value}", bar.red())
    } else if fraction <= 0.5 {
        format!("[{}] {value}", bar.yellow())
    } else {
        format!("[{}] {value}", bar.green())
    }
}
