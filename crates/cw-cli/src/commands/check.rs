use std::path::Path;

use colored::Colorize;

pub fn run(file: &Path) -> Result<(), String> {
    let config = super::load_config(file)?;
    config.validate().map_err(|e| e.to_string())?;

    println!(
        "  {} '{}'",
        "All checks passed for".green(),
        file.display()
    );
    println!(
        "  {} days of {}s, island '{}' with {} obstacles",
        config.clock.max_days,
        config.clock.cycle_duration,
        config.island.name,
        config.island.obstacles.len()
    );
    println!(
        "  spawners: {} (capacity {}), {} (capacity {})",
        config.resources.name,
        config.resources.capacity,
        config.threats.name,
        config.threats.capacity
    );
    println!(
        "  fixtures: {} beds, {} water sources, {} guides",
        config.interactions.beds.len(),
        config.interactions.water_sources.len(),
        config.interactions.guides.len()
    );
    Ok(())
}
