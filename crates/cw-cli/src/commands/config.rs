use std::path::Path;

use cw_simulation::SimConfig;

pub fn run(output: Option<&Path>) -> Result<(), String> {
    let json = SimConfig::default()
        .to_json_pretty()
        .map_err(|e| e.to_string())?;

    match output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
            eprintln!("  Wrote default configuration to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
