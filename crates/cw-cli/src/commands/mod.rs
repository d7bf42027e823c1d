pub mod autopilot;
pub mod check;
pub mod config;
pub mod simulate;

use std::path::Path;

use cw_simulation::SimConfig;

/// Read a (possibly partial) JSON configuration file.
fn load_config(path: &Path) -> Result<SimConfig, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    SimConfig::from_json_str(&text).map_err(|e| format!("{}: {e}", path.display()))
}

/// Load the configuration from `path`, or the defaults when no file is given.
fn config_or_default(path: Option<&Path>) -> Result<SimConfig, String> {
    match path {
        Some(path) => load_config(path),
        None => Ok(SimConfig::default()),
    }
}
