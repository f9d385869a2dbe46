//! Engine configuration commands (show, path)

use std::path::Path;

use anyhow::Result;
use pathwise_core::config::{default_config_path, resolve_config_path};

use super::{load_config, print_json};

/// Print the effective configuration
pub fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    print_json(&config)
}

/// Print where configuration is read from
pub fn cmd_config_path(config_path: Option<&Path>) -> Result<()> {
    match resolve_config_path(config_path) {
        Some(path) => println!("Using: {}", path.display()),
        None => println!("Using: built-in defaults"),
    }

    if let Some(path) = default_config_path() {
        println!("Override location: {}", path.display());
    }
    Ok(())
}
