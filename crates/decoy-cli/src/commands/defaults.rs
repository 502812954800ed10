use anyhow::{Context, Result};
use decoy_core::EngineConfig;

/// Prints the default configuration, suitable as a starting config file.
pub fn print() -> Result<()> {
    let text = toml::to_string_pretty(&EngineConfig::default())
        .context("Failed to render default configuration")?;
    println!("{text}");
    Ok(())
}
