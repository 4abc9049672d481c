use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<TrackerConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());

    let substituted = substitution::substitute_env_vars(&content)?;
    debug!("Environment variable substitution completed");

    let config: TrackerConfig = serde_yaml::from_str(&substituted)
        .with_context(|| "Failed to parse YAML configuration")?;

    info!("Configuration loaded successfully");
    Ok(config)
}

/// Load the config file if it exists, otherwise fall back to built-in defaults.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<TrackerConfig> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        info!(?path, "No configuration file found, using defaults");
        Ok(generate_default_config())
    }
}

#[instrument]
pub fn generate_default_config() -> TrackerConfig {
    TrackerConfig {
        tracker: TrackerSection::default(),
        store: StoreConfig::default(),
        catalog: CatalogConfig::default(),
        dates: DateConfig::default(),
        validation: EntryValidationConfig::default(),
        export: ExportConfig::default(),
    }
}

#[instrument]
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &TrackerConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}
