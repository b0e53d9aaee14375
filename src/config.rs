// Configuration management

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::AppConfig;

const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("promptsmith");

    fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

    Ok(config_dir)
}

pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

pub fn get_log_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("promptsmith.log"))
}

/// Load the user config, then apply environment overrides.
pub fn load_config() -> Result<AppConfig> {
    let config = load_config_from(&get_config_path()?)?;
    Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
}

/// Read a config file, writing the defaults there first if it does not exist.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        let default_config = AppConfig::default();
        save_config_to(path, &default_config)?;
        return Ok(default_config);
    }

    let contents = fs::read_to_string(path).context("Failed to read config file")?;

    let config: AppConfig = toml::from_str(&contents).context("Failed to parse config file")?;

    Ok(config)
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(path, contents).context("Failed to write config file")?;

    Ok(())
}

pub fn apply_env_overrides(
    mut config: AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> AppConfig {
    if let Some(model) = lookup("PROMPTSMITH_MODEL").filter(|v| !v.trim().is_empty()) {
        config.model = model;
    }
    if let Some(url) = lookup("PROMPTSMITH_API_BASE_URL").filter(|v| !v.trim().is_empty()) {
        config.api_base_url = url;
    }
    config
}

/// First non-empty API key from the environment.
pub fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_VARS
        .into_iter()
        .filter_map(|key| lookup(key))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

pub fn api_key() -> Option<String> {
    api_key_from(|key| std::env::var(key).ok())
}
