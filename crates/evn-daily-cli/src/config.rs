//! Configuration loading for the evn-daily CLI
//!
//! Settings come from ~/.config/evn-daily/config.toml (or `--config`),
//! then `.env`, then `EVN_*` environment variables.

use anyhow::{bail, Context, Result};
use evn_daily::{Region, Settings};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = "evn-daily";
const CONFIG_FILE: &str = "config.toml";

pub const ENV_USERNAME: &str = "EVN_USERNAME";
pub const ENV_PASSWORD: &str = "EVN_PASSWORD";
pub const ENV_CUSTOMER_ID: &str = "EVN_CUSTOMER_ID";
pub const ENV_REGION: &str = "EVN_REGION";
pub const ENV_OUTPUT: &str = "EVN_OUTPUT";
pub const ENV_LOG_FILE: &str = "EVN_LOG_FILE";

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join(CONFIG_DIR);
    Ok(config_dir)
}

/// Get the default config file path
pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Settings plus the file they were read from, if any
pub struct LoadedSettings {
    pub settings: Settings,
    pub source: Option<PathBuf>,
}

/// Load settings with every override applied.
///
/// An explicit path must exist; a missing default file means defaults.
pub fn load(explicit: Option<&Path>) -> Result<LoadedSettings> {
    let (mut settings, source) = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("Config file {:?} does not exist", path);
            }
            (read_file(path)?, Some(path.to_path_buf()))
        }
        None => {
            let path = default_config_path()?;
            if path.exists() {
                (read_file(&path)?, Some(path))
            } else {
                (Settings::default(), None)
            }
        }
    };

    // A missing .env is fine
    let _ = dotenvy::dotenv();
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;

    Ok(LoadedSettings { settings, source })
}

fn read_file(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {:?}", path))?;
    parse(&content).with_context(|| format!("Failed to parse config file {:?}", path))
}

pub fn parse(content: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(content)?;
    Ok(settings)
}

/// Apply `EVN_*` variables; empty values are ignored
pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(username) = var(ENV_USERNAME) {
        settings.account.username = username;
    }
    if let Some(password) = var(ENV_PASSWORD) {
        settings.account.password = password;
    }
    if let Some(customer_id) = var(ENV_CUSTOMER_ID) {
        settings.account.customer_id = customer_id.trim().to_string();
    }
    if let Some(region) = var(ENV_REGION) {
        let region: Region = region
            .parse()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Invalid {}", ENV_REGION))?;
        settings.account.region = Some(region);
    }
    if let Some(output) = var(ENV_OUTPUT) {
        settings.history.output_path = PathBuf::from(output);
    }
    if let Some(log_file) = var(ENV_LOG_FILE) {
        settings.history.log_path = PathBuf::from(log_file);
    }

    Ok(())
}
