//! Settings
//!
//! Every tunable of a run. Deserializes from TOML with a default for each
//! field so a minimal file only needs the account block.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::CandidateCatalog;
use crate::domain::Region;
use crate::services::region::RegionTable;

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub household: HouseholdConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub regions: RegionTable,
    /// Replaces the built-in candidate lists when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CandidateCatalog>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Settings {
    pub fn catalog(&self) -> CandidateCatalog {
        self.catalog.clone().unwrap_or_default()
    }

    /// Cross-field checks serde cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.account.customer_id.trim().is_empty() {
            return Err("account.customer_id is required".to_string());
        }
        if self.history.alert_threshold == 0 {
            return Err("history.alert_threshold must be at least 1".to_string());
        }
        if self.network.reachable_statuses.is_empty() {
            return Err("network.reachable_statuses must not be empty".to_string());
        }
        if let Some(catalog) = &self.catalog {
            catalog.validate()?;
        }
        Ok(())
    }
}

/// Portal account
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub customer_id: String,
    /// Skip prefix detection and use this region first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
}

impl AccountConfig {
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountConfig")
            .field("username", &self.username)
            .field("password", &"********")
            .field("customer_id", &self.customer_id)
            .field("region", &self.region)
            .finish()
    }
}

/// Household profile used for documents that carry no portal data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HouseholdConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meter_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Tariff and synthetic series parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// VND per kWh
    #[serde(default = "default_unit_price")]
    pub unit_price: f64,
    /// Multiplier for weather load (1.2 = hot season)
    #[serde(default = "default_seasonal_factor")]
    pub seasonal_factor: f64,
    #[serde(default = "default_synthetic_days")]
    pub synthetic_days: u32,
    /// Seed for reproducible jitter; entropy when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter_seed: Option<u64>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            unit_price: default_unit_price(),
            seasonal_factor: default_seasonal_factor(),
            synthetic_days: default_synthetic_days(),
            jitter_seed: None,
        }
    }
}

/// HTTP bounds and reachability policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    #[serde(default = "default_login_timeout_secs")]
    pub login_timeout_secs: u64,
    #[serde(default = "default_data_timeout_secs")]
    pub data_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Probe statuses meaning "the server is alive"
    #[serde(default = "default_reachable_statuses")]
    pub reachable_statuses: Vec<u16>,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

impl NetworkConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    pub fn data_timeout(&self) -> Duration {
        Duration::from_secs(self.data_timeout_secs)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            probe_timeout_secs: default_probe_timeout_secs(),
            login_timeout_secs: default_login_timeout_secs(),
            data_timeout_secs: default_data_timeout_secs(),
            user_agent: default_user_agent(),
            reachable_statuses: default_reachable_statuses(),
            lookback_days: default_lookback_days(),
        }
    }
}

/// Cron-mode files and thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: usize,
    /// How many trailing log lines the streak scan reads
    #[serde(default = "default_scan_lines")]
    pub scan_lines: usize,
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,
}

impl HistoryConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_days * 24 * 60 * 60)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            log_path: default_log_path(),
            retention_days: default_retention_days(),
            alert_threshold: default_alert_threshold(),
            scan_lines: default_scan_lines(),
            run_timeout_secs: default_run_timeout_secs(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_unit_price() -> f64 {
    2750.0
}

fn default_seasonal_factor() -> f64 {
    1.2
}

fn default_synthetic_days() -> u32 {
    7
}

fn default_probe_timeout_secs() -> u64 {
    10
}

fn default_login_timeout_secs() -> u64 {
    15
}

fn default_data_timeout_secs() -> u64 {
    20
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_reachable_statuses() -> Vec<u16> {
    vec![200, 301, 302, 403, 404]
}

fn default_lookback_days() -> u32 {
    30
}

fn default_output_path() -> PathBuf {
    PathBuf::from("evn_daily_data.json")
}

fn default_log_path() -> PathBuf {
    PathBuf::from("evn_daily.log")
}

fn default_retention_days() -> u64 {
    7
}

fn default_alert_threshold() -> usize {
    3
}

fn default_scan_lines() -> usize {
    50
}

fn default_run_timeout_secs() -> u64 {
    300
}
