//! # Application Configuration
//!
//! YAML-based configuration with schema validation.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Root configuration for the reminder service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub store: StoreConfig,
    pub mail: MailConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub app: AppConfig,
}

/// Entry store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Path of the CSV file holding the reminder entries
    pub csv_path: String,
}

/// Mail relay configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    pub service_url: String,
    #[serde(default)]
    pub origin_address: Option<String>,
    #[serde(default)]
    pub origin_name: Option<String>,
}

/// Scheduling configuration for the daemon binary
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,
}

/// Application-level settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default = "default_retention")]
    pub retention: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_interval() -> String {
    "1h".to_string()
}

fn default_run_on_startup() -> bool {
    true
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

fn default_retention() -> String {
    "24h".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            interval: default_interval(),
            run_on_startup: default_run_on_startup(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            time_zone: default_time_zone(),
            retention: default_retention(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// When no path is given, `CONFIG_PATH` is consulted before falling
    /// back to `./config.yaml`.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_string(),
            None => env::var("CONFIG_PATH").unwrap_or_else(|_| "./config.yaml".to_string()),
        };

        let contents = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {path}: {e}"))?;
        let config: Config = serde_yaml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("failed to parse config file {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate that all required fields are present and parseable
    pub fn validate(&self) -> Result<()> {
        if self.store.csv_path.is_empty() {
            return Err(anyhow::anyhow!("store.csv_path is required"));
        }
        if self.mail.service_url.is_empty() {
            return Err(anyhow::anyhow!("mail.service_url is required"));
        }
        // Mail origin can come from env vars or config
        if self.mail.origin_address().is_none() {
            return Err(anyhow::anyhow!(
                "mail.origin_address is required (via config or MAIL_ORIGIN_ADDRESS env var)"
            ));
        }
        if self.mail.origin_name().is_none() {
            return Err(anyhow::anyhow!(
                "mail.origin_name is required (via config or MAIL_ORIGIN_NAME env var)"
            ));
        }

        // Validate duration formats
        if parse_duration(&self.schedule.interval).is_none() {
            return Err(anyhow::anyhow!(
                "invalid schedule.interval: {}",
                self.schedule.interval
            ));
        }
        if parse_duration(&self.app.retention).is_none() {
            return Err(anyhow::anyhow!(
                "invalid app.retention: {}",
                self.app.retention
            ));
        }

        // Validate the IANA time zone identifier
        self.time_zone()?;

        Ok(())
    }

    /// The configured IANA time zone
    pub fn time_zone(&self) -> Result<Tz> {
        self.app
            .time_zone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("invalid app.time_zone {}: {e}", self.app.time_zone))
    }

    /// Retention window for processed entries
    pub fn retention(&self) -> Result<chrono::Duration> {
        let seconds = parse_duration(&self.app.retention)
            .ok_or_else(|| anyhow::anyhow!("invalid app.retention: {}", self.app.retention))?;
        Ok(chrono::Duration::seconds(seconds))
    }

    /// Interval between two daemon runs
    pub fn interval(&self) -> Result<Duration> {
        let seconds = parse_duration(&self.schedule.interval).ok_or_else(|| {
            anyhow::anyhow!("invalid schedule.interval: {}", self.schedule.interval)
        })?;
        Ok(Duration::from_secs(seconds as u64))
    }
}

impl MailConfig {
    /// Mail origin address; the environment variable takes precedence
    /// over the config file.
    pub fn origin_address(&self) -> Option<String> {
        env::var("MAIL_ORIGIN_ADDRESS")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.origin_address.clone().filter(|v| !v.is_empty()))
    }

    /// Mail origin display name; the environment variable takes precedence
    /// over the config file.
    pub fn origin_name(&self) -> Option<String> {
        env::var("MAIL_ORIGIN_NAME")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.origin_name.clone().filter(|v| !v.is_empty()))
    }
}

/// Parse a duration string like "30s", "2h", "1d", "1h30m" into seconds
pub fn parse_duration(time_str: &str) -> Option<i64> {
    let time_str = time_str.trim().to_lowercase();
    let mut total_seconds: i64 = 0;
    let mut current_number = String::new();

    for c in time_str.chars() {
        if c.is_ascii_digit() {
            current_number.push(c);
        } else if !current_number.is_empty() {
            let value: i64 = current_number.parse().ok()?;
            current_number.clear();

            let seconds = match c {
                's' => value,
                'm' => value * 60,
                'h' => value * 60 * 60,
                'd' => value * 60 * 60 * 24,
                'w' => value * 60 * 60 * 24 * 7,
                _ => return None,
            };
            total_seconds += seconds;
        } else {
            return None;
        }
    }

    // a bare trailing number has no unit
    if !current_number.is_empty() {
        return None;
    }

    if total_seconds > 0 {
        Some(total_seconds)
    } else {
        None
    }
}
