//! # Application Wiring
//!
//! Builds the lifecycle engine and its collaborators from configuration.
//! Both binaries go through [`build_engine`] so they agree on the store,
//! notifier and clock being used.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{Context as _, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::core::Config;
use crate::features::entries::CsvEntryStore;
use crate::features::lifecycle::{LifecycleEngine, SystemClock};
use crate::features::notify::{EmailNotifier, MailClient};

/// Timeout for the mail relay health probe at daemon startup
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Wire up the engine from a validated configuration.
///
/// Returns the engine together with the notifier so the daemon can
/// probe the mail relay before scheduling runs.
pub fn build_engine(config: &Config) -> Result<(LifecycleEngine, Arc<EmailNotifier>)> {
    let zone = config.time_zone()?;
    let retention = config.retention()?;

    let store = Arc::new(CsvEntryStore::new(&config.store.csv_path, zone));

    let client = MailClient::new(&config.mail.service_url, None)
        .context("failed to build mail client")?;
    let origin_address = config
        .mail
        .origin_address()
        .context("mail.origin_address is required")?;
    let origin_name = config
        .mail
        .origin_name()
        .context("mail.origin_name is required")?;
    let notifier = Arc::new(EmailNotifier::new(
        Arc::new(client),
        origin_address,
        origin_name,
    ));

    let engine = LifecycleEngine::new(
        store,
        notifier.clone(),
        Arc::new(SystemClock),
        zone,
        retention,
    );

    Ok((engine, notifier))
}

/// Initialize logging from the configured level, honoring `RUST_LOG`
/// when set.
pub fn init_logging(config: &Config) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.app.log_level),
    )
    .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        serde_yaml::from_str(
            r#"
store:
  csv_path: reminders.csv
mail:
  service_url: http://localhost:8080
  origin_address: bot@example.com
  origin_name: Reminder Bot
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_build_engine_from_valid_config() {
        assert!(build_engine(&config()).is_ok());
    }

    #[test]
    fn test_build_engine_rejects_bad_time_zone() {
        let mut config = config();
        config.app.time_zone = "Mars/Olympus".to_string();
        assert!(build_engine(&config).is_err());
    }
}
