// src/pipeline/validate.rs

use crate::error::Result;
use crate::models::Config;
use crate::utils::log::Logger;

/// Validate configuration and print the effective settings.
pub fn run_validate(config: &Config, logger: &Logger) -> Result<()> {
    logger.header("Validating configuration");

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    log::info!("✓ Config OK");
    logger.sub_item(&format!(
        "Target: {} ({:?} strategy)",
        config.target.url, config.target.strategy
    ));
    logger.sub_item(&format!("User agent: {}", config.fetcher.user_agent));
    logger.sub_item(&format!("Timeout: {}s", config.fetcher.timeout_secs));
    logger.sub_item(&format!(
        "Interval: {} min, {:?} runner",
        config.schedule.interval_minutes, config.schedule.runner
    ));
    logger.sub_item(&format!(
        "Janitor: keep {} files, {} days, every {} cycles",
        config.janitor.max_files, config.janitor.keep_days, config.janitor.every_cycles
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_and_broken() {
        let logger = Logger::console();
        assert!(run_validate(&Config::default(), &logger).is_ok());

        let mut config = Config::default();
        config.target.url = "not a url".into();
        assert!(run_validate(&config, &logger).is_err());
    }
}
