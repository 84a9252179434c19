//! Configuration validation
//!
//! Validates configuration at startup to catch misconfigurations early.

use anyhow::Result;
use exifdim_core::Config;

/// Validate configuration values
///
/// Hard errors come from `Config::validate`; risky but legal settings are
/// only logged.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.api_key().is_none() {
        tracing::warn!("API_KEY not set in production - the rewrite endpoint is open to anyone");
    }

    if config.request_timeout_secs() < 5 {
        tracing::warn!(
            request_timeout_secs = config.request_timeout_secs(),
            "REQUEST_TIMEOUT_SECS is very low - large uploads may time out while transcoding"
        );
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}
