//! CLI configuration: thin wrapper around `victus_config` shared types.
//!
//! Adds CLI-specific resolution that respects `GlobalOpts` flag
//! overrides (--api-url, --subscription-key, etc.).

use secrecy::SecretString;

use victus_config::{Config, ConfigError, Profile};
use victus_core::CatalogConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile from flags and config.
///
/// An unknown profile is tolerated when `--api-url` is given: the flags
/// alone then describe the backend.
pub fn active_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    match config.profile(global.profile.as_deref()) {
        Ok(found) => Ok(found),
        Err(ConfigError::UnknownProfile { name }) if global.api_url.is_some() => {
            Ok((name, Profile::default()))
        }
        Err(ConfigError::UnknownProfile { name }) => Err(CliError::ProfileNotFound {
            name,
            available: available_profiles(config),
        }),
        Err(other) => Err(other.into()),
    }
}

fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Build a `CatalogConfig` from the config file, profile, and CLI overrides.
///
/// CLI flag overrides take priority over profile values.
pub fn build_catalog_config(global: &GlobalOpts) -> Result<CatalogConfig, CliError> {
    let config = victus_config::load_config()?;
    let (name, mut profile) = active_profile(global, &config)?;

    // 1. URLs (flag > env > profile)
    if let Some(ref api_url) = global.api_url {
        profile.api_url.clone_from(api_url);
    }
    if let Some(ref stream_url) = global.stream_url {
        profile.stream_url = Some(stream_url.clone());
    }

    // 2. Timeout
    if let Some(timeout) = global.timeout {
        if timeout == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        profile.timeout = Some(timeout);
    }

    let mut catalog = victus_config::profile_to_catalog_config(&profile, &name, &config.defaults)?;

    // 3. Subscription key flag wins over the profile's
    if let Some(ref key) = global.subscription_key {
        catalog.subscription_key = Some(SecretString::from(key.clone()));
    }

    tracing::debug!(
        profile = %name,
        api_url = %catalog.api_url,
        timeout_s = catalog.timeout.as_secs(),
        "resolved catalog config"
    );
    Ok(catalog)
}
