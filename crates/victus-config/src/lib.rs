//! Shared configuration for the Victus catalog tools.
//!
//! TOML profiles, subscription-key resolution (env + plaintext), and
//! translation to `victus_core::CatalogConfig`. The CLI layers its
//! `GlobalOpts` overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use victus_api::ReconnectConfig;
use victus_core::CatalogConfig;
use victus_core::config::DEFAULT_API_URL;

/// Prefix of environment variables merged over the config file.
pub const ENV_PREFIX: &str = "VICTUS_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("environment variable {var} named by profile '{profile}' is not set")]
    MissingSecret { profile: String, var: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named catalog profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_retry_interval")]
    pub retry_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            retry_interval: default_retry_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_retry_interval() -> u64 {
    5
}

/// A named catalog backend profile.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Profile {
    /// REST base URL (e.g. "http://localhost:8081/uco-challenge/api/v1").
    pub api_url: String,

    /// Event-stream base URL, when it differs from `api_url`.
    pub stream_url: Option<String>,

    /// Gateway subscription key (plaintext, prefer the env variant).
    pub subscription_key: Option<String>,

    /// Environment variable name holding the subscription key.
    pub subscription_key_env: Option<String>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    /// Seconds between hydration retries while degraded.
    pub retry_interval: Option<u64>,

    /// First event-stream reconnect delay, in milliseconds.
    pub reconnect_initial_ms: Option<u64>,

    /// Reconnect delay cap, in milliseconds.
    pub reconnect_max_ms: Option<u64>,

    /// Give up reconnecting after this many attempts. Unset retries forever.
    pub reconnect_max_retries: Option<u32>,

    /// Page size for the residential complex listing.
    pub page_size: Option<u32>,

    /// Merge mutation results before the server event arrives.
    pub optimistic_updates: Option<bool>,
}

impl Profile {
    /// The profile used when no config file defines one.
    pub fn local() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            ..Self::default()
        }
    }
}

impl Config {
    /// Look up a profile by name, falling back to `default_profile`.
    ///
    /// With no profiles configured at all, the default name resolves to
    /// the built-in local profile.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or(DEFAULT_PROFILE)
            .to_owned();
        if let Some(profile) = self.profiles.get(&name) {
            return Ok((name, profile.clone()));
        }
        let default_name = self.default_profile.as_deref().unwrap_or(DEFAULT_PROFILE);
        if self.profiles.is_empty() && name == default_name {
            return Ok((name, Profile::local()));
        }
        Err(ConfigError::UnknownProfile { name })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("co", "victus", "victus").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("victus");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, merged with `VICTUS_` environment
/// variables. Nested keys use a double underscore:
/// `VICTUS_PROFILES__LOCAL__API_URL`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_config(cfg)?)?;
    Ok(())
}

/// TOML rendering of a config, with plaintext secrets masked.
pub fn render_redacted(cfg: &Config) -> Result<String, ConfigError> {
    let mut redacted = cfg.clone();
    for profile in redacted.profiles.values_mut() {
        if profile.subscription_key.is_some() {
            profile.subscription_key = Some("********".into());
        }
    }
    render_config(&redacted)
}

fn render_config(cfg: &Config) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(cfg)?)
}

// ── Secret resolution ───────────────────────────────────────────────

/// Resolve the subscription key: `subscription_key_env` first, then the
/// plaintext value. `Ok(None)` when the profile needs no key.
pub fn resolve_subscription_key(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<SecretString>, ConfigError> {
    if let Some(ref var) = profile.subscription_key_env {
        return match std::env::var(var) {
            Ok(val) if !val.is_empty() => Ok(Some(SecretString::from(val))),
            _ if profile.subscription_key.is_some() => {
                Ok(profile.subscription_key.clone().map(SecretString::from))
            }
            _ => Err(ConfigError::MissingSecret {
                profile: profile_name.into(),
                var: var.clone(),
            }),
        };
    }
    Ok(profile.subscription_key.clone().map(SecretString::from))
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `CatalogConfig` from a profile. No CLI flag overrides.
pub fn profile_to_catalog_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<CatalogConfig, ConfigError> {
    validate_url("api_url", &profile.api_url)?;
    if let Some(ref stream_url) = profile.stream_url {
        validate_url("stream_url", stream_url)?;
    }

    let mut reconnect = ReconnectConfig::default();
    if let Some(ms) = profile.reconnect_initial_ms {
        reconnect.initial_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = profile.reconnect_max_ms {
        reconnect.max_delay = Duration::from_millis(ms);
    }
    if reconnect.max_delay < reconnect.initial_delay {
        return Err(ConfigError::Validation {
            field: "reconnect_max_ms".into(),
            reason: "must not be lower than reconnect_initial_ms".into(),
        });
    }
    reconnect.max_retries = profile.reconnect_max_retries;

    if profile.page_size == Some(0) {
        return Err(ConfigError::Validation {
            field: "page_size".into(),
            reason: "must be positive".into(),
        });
    }

    Ok(CatalogConfig {
        api_url: profile.api_url.clone(),
        stream_url: profile.stream_url.clone(),
        subscription_key: resolve_subscription_key(profile, profile_name)?,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        reconnect,
        retry_interval: Duration::from_secs(profile.retry_interval.unwrap_or(defaults.retry_interval)),
        optimistic_updates: profile.optimistic_updates.unwrap_or(true),
        page_size: profile.page_size,
    })
}

fn validate_url(field: &str, raw: &str) -> Result<(), ConfigError> {
    match url::Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("invalid URL: {raw}"),
        }),
    }
}
