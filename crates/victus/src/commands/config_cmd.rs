//! Config subcommand handlers.

use dialoguer::Input;
use victus_config::{Config, DEFAULT_PROFILE, Profile};
use victus_core::config::DEFAULT_API_URL;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::active_profile;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn save(cfg: &Config) -> Result<(), CliError> {
    victus_config::save_config(cfg, &victus_config::config_path())?;
    Ok(())
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be a positive number".into(),
    })
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Apply one `config set` assignment to a profile.
fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key.replace('-', "_").as_str() {
        "api_url" => profile.api_url = value,
        "stream_url" => profile.stream_url = non_empty(value),
        "subscription_key_env" => profile.subscription_key_env = non_empty(value),
        "timeout" => profile.timeout = Some(parse_number("timeout", &value)?),
        "retry_interval" => profile.retry_interval = Some(parse_number("retry_interval", &value)?),
        "page_size" => profile.page_size = Some(parse_number("page_size", &value)?),
        "optimistic_updates" => {
            profile.optimistic_updates =
                Some(value.parse().map_err(|_| CliError::Validation {
                    field: "optimistic_updates".into(),
                    reason: "must be 'true' or 'false'".into(),
                })?);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: api_url, stream_url, \
                     subscription_key_env, timeout, retry_interval, page_size, optimistic_updates"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = victus_config::config_path();
            eprintln!("victus: configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default(DEFAULT_PROFILE.into())
                .interact_text()
                .map_err(prompt_err)?;

            let api_url: String = Input::new()
                .with_prompt("Catalog API URL")
                .default(DEFAULT_API_URL.into())
                .interact_text()
                .map_err(prompt_err)?;

            let stream_url: String = Input::new()
                .with_prompt("Event-stream URL (empty: same as API)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            let key_env: String = Input::new()
                .with_prompt("Env var holding the subscription key (empty: none)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            let profile = Profile {
                api_url,
                stream_url: non_empty(stream_url),
                subscription_key_env: non_empty(key_env),
                ..Profile::default()
            };

            let mut cfg = victus_config::load_config()?;
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            save(&cfg)?;

            eprintln!("\nConfiguration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: victus departments list");
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(
                &victus_config::config_path().display().to_string(),
                global.quiet,
            );
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = victus_config::load_config()?;
            output::print_output(&victus_config::render_redacted(&cfg)?, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = victus_config::load_config()?;
            let default = cfg.default_profile.as_deref().unwrap_or(DEFAULT_PROFILE);
            let lines: Vec<String> = cfg
                .profiles
                .keys()
                .map(|name| {
                    if name == default {
                        format!("* {name}")
                    } else {
                        format!("  {name}")
                    }
                })
                .collect();
            output::print_output(&lines.join("\n"), global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = victus_config::load_config()?;
            let name = match active_profile(global, &cfg) {
                Ok((name, _)) | Err(CliError::ProfileNotFound { name, .. }) => name,
                Err(other) => return Err(other),
            };
            let profile = cfg
                .profiles
                .entry(name.clone())
                .or_insert_with(Profile::local);
            set_key(profile, &key, value)?;
            save(&cfg)?;
            output::notice(&format!("Updated '{key}' on profile '{name}'"), global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = victus_config::load_config()?;
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", "),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            save(&cfg)?;
            output::notice(&format!("Default profile: {name}"), global.quiet);
            Ok(())
        }
    }
}
