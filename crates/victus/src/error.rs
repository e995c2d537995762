//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use victus_config::ConfigError;
use victus_core::{CoreError, user_message};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the catalog service: {reason}")]
    #[diagnostic(
        code(victus::connection_failed),
        help(
            "{advice}\n\
             Check that the catalog API is running and that --api-url points at it.\n\
             Try: victus config show"
        )
    )]
    ConnectionFailed { reason: String, advice: String },

    #[error("Request to the catalog service timed out")]
    #[diagnostic(
        code(victus::timeout),
        help("Increase the timeout with --timeout or check the service's responsiveness.")
    )]
    Timeout { reason: String },

    // ── Remote rejections ────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(victus::not_found), help("Run: victus {list_command} to see what exists"))]
    NotFound {
        message: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(code(victus::conflict))]
    Conflict { message: String },

    #[error("{message} (HTTP {status})")]
    #[diagnostic(code(victus::api_error), help("Server said: {detail}"))]
    Api {
        status: u16,
        message: String,
        detail: String,
    },

    #[error("Unexpected response from the catalog service: {message}")]
    #[diagnostic(code(victus::invalid_response))]
    InvalidResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(victus::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(victus::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: victus config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {source}")]
    #[diagnostic(code(victus::config), help("Config file: {path}"))]
    Config {
        #[source]
        source: ConfigError,
        path: String,
    },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(victus::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(victus::internal))]
    Internal { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON rendering failed: {0}")]
    #[diagnostic(code(victus::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    #[diagnostic(code(victus::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the list command that shows the resource a 404 refers to.
    pub fn with_list_command(self, command: &str) -> Self {
        match self {
            Self::NotFound { message, .. } => Self::NotFound {
                message,
                list_command: command.into(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = user_message(&err);
        match err {
            CoreError::Transport { timeout: true, message: reason } => CliError::Timeout { reason },
            CoreError::Transport { message: reason, .. } => CliError::ConnectionFailed {
                reason,
                advice: message,
            },
            CoreError::Remote { status: 404, .. } | CoreError::NotFound { .. } => {
                CliError::NotFound {
                    message,
                    list_command: "--help".into(),
                }
            }
            CoreError::Remote { status: 409, .. } => CliError::Conflict { message },
            CoreError::Remote {
                status,
                message: detail,
                ..
            } => CliError::Api {
                status,
                message,
                detail,
            },
            CoreError::Validation { message: reason } => CliError::Validation {
                field: "input".into(),
                reason,
            },
            CoreError::InvalidResponse { message } => CliError::InvalidResponse { message },
            CoreError::Config { message: reason } => CliError::Validation {
                field: "configuration".into(),
                reason,
            },
            CoreError::Shutdown | CoreError::Internal(_) => CliError::Internal { message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            source => CliError::Config {
                source,
                path: victus_config::config_path().display().to_string(),
            },
        }
    }
}
