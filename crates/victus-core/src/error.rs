// ── Core error types ──
//
// Errors surfaced by the catalog store. Transport failures (no response)
// and remote failures (non-2xx) stay distinct so views can word them
// differently. `Clone` so a shared hydration outcome can be handed to
// every waiter.

use thiserror::Error;

use crate::model::CatalogKind;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Transport ────────────────────────────────────────────────────
    /// The request never got a response.
    #[error("Catalog service unreachable: {message}")]
    Transport { message: String, timeout: bool },

    // ── Remote ───────────────────────────────────────────────────────
    /// The server answered with a non-2xx status.
    #[error("Catalog service rejected the request (HTTP {status}): {message}")]
    Remote {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// A successful response whose body could not be interpreted.
    #[error("Unexpected response from catalog service: {message}")]
    InvalidResponse { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{kind} not found: {id}")]
    NotFound { kind: CatalogKind, id: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    // ── Lifecycle ────────────────────────────────────────────────────
    /// The store was shut down while the operation was in flight.
    #[error("Catalog store has been shut down")]
    Shutdown,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// HTTP status of a remote failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-provided error code, if any.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Remote { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<victus_api::Error> for CoreError {
    fn from(err: victus_api::Error) -> Self {
        match err {
            victus_api::Error::Transport(e) => {
                // A body that arrived but failed to decode is a bad response,
                // not a missing one.
                if e.is_decode() {
                    CoreError::InvalidResponse {
                        message: e.to_string(),
                    }
                } else {
                    CoreError::Transport {
                        timeout: e.is_timeout(),
                        message: e.to_string(),
                    }
                }
            }
            victus_api::Error::Remote {
                status,
                code,
                message,
            } => CoreError::Remote {
                status,
                code,
                message,
            },
            victus_api::Error::Deserialization { message, body: _ } => {
                CoreError::InvalidResponse { message }
            }
            victus_api::Error::StreamConnect(reason) => CoreError::Transport {
                message: format!("event stream: {reason}"),
                timeout: false,
            },
            victus_api::Error::EventParse { message } => CoreError::InvalidResponse { message },
            victus_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            victus_api::Error::ClientBuild(message) => CoreError::Config { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_keeps_status_and_code() {
        let err = CoreError::from(victus_api::Error::Remote {
            status: 422,
            code: Some("CIUDAD_INVALIDA".into()),
            message: "La ciudad no pertenece al departamento".into(),
        });
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.api_error_code(), Some("CIUDAD_INVALIDA"));
        assert!(!err.is_transport());
    }

    #[test]
    fn stream_connect_is_transport() {
        let err = CoreError::from(victus_api::Error::StreamConnect("HTTP 503".into()));
        assert!(err.is_transport());
    }

    #[test]
    fn deserialization_is_invalid_response() {
        let err = CoreError::from(victus_api::Error::Deserialization {
            message: "expected value".into(),
            body: "<html>".into(),
        });
        assert!(matches!(err, CoreError::InvalidResponse { .. }));
    }
}
