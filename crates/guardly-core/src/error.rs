// ── Core error types ──
//
// The failure taxonomy consumers see: authentication, unsupported,
// transient, remote and data errors, plus lookup and lifecycle failures.
// The `From<guardly_api::Error>` impl performs the classification.

use thiserror::Error;

use crate::capability::Capability;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Authentication ───────────────────────────────────────────────
    /// Credentials were rejected. Polling is suspended until new
    /// credentials are supplied.
    #[error("Authentication required: {message}")]
    AuthenticationRequired { message: String },

    // ── Capability ───────────────────────────────────────────────────
    #[error("Operation not supported: {operation} (requires {capability})")]
    Unsupported {
        operation: String,
        capability: String,
    },

    // ── Connectivity ─────────────────────────────────────────────────
    #[error("Server unreachable: {message}")]
    Transient { message: String },

    #[error("Controller disconnected")]
    ControllerDisconnected,

    // ── Remote & data ────────────────────────────────────────────────
    #[error("Server rejected the request (HTTP {status}): {body}")]
    Remote { status: u16, body: String },

    #[error("Malformed response: {message}")]
    Data { message: String },

    #[error("Entity not found: {entity_type} {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Caller errors ────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub(crate) fn unsupported(operation: &str, capability: Capability) -> Self {
        Self::Unsupported {
            operation: operation.to_owned(),
            capability: capability.to_string(),
        }
    }

    pub(crate) fn not_found(entity_type: &str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_owned(),
            identifier: identifier.into(),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthenticationRequired { .. })
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<guardly_api::Error> for CoreError {
    fn from(err: guardly_api::Error) -> Self {
        match err {
            guardly_api::Error::Authentication { status } => CoreError::AuthenticationRequired {
                message: format!("server answered HTTP {status}"),
            },
            guardly_api::Error::Transport(ref e) => CoreError::Transient {
                message: e.to_string(),
            },
            guardly_api::Error::Timeout { timeout_secs } => CoreError::Transient {
                message: format!("request timed out after {timeout_secs}s"),
            },
            guardly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            guardly_api::Error::Tls(message) => CoreError::Config { message },
            guardly_api::Error::Unsupported { path, .. } => CoreError::Unsupported {
                operation: path.to_owned(),
                capability: Capability::for_path(path)
                    .map_or_else(|| "a newer server version".into(), |c| c.to_string()),
            },
            guardly_api::Error::Remote { status, body } => CoreError::Remote { status, body },
            guardly_api::Error::Deserialization { message, body: _ } => {
                CoreError::Data { message }
            }
            guardly_api::Error::Encode(e) => CoreError::Data {
                message: format!("failed to encode request: {e}"),
            },
        }
    }
}
