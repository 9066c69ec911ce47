//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use guardly_config::ConfigError;
use guardly_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const UNSUPPORTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach AdGuard Home: {message}")]
    #[diagnostic(
        code(guardly::connection_failed),
        help(
            "Check that the server is running and the URL points at the web interface.\n\
             Try: guardly status --url http://192.168.1.2:3000"
        )
    )]
    ConnectionFailed { message: String },

    #[error("Not connected to the server")]
    #[diagnostic(code(guardly::disconnected))]
    Disconnected,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(guardly::auth_failed),
        help(
            "Verify the web interface username and password.\n\
             Run: guardly config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(guardly::no_credentials),
        help(
            "Store one with: guardly config set-password --profile {profile}\n\
             Or set the GUARDLY_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(guardly::not_found),
        help("Run: guardly {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Server ───────────────────────────────────────────────────────
    #[error("Server rejected the request (HTTP {status}): {body}")]
    #[diagnostic(code(guardly::remote))]
    Remote { status: u16, body: String },

    #[error("Malformed response: {message}")]
    #[diagnostic(code(guardly::data))]
    Data { message: String },

    #[error("'{operation}' is not supported by this server")]
    #[diagnostic(
        code(guardly::unsupported),
        help("Requires {capability}. Run: guardly capabilities")
    )]
    Unsupported {
        operation: String,
        capability: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(guardly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(guardly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: guardly config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(guardly::no_config),
        help(
            "Create a profile with: guardly config init\n\
             Or pass --url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(guardly::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(guardly::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(guardly::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Disconnected => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Unsupported { .. } => exit_code::UNSUPPORTED,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

/// Command that lists an entity type, for not-found hints.
fn list_command(entity_type: &str) -> String {
    match entity_type {
        "client" => "clients list".into(),
        "filter list" => "filters list".into(),
        "rewrite" => "rewrites list".into(),
        "blocked service" => "blocked global".into(),
        other => format!("{other}s list"),
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationRequired { message } => CliError::AuthFailed { message },
            CoreError::Unsupported {
                operation,
                capability,
            } => CliError::Unsupported {
                operation,
                capability,
            },
            CoreError::Transient { message } => CliError::ConnectionFailed { message },
            CoreError::ControllerDisconnected => CliError::Disconnected,
            CoreError::Remote { status, body } => CliError::Remote { status, body },
            CoreError::Data { message } => CliError::Data { message },
            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: list_command(&entity_type),
                resource_type: entity_type,
                identifier,
            },
            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                available: "(none)".into(),
            },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
