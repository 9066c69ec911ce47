use thiserror::Error;

/// Top-level error type for the `guardly-api` crate.
///
/// Every failure a `/control/*` call can produce: authentication,
/// transport, remote status classification, and body decoding.
/// `guardly-core` maps these into its error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The server rejected the credentials (HTTP 401) or the account lacks
    /// access (HTTP 403). Retrying with the same credentials will not help.
    #[error("Authentication failed (HTTP {status})")]
    Authentication { status: u16 },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, reset, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Remote status ───────────────────────────────────────────────
    /// A version-gated endpoint answered 404/405: this server predates it.
    #[error("{path} is not supported by this server (HTTP {status})")]
    Unsupported { path: &'static str, status: u16 },

    /// Any other non-success status. `body` is truncated for logging.
    #[error("Remote error (HTTP {status}): {body}")]
    Remote { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A request payload could not be encoded.
    #[error("Failed to encode request body: {0}")]
    Encode(serde_json::Error),
}

impl Error {
    /// Returns `true` if the credentials were rejected.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying on the
    /// next poll cycle.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout { .. })
    }

    /// Returns `true` if a gated endpoint is absent on this server.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Returns `true` if the server answered 404 on an ungated path.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Remote { status: 404, .. })
    }

    /// HTTP status attached to the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status }
            | Self::Unsupported { status, .. }
            | Self::Remote { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
