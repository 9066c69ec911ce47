// ── Runtime connection configuration ──
//
// Describes how to reach one AdGuard Home instance and how hard to poll
// it. Carries credentials but never touches disk: `guardly-config`
// builds one of these and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// HTTP basic-auth credentials for the web interface account.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for one server.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Web interface root, e.g. `http://192.168.1.2:3000`.
    pub url: Url,
    /// `None` for installs without authentication.
    pub credentials: Option<Credentials>,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Time between poll cycles. Zero disables background polling.
    pub poll_interval: Duration,
    /// Upper bound on reads in flight during one cycle.
    pub max_concurrent_requests: usize,
    /// Query log entries fetched per cycle.
    pub query_log_limit: u32,
    /// Length of the derived top-N aggregates.
    pub top_n: usize,
}

impl ControllerConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
    pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 4;
    pub const DEFAULT_QUERY_LOG_LIMIT: u32 = 100;
    pub const DEFAULT_TOP_N: usize = 10;

    /// Defaults for everything but the URL.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            credentials: None,
            tls: TlsVerification::default(),
            timeout: Self::DEFAULT_TIMEOUT,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            max_concurrent_requests: Self::DEFAULT_MAX_CONCURRENT_REQUESTS,
            query_log_limit: Self::DEFAULT_QUERY_LOG_LIMIT,
            top_n: Self::DEFAULT_TOP_N,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: SecretString) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password,
        });
        self
    }
}
