//! Configuration for the guardly CLI.
//!
//! TOML profiles, credential resolution (keyring + env + plaintext),
//! and translation to `guardly_core::ControllerConfig`. The CLI layers
//! its flag overrides on top of what this crate produces.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use guardly_core::{ControllerConfig, Credentials, TlsVerification};

const KEYRING_SERVICE: &str = "guardly";
const PASSWORD_ENV: &str = "GUARDLY_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

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
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into());
        self.profiles
            .get(&name)
            .map(|p| (name.clone(), p))
            .ok_or(ConfigError::UnknownProfile { profile: name })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Defaults {
    /// `table`, `json`, `json-compact`, `yaml` or `plain`.
    pub output: String,
    pub insecure: bool,
    /// Per-request timeout in seconds.
    pub timeout: u64,
    /// Seconds between poll cycles for long-running commands.
    pub poll_interval: u64,
    pub max_concurrent_requests: usize,
    pub query_log_limit: u32,
    pub top_n: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: "table".into(),
            insecure: false,
            timeout: ControllerConfig::DEFAULT_TIMEOUT.as_secs(),
            poll_interval: ControllerConfig::DEFAULT_POLL_INTERVAL.as_secs(),
            max_concurrent_requests: ControllerConfig::DEFAULT_MAX_CONCURRENT_REQUESTS,
            query_log_limit: ControllerConfig::DEFAULT_QUERY_LOG_LIMIT,
            top_n: ControllerConfig::DEFAULT_TOP_N,
        }
    }
}

/// A named server profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Web interface URL (e.g., "http://192.168.1.2:3000").
    pub url: String,

    pub username: Option<String>,

    /// Plaintext password. Prefer the keyring or `password_env`.
    pub password: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    pub insecure: Option<bool>,
    pub timeout: Option<u64>,
    pub poll_interval: Option<u64>,
    pub query_log_limit: Option<u32>,
    pub top_n: Option<usize>,
}

impl Profile {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "guardly", "guardly").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("guardly");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Loading & saving ────────────────────────────────────────────────

/// Load the full Config from the canonical file plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then `path` (if present), then `GUARDLY_`-prefixed env.
/// Nested keys use a double underscore: `GUARDLY_DEFAULTS__TIMEOUT=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("GUARDLY_").split("__").ignore(&["password"]))
        .extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML at the canonical path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password.expose_secret())?;
    Ok(())
}

/// Resolve a password: keyring, then `password_env`, then
/// `GUARDLY_PASSWORD`, then plaintext in the profile.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    if let Ok(pw) = keyring_entry(profile_name).and_then(|entry| entry.get_password()) {
        debug!(profile = profile_name, "password from keyring");
        return Some(SecretString::from(pw));
    }

    if let Some(pw) = profile
        .password_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok())
    {
        return Some(SecretString::from(pw));
    }

    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Some(SecretString::from(pw));
    }

    profile.password.clone().map(SecretString::from)
}

/// Basic-auth credentials for a profile. `None` when no username is
/// configured (installs without authentication).
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<Credentials>, ConfigError> {
    let Some(username) = profile.username.clone() else {
        return Ok(None);
    };
    let password =
        resolve_password(profile, profile_name).ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;
    Ok(Some(Credentials { username, password }))
}

/// Build a `ControllerConfig` from a profile, filling gaps from `defaults`.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    let url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "url".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = ControllerConfig::new(url);
    config.credentials = resolve_credentials(profile, profile_name)?;
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.poll_interval =
        Duration::from_secs(profile.poll_interval.unwrap_or(defaults.poll_interval));
    config.max_concurrent_requests = defaults.max_concurrent_requests.max(1);
    config.query_log_limit = profile.query_log_limit.unwrap_or(defaults.query_log_limit);
    config.top_n = profile.top_n.unwrap_or(defaults.top_n);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn file_then_env_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    default_profile = "home"

                    [defaults]
                    timeout = 10

                    [profiles.home]
                    url = "http://192.168.1.2:3000"
                    username = "admin"
                "#,
            )?;
            jail.set_env("GUARDLY_DEFAULTS__TOP_N", "5");

            let config = load_config_from(Path::new("config.toml")).expect("config loads");
            assert_eq!(config.defaults.timeout, 10);
            assert_eq!(config.defaults.top_n, 5);
            assert_eq!(config.defaults.query_log_limit, 100);

            let (name, profile) = config.profile(None).expect("default profile exists");
            assert_eq!(name, "home");
            assert_eq!(profile.url, "http://192.168.1.2:3000");
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_| {
            let config = load_config_from(Path::new("absent.toml")).expect("defaults load");
            assert_eq!(config, Config::default());
            assert!(matches!(
                config.profile(Some("nope")),
                Err(ConfigError::UnknownProfile { .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn password_env_wins_over_plaintext() {
        Jail::expect_with(|jail| {
            jail.set_env("GUARDLY_TEST_PW", "from-env");
            let profile = Profile {
                username: Some("admin".into()),
                password: Some("plaintext".into()),
                password_env: Some("GUARDLY_TEST_PW".into()),
                ..Profile::new("http://10.0.0.1")
            };
            let creds = resolve_credentials(&profile, "guardly-test-no-keyring")
                .expect("resolves")
                .expect("has credentials");
            assert_eq!(creds.password.expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn profile_without_username_has_no_credentials() {
        let profile = Profile::new("http://10.0.0.1:3000");
        let config = profile_to_controller_config(&profile, "open", &Defaults::default())
            .expect("valid profile");
        assert!(config.credentials.is_none());
        assert_eq!(config.tls, TlsVerification::SystemDefaults);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.top_n, 10);
    }

    #[test]
    fn profile_overrides_and_validation() {
        let profile = Profile {
            insecure: Some(true),
            timeout: Some(3),
            query_log_limit: Some(25),
            ..Profile::new("https://adguard.lan")
        };
        let config = profile_to_controller_config(&profile, "lan", &Defaults::default())
            .expect("valid profile");
        assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.query_log_limit, 25);

        let bad = Profile::new("ftp://adguard.lan");
        assert!(matches!(
            profile_to_controller_config(&bad, "bad", &Defaults::default()),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn save_round_trips_through_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config
            .profiles
            .insert("default".into(), Profile::new("http://192.168.1.2:3000"));
        save_config_to(&config, &path).expect("saves");

        let text = std::fs::read_to_string(&path).expect("written");
        let back: Config = toml::from_str(&text).expect("parses");
        assert_eq!(back, config);
    }
}
