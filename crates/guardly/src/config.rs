//! CLI configuration: a thin layer over `guardly_config`.
//!
//! Adds the resolution that respects `GlobalOpts` flag overrides
//! (--url, --username, --password, --insecure, --timeout).

use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;

use guardly_core::{ControllerConfig, Credentials, TlsVerification};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use guardly_config::{
    Config, Profile, config_path, load_config, load_config_or_default, save_config, store_password,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// The output format from `[defaults]`, when the flag was not given.
pub fn default_output(config: &Config) -> Option<OutputFormat> {
    OutputFormat::from_str(&config.defaults.output, true).ok()
}

fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Build a `ControllerConfig` from the config file, the active profile
/// and the CLI overrides.
///
/// Without a matching profile, `--url` alone is enough. Asking for a
/// profile by name that does not exist is an error.
pub fn build_controller_config(
    global: &GlobalOpts,
    config: &Config,
) -> Result<ControllerConfig, CliError> {
    let profile_name = active_profile_name(global, config);

    let mut profile = match (config.profiles.get(&profile_name), &global.url) {
        (Some(profile), _) => profile.clone(),
        (None, Some(url)) if global.profile.is_none() => Profile::new(url.clone()),
        (None, _) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(config),
            });
        }
        (None, _) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(ref url) = global.url {
        profile.url.clone_from(url);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }

    // A flag password beats every stored source, so resolve it here and
    // keep the profile from consulting the keyring.
    let flag_password = global.password.clone().map(SecretString::from);
    let username = profile.username.clone();
    if flag_password.is_some() {
        profile.username = None;
    }

    let mut controller_config =
        guardly_config::profile_to_controller_config(&profile, &profile_name, &config.defaults)?;

    if let Some(password) = flag_password {
        let username = username.ok_or_else(|| CliError::Validation {
            field: "username".into(),
            reason: "--password needs --username or a profile username".into(),
        })?;
        controller_config.credentials = Some(Credentials { username, password });
    }
    if global.insecure {
        controller_config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        controller_config.timeout = Duration::from_secs(secs);
    }

    tracing::debug!(
        profile = %profile_name,
        url = %controller_config.url,
        authenticated = controller_config.credentials.is_some(),
        "resolved controller config"
    );
    Ok(controller_config)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["guardly"];
        argv.extend_from_slice(args);
        argv.push("status");
        Cli::try_parse_from(argv).expect("parses").global
    }

    fn config_with_home() -> Config {
        let mut config = Config::default();
        let mut profile = Profile::new("http://192.168.1.2:3000");
        profile.timeout = Some(12);
        config.profiles.insert("default".into(), profile);
        config
    }

    #[test]
    fn flags_override_profile() {
        let cfg = build_controller_config(
            &global(&[
                "--url",
                "http://10.0.0.53",
                "--username",
                "admin",
                "--password",
                "hunter2",
                "-k",
                "--timeout",
                "3",
            ]),
            &config_with_home(),
        )
        .expect("resolves");

        assert_eq!(cfg.url.as_str(), "http://10.0.0.53/");
        assert_eq!(cfg.credentials.expect("credentials").username, "admin");
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(cfg.timeout, Duration::from_secs(3));
    }

    #[test]
    fn profile_values_apply_without_flags() {
        let cfg = build_controller_config(&global(&[]), &config_with_home()).expect("resolves");
        assert_eq!(cfg.url.as_str(), "http://192.168.1.2:3000/");
        assert!(cfg.credentials.is_none());
        assert_eq!(cfg.timeout, Duration::from_secs(12));
    }

    #[test]
    fn url_flag_alone_is_enough() {
        let cfg = build_controller_config(&global(&["--url", "http://10.0.0.53:3000"]), &Config::default())
            .expect("resolves");
        assert_eq!(cfg.url.port(), Some(3000));
    }

    #[test]
    fn missing_named_profile_is_reported() {
        let err = build_controller_config(&global(&["--profile", "office"]), &config_with_home())
            .expect_err("unknown profile");
        assert!(matches!(err, CliError::ProfileNotFound { ref name, .. } if name == "office"));
    }

    #[test]
    fn nothing_configured_is_reported() {
        let err = build_controller_config(&global(&[]), &Config::default()).expect_err("no config");
        assert!(matches!(err, CliError::NoConfig { .. }));
    }

    #[test]
    fn password_without_username_is_rejected() {
        let err = build_controller_config(&global(&["--password", "hunter2"]), &config_with_home())
            .expect_err("needs username");
        assert!(matches!(err, CliError::Validation { .. }));
    }
}
