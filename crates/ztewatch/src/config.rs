//! CLI-owned configuration: TOML profiles, password resolution, and
//! translation to `ztewatch_core::RouterConfig`.
//!
//! Core never sees these types -- it receives a pre-built `RouterConfig`.

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
use tracing::{debug, warn};

use ztewatch_core::RouterConfig;
use ztewatch_core::config::DEFAULT_HOST;

use crate::cli::GlobalOpts;
use crate::error::CliError;

const REDACTED: &str = "********";

// ── TOML config structs ──────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when --profile is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named router profiles.
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

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between `watch` cycles.
    #[serde(default = "default_interval")]
    pub interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            interval: default_interval(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}
fn default_interval() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Router host, host:port or URL (e.g. "192.168.0.1").
    pub host: String,

    /// Admin password (plaintext -- prefer `password_env`).
    pub password: Option<String>,

    /// Environment variable holding the admin password.
    pub password_env: Option<String>,

    pub timeout: Option<u64>,

    pub interval: Option<u64>,
}

impl Config {
    /// Copy with every plaintext password masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for profile in copy.profiles.values_mut() {
            if profile.password.is_some() {
                profile.password = Some(REDACTED.into());
            }
        }
        copy
    }
}

// ── Config file path ─────────────────────────────────────────────────

/// Config file in use: `--config`/`ZTEWATCH_CONFIG`, else the
/// platform config directory.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    if let Some(path) = &global.config {
        return path.clone();
    }
    ProjectDirs::from("", "", "ztewatch").map_or_else(
        || PathBuf::from(".ztewatch.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ───────────────────────────────────────────────────

/// Load the full Config from file + environment. A missing file is not an
/// error; the defaults apply.
pub fn load_config(path: &Path) -> Result<Config, CliError> {
    debug!(path = %path.display(), "loading configuration");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ZTEWATCH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Profile resolution ───────────────────────────────────────────────

pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Translate file config + global flags into a `RouterConfig`.
///
/// Precedence for every setting is flag/env > profile > `[defaults]`.
/// A missing profile is only an error when it was asked for explicitly;
/// otherwise the default host is used.
pub fn resolve(global: &GlobalOpts, config: &Config) -> Result<RouterConfig, CliError> {
    let name = active_profile_name(global, config);
    let profile = config.profiles.get(&name);

    if profile.is_none() && global.profile.is_some() {
        return Err(CliError::ProfileNotFound {
            name,
            available: available_profiles(config),
        });
    }

    let host = global
        .host
        .as_deref()
        .or(profile.map(|p| p.host.as_str()))
        .unwrap_or(DEFAULT_HOST);

    let timeout = global
        .timeout
        .or(profile.and_then(|p| p.timeout))
        .unwrap_or(config.defaults.timeout);
    let interval = profile
        .and_then(|p| p.interval)
        .unwrap_or(config.defaults.interval);

    let router = RouterConfig::for_host(host)?
        .with_password(resolve_password(global, profile, &name))
        .with_timeout(positive_secs("timeout", timeout)?)
        .with_poll_interval(positive_secs("interval", interval)?);

    debug!(
        profile = %name,
        endpoint = %router.endpoint,
        has_password = router.password.is_some(),
        "resolved router configuration"
    );
    Ok(router)
}

/// Reject zero-second durations.
pub fn positive_secs(field: &str, secs: u64) -> Result<Duration, CliError> {
    if secs == 0 {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "must be at least 1 second".into(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

// ── Credential helpers ───────────────────────────────────────────────

/// Resolve the admin password from the credential chain. `None` is legal.
fn resolve_password(
    global: &GlobalOpts,
    profile: Option<&Profile>,
    profile_name: &str,
) -> Option<SecretString> {
    // 1. CLI flag / ZTEWATCH_PASSWORD
    if let Some(pw) = &global.password {
        return Some(SecretString::from(pw.clone()));
    }

    let profile = profile?;

    // 2. Profile's password_env -> env var lookup
    if let Some(env_name) = &profile.password_env {
        match std::env::var(env_name) {
            Ok(pw) if !pw.is_empty() => return Some(SecretString::from(pw)),
            _ => warn!(
                profile = profile_name,
                variable = %env_name,
                "password_env variable is not set"
            ),
        }
    }

    // 3. Plaintext in config
    profile
        .password
        .as_ref()
        .map(|pw| SecretString::from(pw.clone()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;
    use std::io::Write;

    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["ztewatch"];
        argv.extend_from_slice(args);
        argv.push("poll");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn parse(toml: &str) -> Config {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(toml.as_bytes()).unwrap();
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(file.path()))
            .extract()
            .unwrap()
    }

    const SAMPLE: &str = r#"
        default_profile = "home"

        [defaults]
        timeout = 5

        [profiles.home]
        host = "192.168.8.1"
        password = "hunter2"
        interval = 15

        [profiles.office]
        host = "10.0.0.1"
        timeout = 20
    "#;

    #[test]
    fn default_profile_applies() {
        let cfg = parse(SAMPLE);
        let router = resolve(&global(&[]), &cfg).unwrap();

        assert_eq!(router.endpoint.as_str(), "http://192.168.8.1/ubus/");
        assert_eq!(router.timeout, Duration::from_secs(5));
        assert_eq!(router.poll_interval, Duration::from_secs(15));
        assert_eq!(router.password.unwrap().expose_secret(), "hunter2");
    }

    #[test]
    fn flags_override_profile() {
        let cfg = parse(SAMPLE);
        let router = resolve(
            &global(&["--profile", "office", "--host", "10.9.9.9:8080", "--timeout", "3"]),
            &cfg,
        )
        .unwrap();

        assert_eq!(router.endpoint.as_str(), "http://10.9.9.9:8080/ubus/");
        assert_eq!(router.timeout, Duration::from_secs(3));
        assert_eq!(router.poll_interval, Duration::from_secs(30));
        assert!(router.password.is_none());
    }

    #[test]
    fn unknown_explicit_profile_is_an_error() {
        let cfg = parse(SAMPLE);
        let err = resolve(&global(&["--profile", "cabin"]), &cfg).unwrap_err();
        match err {
            CliError::ProfileNotFound { name, available } => {
                assert_eq!(name, "cabin");
                assert_eq!(available, "home, office");
            }
            other => panic!("expected ProfileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn no_config_falls_back_to_default_host() {
        let router = resolve(&global(&[]), &Config::default()).unwrap();
        assert_eq!(router.endpoint.as_str(), "http://192.168.0.1/ubus/");
        assert_eq!(router.timeout, Duration::from_secs(10));
        assert!(router.password.is_none());
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = resolve(&global(&["--timeout", "0"]), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "timeout"));
    }

    #[test]
    fn redaction_masks_passwords_only() {
        let cfg = parse(SAMPLE).redacted();
        assert_eq!(cfg.profiles["home"].password.as_deref(), Some(REDACTED));
        assert_eq!(cfg.profiles["office"].password, None);
        assert_eq!(cfg.profiles["home"].host, "192.168.8.1");
    }
}
