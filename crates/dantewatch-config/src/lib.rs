//! Configuration for the dantewatch CLI and other hosts.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `dantewatch_core::DirectorConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dantewatch_core::config::{
    DEFAULT_INACTIVITY_WINDOW, DEFAULT_POLL_INTERVAL, DEFAULT_REFRESH_INTERVAL,
};
use dantewatch_core::{DirectorConfig, TlsVerification};

const KEYRING_SERVICE: &str = "dantewatch";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

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
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named Director profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up `name`, or the default profile when `name` is `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_insecure")]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: default_insecure(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_insecure() -> bool {
    true
}
fn default_timeout() -> u64 {
    30
}

/// A named Dante Director profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Director host name or base URL (e.g., "director.example.com").
    pub host: String,

    /// HTTPS port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Minimum seconds between full device refreshes.
    pub refresh_interval_secs: Option<u64>,

    /// Seconds of inactivity after which polling pauses.
    pub inactivity_secs: Option<u64>,
}

fn default_port() -> u16 {
    443
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "dantewatch", "dantewatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("dantewatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path + `DANTEWATCH_` environment.
///
/// Nested keys use a double underscore, e.g. `DANTEWATCH_DEFAULTS__TIMEOUT`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("DANTEWATCH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve an API key: profile env var → system keyring → plaintext.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's api_key_env → env var lookup
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/api-key")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store an API key in the system keyring for `profile_name`.
pub fn store_api_key(profile_name: &str, key: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/api-key"))
        .and_then(|entry| entry.set_password(key))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

// ── Translation ─────────────────────────────────────────────────────

/// Base URL for a profile. A bare host gets `https://` and the profile port.
pub fn profile_url(profile: &Profile) -> Result<url::Url, ConfigError> {
    let invalid = || ConfigError::Validation {
        field: "host".into(),
        reason: format!("invalid host: {}", profile.host),
    };

    if profile.host.trim().is_empty() {
        return Err(invalid());
    }

    if profile.host.contains("://") {
        let mut url: url::Url = profile.host.parse().map_err(|_| invalid())?;
        if url.port().is_none() && profile.port != default_port() {
            url.set_port(Some(profile.port)).map_err(|()| invalid())?;
        }
        return Ok(url);
    }

    format!("https://{}:{}", profile.host, profile.port)
        .parse()
        .map_err(|_| invalid())
}

/// Build a `DirectorConfig` from a profile plus global defaults.
pub fn profile_to_director_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<DirectorConfig, ConfigError> {
    let url = profile_url(profile)?;
    let api_key = resolve_api_key(profile, profile_name)?;

    let tls = if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(DirectorConfig {
        url,
        api_key,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        poll_interval: DEFAULT_POLL_INTERVAL,
        refresh_interval: profile
            .refresh_interval_secs
            .map_or(DEFAULT_REFRESH_INTERVAL, Duration::from_secs),
        inactivity_window: profile
            .inactivity_secs
            .map_or(DEFAULT_INACTIVITY_WINDOW, Duration::from_secs),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn profile(host: &str) -> Profile {
        Profile {
            host: host.into(),
            port: default_port(),
            api_key: Some("plain-key".into()),
            ..Profile::default()
        }
    }

    #[test]
    fn bare_host_gets_scheme_and_port() {
        let mut p = profile("director.local");
        assert_eq!(profile_url(&p).unwrap().as_str(), "https://director.local/");

        p.port = 8443;
        assert_eq!(
            profile_url(&p).unwrap().as_str(),
            "https://director.local:8443/"
        );
    }

    #[test]
    fn full_url_is_kept() {
        let p = profile("http://10.0.0.2:8080/api");
        assert_eq!(profile_url(&p).unwrap().as_str(), "http://10.0.0.2:8080/api");
    }

    #[test]
    fn empty_host_is_rejected() {
        assert!(matches!(
            profile_url(&profile("  ")),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn plaintext_key_is_last_resort() {
        let mut p = profile("director.local");
        p.api_key_env = Some("DANTEWATCH_TEST_KEY_THAT_IS_NEVER_SET".into());
        let key = resolve_api_key(&p, "plaintext-test-profile").unwrap();
        assert_eq!(key.expose_secret(), "plain-key");
    }

    #[test]
    fn intervals_come_from_profile() {
        let mut p = profile("director.local");
        p.refresh_interval_secs = Some(60);
        p.inactivity_secs = Some(10);
        p.insecure = Some(false);

        let cfg = profile_to_director_config(&p, "interval-test", &Defaults::default()).unwrap();
        assert_eq!(cfg.refresh_interval, Duration::from_secs(60));
        assert_eq!(cfg.inactivity_window, Duration::from_secs(10));
        assert_eq!(cfg.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(cfg.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn ca_cert_wins_over_insecure() {
        let mut p = profile("director.local");
        p.ca_cert = Some(PathBuf::from("/etc/ssl/director.pem"));
        p.insecure = Some(true);

        let cfg = profile_to_director_config(&p, "ca-test", &Defaults::default()).unwrap();
        assert_eq!(
            cfg.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/director.pem"))
        );
    }

    #[test]
    fn save_then_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert("default".into(), profile("director.local"));
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let (name, p) = loaded.profile(None).unwrap();
        assert_eq!(name, "default");
        assert_eq!(p.host, "director.local");
        assert_eq!(p.port, 443);
        assert_eq!(loaded.defaults.output, "table");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert!(loaded.profiles.is_empty());
        assert!(matches!(
            loaded.profile(Some("studio")),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn port_defaults_when_omitted_in_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "default_profile = \"studio\"\n\n[profiles.studio]\nhost = \"10.1.1.1\"\napi_key_env = \"STUDIO_KEY\"\n",
        )
        .unwrap();

        let loaded = load_config_from(&path).unwrap();
        let (name, p) = loaded.profile(None).unwrap();
        assert_eq!(name, "studio");
        assert_eq!(p.port, 443);
        assert_eq!(p.api_key_env.as_deref(), Some("STUDIO_KEY"));
    }
}
