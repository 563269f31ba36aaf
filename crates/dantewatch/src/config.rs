//! CLI-aware configuration resolution.
//!
//! Layers `--url` / `--api-key` / `--insecure` / `--timeout` over the
//! profile loaded by `dantewatch-config`.

use std::time::Duration;

use secrecy::SecretString;

use dantewatch_config::{Config, Profile};
use dantewatch_core::{DirectorConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use dantewatch_config::{config_path, load_config_or_default};

/// Profile name selected by `--profile`, the config default, or `"default"`.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `DirectorConfig` from the config file, profile, and CLI overrides.
pub fn build_director_config(global: &GlobalOpts) -> Result<(DirectorConfig, String), CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        let config = resolve_profile(profile, &profile_name, &cfg, global)?;
        return Ok((config, profile_name));
    }

    if global.profile.is_some() {
        return Err(CliError::ProfileNotFound { name: profile_name });
    }

    // No profile -- build from flags / env alone
    let url_str = global.url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;
    let api_key = global
        .api_key
        .clone()
        .map(SecretString::from)
        .ok_or_else(|| CliError::NoCredentials {
            profile: profile_name.clone(),
        })?;

    let mut config = DirectorConfig::new(url, api_key);
    config.tls = if global.insecure || cfg.defaults.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };
    config.timeout = Duration::from_secs(global.timeout);
    Ok((config, profile_name))
}

fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<DirectorConfig, CliError> {
    let mut profile = profile.clone();
    if let Some(ref url) = global.url {
        profile.host.clone_from(url);
    }
    if let Some(ref key) = global.api_key {
        profile.api_key = Some(key.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }

    let mut config =
        dantewatch_config::profile_to_director_config(&profile, profile_name, &cfg.defaults)?;
    if let Some(ref key) = global.api_key {
        config.api_key = SecretString::from(key.clone());
    }
    if profile.timeout.is_none() {
        config.timeout = Duration::from_secs(global.timeout);
    }
    Ok(config)
}
