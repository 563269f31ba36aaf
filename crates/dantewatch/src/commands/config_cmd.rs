//! Config subcommand handlers.

use std::io::BufRead;

use dantewatch_config::{self as config_store, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, ConfigInitArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init(init) => init_profile(init, global),
        ConfigCommand::Show => {
            let mut cfg = config::load_config_or_default();
            for profile in cfg.profiles.values_mut() {
                if profile.api_key.is_some() {
                    profile.api_key = Some(REDACTED.into());
                }
            }
            let out = match global.output {
                crate::cli::OutputFormat::Json => serde_json::to_string_pretty(&cfg)?,
                crate::cli::OutputFormat::JsonCompact => serde_json::to_string(&cfg)?,
                _ => toml::to_string_pretty(&cfg)?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}

fn init_profile(args: ConfigInitArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let profile_name = global.profile.clone().unwrap_or_else(|| "default".into());

    let key = if args.key_stdin {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        Some(line.trim().to_owned()).filter(|k| !k.is_empty())
    } else {
        args.key
    };

    if args.keyring && key.is_none() {
        return Err(CliError::Validation {
            field: "keyring".into(),
            reason: "--keyring needs a key from --key or --key-stdin".into(),
        });
    }

    let plaintext_key = if args.keyring {
        if let Some(ref key) = key {
            config_store::store_api_key(&profile_name, key)?;
        }
        None
    } else {
        key
    };

    let profile = Profile {
        host: args.host,
        port: args.port,
        api_key: plaintext_key,
        api_key_env: args.api_key_env,
        insecure: Some(!args.strict_tls),
        ..Profile::default()
    };
    // Validate before writing anything.
    config_store::profile_url(&profile)?;

    let mut cfg = config::load_config_or_default();
    let make_default = args.default
        || cfg.profiles.is_empty()
        || cfg
            .default_profile
            .as_deref()
            .is_none_or(|name| !cfg.profiles.contains_key(name));
    if make_default {
        cfg.default_profile = Some(profile_name.clone());
    }
    cfg.profiles.insert(profile_name.clone(), profile);

    let path = config_store::save_config(&cfg)?;
    output::print_output(
        &format!("Saved profile '{profile_name}' to {}", path.display()),
        global.quiet,
    );
    Ok(())
}
