//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use dantewatch_config::ConfigError;
use dantewatch_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Dante Director at {url}")]
    #[diagnostic(
        code(dantewatch::connection_failed),
        help(
            "Check that Dante Director is reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Dante Director returned no usable data: {message}")]
    #[diagnostic(
        code(dantewatch::unreachable),
        help("Check that the account behind this API key has at least one domain.")
    )]
    Unreachable { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(dantewatch::auth_failed),
        help(
            "Verify the API key for profile '{profile}'.\n\
             Run: dantewatch config init --host <host> --key <key>"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(dantewatch::no_credentials),
        help(
            "Configure one with: dantewatch config init --host <host> --key <key>\n\
             Or set the DANTEWATCH_API_KEY environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Requests ─────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(dantewatch::invalid_argument),
        help("Run: dantewatch devices  to see known device ids")
    )]
    InvalidArgument { message: String },

    #[error("{message}")]
    #[diagnostic(code(dantewatch::control_failed))]
    ControlFailed { message: String },

    #[error("API error: {message}")]
    #[diagnostic(code(dantewatch::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(dantewatch::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(dantewatch::profile_not_found),
        help("Create it with: dantewatch config init --profile {name} --host <host>")
    )]
    ProfileNotFound { name: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(dantewatch::no_config),
        help(
            "Create one with: dantewatch config init --host <host> --key <key>\n\
             Or pass --url and --api-key.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(dantewatch::config))]
    Config(ConfigError),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out")]
    #[diagnostic(
        code(dantewatch::timeout),
        help("Increase timeout with --timeout or check Director responsiveness.")
    )]
    Timeout,

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    #[diagnostic(code(dantewatch::json))]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization failed: {0}")]
    #[diagnostic(code(dantewatch::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Unreachable { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::InvalidArgument { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "current".into(),
                message,
            },
            CoreError::Timeout => CliError::Timeout,
            CoreError::Unreachable { message } => CliError::Unreachable { message },
            CoreError::InvalidArgument { message } => CliError::InvalidArgument { message },
            err @ CoreError::ControlFailed { .. } => CliError::ControlFailed {
                message: err.to_string(),
            },
            CoreError::Api { message, status } => CliError::ApiError {
                message: match status {
                    Some(code) => format!("HTTP {code}: {message}"),
                    None => message,
                },
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::ApiError { message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound { name: profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}
