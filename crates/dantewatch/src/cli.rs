//! Clap derive structures for the `dantewatch` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// dantewatch -- monitor and control Dante devices through Dante Director
#[derive(Debug, Parser)]
#[command(
    name = "dantewatch",
    version,
    about = "Monitor and control Dante audio devices through Dante Director",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Director profile to use
    #[arg(long, short = 'p', env = "DANTEWATCH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Director base URL (overrides profile)
    #[arg(long, short = 'u', env = "DANTEWATCH_URL", global = true)]
    pub url: Option<String>,

    /// Director API key
    #[arg(long, env = "DANTEWATCH_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "DANTEWATCH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "DANTEWATCH_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "DANTEWATCH_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    /// Control value understood by the dispatcher.
    pub fn as_control_value(self) -> &'static str {
        match self {
            Self::On => "1",
            Self::Off => "0",
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show site-level statistics for the selected domain
    #[command(alias = "st")]
    Stats,

    /// List devices and their normalized properties
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Toggle a clock preference on one device
    Set(SetArgs),

    /// Select a site (domain) by name and show its statistics
    Site(SiteArgs),

    /// Keep polling and print a line per device after every refresh
    Watch(WatchArgs),

    /// Manage configuration profiles
    Config(ConfigArgs),
}

// ── Command arguments ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Only show these device ids (repeatable)
    #[arg(long = "id", value_name = "DEVICE_ID")]
    pub ids: Vec<String>,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Device id
    pub device: String,

    /// Property name, e.g. PreferredLeader or ClockSynchronisation#UnicastClocking
    pub property: String,

    /// New state
    #[arg(value_enum)]
    pub state: Toggle,
}

#[derive(Debug, Args)]
pub struct SiteArgs {
    /// Site display name
    pub name: String,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Only show these device ids (repeatable)
    #[arg(long = "id", value_name = "DEVICE_ID")]
    pub ids: Vec<String>,

    /// Seconds between full refreshes
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh: u64,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or update a profile
    Init(ConfigInitArgs),

    /// Print the current configuration (secrets redacted)
    Show,

    /// Print the configuration file path
    Path,
}

#[derive(Debug, Args)]
pub struct ConfigInitArgs {
    /// Director host name or URL
    #[arg(long)]
    pub host: String,

    /// HTTPS port
    #[arg(long, default_value = "443")]
    pub port: u16,

    /// API key for this profile
    #[arg(long, conflicts_with = "key_stdin")]
    pub key: Option<String>,

    /// Read the API key from stdin
    #[arg(long)]
    pub key_stdin: bool,

    /// Read the API key from this environment variable at runtime
    #[arg(long)]
    pub api_key_env: Option<String>,

    /// Store the key in the system keyring instead of the config file
    #[arg(long)]
    pub keyring: bool,

    /// Verify TLS certificates against the system store
    #[arg(long)]
    pub strict_tls: bool,

    /// Make this profile the default
    #[arg(long)]
    pub default: bool,
}
