// ── Runtime connection configuration ──
//
// These types describe how to reach a Dante Director instance and how
// aggressively to poll it. They carry credential data but never touch
// disk; the CLI (or any host) constructs a `DirectorConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// How often the collection loop wakes up.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
/// Minimum spacing between two full device refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
/// How long one fleet request keeps the collection loop active.
pub const DEFAULT_INACTIVITY_WINDOW: Duration = Duration::from_secs(3 * 60);
/// Connect + read timeout for every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. Default, matching on-premises Director installs.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for one Dante Director endpoint.
///
/// Built by the host, passed to [`Aggregator`](crate::Aggregator).
#[derive(Debug, Clone)]
pub struct DirectorConfig {
    /// Base URL (e.g., `https://director.example.com:443`).
    pub url: Url,
    /// API key sent in the `Authorization` header.
    pub api_key: SecretString,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Collection loop tick.
    pub poll_interval: Duration,
    /// Minimum time between full refreshes.
    pub refresh_interval: Duration,
    /// Inactivity window after the last fleet request.
    pub inactivity_window: Duration,
}

impl DirectorConfig {
    pub fn new(url: Url, api_key: SecretString) -> Self {
        Self {
            url,
            api_key,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            inactivity_window: DEFAULT_INACTIVITY_WINDOW,
        }
    }
}
