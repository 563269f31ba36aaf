// ── Core error types ──
//
// User-facing errors from dantewatch-core. Consumers never see HTTP
// status codes or GraphQL envelopes directly; the
// `From<dantewatch_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to Dante Director at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Dante Director request timed out")]
    Timeout,

    #[error("Dante Director unreachable: {message}")]
    Unreachable { message: String },

    // ── Request errors ───────────────────────────────────────────────
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Can't control {property} with value {label}: {reason}")]
    ControlFailed {
        property: String,
        label: String,
        reason: String,
    },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<dantewatch_api::Error> for CoreError {
    fn from(err: dantewatch_api::Error) -> Self {
        match err {
            dantewatch_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            dantewatch_api::Error::InvalidApiKey => CoreError::AuthenticationFailed {
                message: "Invalid API key".into(),
            },
            dantewatch_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            dantewatch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            dantewatch_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            dantewatch_api::Error::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            dantewatch_api::Error::GraphQl { messages } => CoreError::Api {
                message: messages.join("; "),
                status: None,
            },
            dantewatch_api::Error::MissingData => CoreError::Unreachable {
                message: "no usable domain data in response".into(),
            },
            dantewatch_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
