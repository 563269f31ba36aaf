use thiserror::Error;

/// Top-level error type for the `dantewatch-api` crate.
///
/// Covers every failure mode of the GraphQL endpoint: authentication,
/// transport, HTTP status, GraphQL error payloads, and decoding.
/// `dantewatch-core` maps these into user-facing errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The service reported `UNAUTHENTICATED` inside the GraphQL `errors` array.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The HTTP layer rejected the API key (401).
    #[error("Invalid API key")]
    InvalidApiKey,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Non-success HTTP status with whatever body the server sent.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── GraphQL ─────────────────────────────────────────────────────
    /// The response carried an `errors` array.
    #[error("GraphQL error: {}", messages.join("; "))]
    GraphQl { messages: Vec<String> },

    /// The response had neither `data` nor `errors`.
    #[error("GraphQL response contained no data")]
    MissingData,

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}
