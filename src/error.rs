//! Crate-wide error definitions.

use thiserror::Error;

/// Errors surfaced at engine construction.
///
/// Background failures (rule sync, telemetry export) are recovered
/// internally and never appear here; the decision path fails open.
#[derive(Debug, Error)]
pub enum Error {
    /// No API credential was supplied.
    #[error("api_key is required")]
    MissingApiKey,

    /// The API base URL could not be parsed.
    #[error("invalid api_url {url:?}: {source}")]
    InvalidApiUrl {
        url: String,
        source: url::ParseError,
    },

    /// Rate-limit count or window set to zero.
    #[error("invalid rate limit: rate_limit and rate_limit_window_ms must be non-zero")]
    InvalidRateLimit,

    /// A background interval set to zero.
    #[error("invalid interval: sync and flush intervals must be non-zero")]
    InvalidInterval,

    /// The outbound HTTP client could not be built.
    #[error("http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
