//! Configuration schema definitions.
//!
//! All types derive Serde traits so hosts can deserialize the engine config
//! from their own config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

/// Engine configuration.
///
/// Every field except `api_key` carries a default.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// API credential. Required; construction fails without it.
    pub api_key: String,

    /// Base URL of the rule and telemetry service.
    pub api_url: String,

    /// Rule sync interval in seconds.
    pub sync_interval_secs: u64,

    /// Telemetry flush interval in seconds.
    pub flush_interval_secs: u64,

    /// Fingerprints buffered before a forced flush.
    pub buffer_size: usize,

    /// Enable telemetry reporting.
    pub telemetry: bool,

    /// Maximum requests per source per window.
    pub rate_limit: u64,

    /// Rate limit window in milliseconds.
    pub rate_limit_window_ms: u64,

    /// Log verbosity (trace, debug, info, warn, error, silent).
    pub log_level: String,

    /// Additional User-Agent substrings to always allow.
    pub allowed_uas: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: "https://api.botgate.dev".to_string(),
            sync_interval_secs: 300,
            flush_interval_secs: 10,
            buffer_size: 100,
            telemetry: true,
            rate_limit: 60,
            rate_limit_window_ms: 60_000,
            log_level: "warn".to_string(),
            allowed_uas: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Minimal configuration with only the credential set.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Semantic validation (serde handles syntactic).
    ///
    /// Runs before the config is accepted into the engine.
    pub fn validate(&self) -> Result<(), Error> {
        if self.api_key.is_empty() {
            return Err(Error::MissingApiKey);
        }
        if let Err(source) = Url::parse(&self.api_url) {
            return Err(Error::InvalidApiUrl {
                url: self.api_url.clone(),
                source,
            });
        }
        if self.rate_limit == 0 || self.rate_limit_window_ms == 0 {
            return Err(Error::InvalidRateLimit);
        }
        if self.sync_interval_secs == 0 || self.flush_interval_secs == 0 {
            return Err(Error::InvalidInterval);
        }
        Ok(())
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }
}
