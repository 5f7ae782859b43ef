//! Background rule refresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::error::Error;
use crate::observability::metrics;
use crate::rules::store::RuleStore;
use crate::rules::types::RuleSet;

/// Bound on a single rule fetch; an expired fetch is abandoned, the next
/// tick is the retry.
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Periodically fetches the rule document and installs newer versions.
///
/// Every failure mode (transport error, non-2xx, malformed payload, stale
/// version) keeps the last-known-good snapshot and is invisible to the
/// decision path.
pub struct RuleSync {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    interval: Duration,
}

impl RuleSync {
    pub fn new(api_url: &str, api_key: &str, interval: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/v1/rules", api_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            interval,
        })
    }

    /// Run the refresh loop until shutdown. The first tick fires
    /// immediately, giving the eager fetch at construction time.
    pub async fn run(self, store: Arc<RuleStore>, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.sync_once(&store).await {
                        metrics::record_rule_sync("error");
                        tracing::debug!(error = %e, "rule sync failed, keeping cached rules");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("rule sync stopping");
                    break;
                }
            }
        }
    }

    async fn sync_once(&self, store: &RuleStore) -> Result<(), reqwest::Error> {
        let res = self
            .client
            .get(&self.endpoint)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !res.status().is_success() {
            metrics::record_rule_sync("rejected");
            tracing::warn!(status = %res.status(), "rule sync rejected");
            return Ok(());
        }

        let fetched: RuleSet = res.json().await?;
        let version = fetched.version;

        if store.install(fetched) {
            metrics::record_rule_sync("installed");
            tracing::info!(version, "rules updated");
        } else {
            metrics::record_rule_sync("stale");
            tracing::debug!(version, "fetched rules not newer than current, discarded");
        }
        Ok(())
    }
}
