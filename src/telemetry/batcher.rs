//! Best-effort fingerprint batching and export.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};

use crate::engine::types::Fingerprint;
use crate::error::Error;
use crate::observability::metrics;

/// Bound on a single export call; an expired call is abandoned and its
/// batch dropped.
const EXPORT_TIMEOUT: Duration = Duration::from_secs(5);

/// Collector wire shape for one batch.
#[derive(Serialize)]
struct ExportBatch<'a> {
    events: &'a [Fingerprint],
}

/// Accumulates decision fingerprints and ships them in batches.
///
/// `push` is an O(1) append that never blocks and never fails; all I/O
/// happens on the background flush task. When telemetry is disabled `push`
/// is a no-op and no task runs.
pub struct TelemetryBatcher {
    buffer: Mutex<Vec<Fingerprint>>,
    /// Signals the flush task when the buffer hits `buffer_size`. Capacity 1:
    /// a pending signal already covers any further pushes.
    flush_tx: mpsc::Sender<()>,
    flush_rx: Mutex<Option<mpsc::Receiver<()>>>,
    enabled: bool,
    buffer_size: usize,
    flush_interval: Duration,
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl TelemetryBatcher {
    pub fn new(
        api_url: &str,
        api_key: &str,
        flush_interval: Duration,
        buffer_size: usize,
        enabled: bool,
    ) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(EXPORT_TIMEOUT).build()?;
        let (flush_tx, flush_rx) = mpsc::channel(1);

        Ok(Self {
            buffer: Mutex::new(Vec::new()),
            flush_tx,
            flush_rx: Mutex::new(Some(flush_rx)),
            enabled,
            buffer_size,
            flush_interval,
            client,
            endpoint: format!("{}/v1/fingerprints", api_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        })
    }

    /// Buffer one fingerprint. Reaching `buffer_size` signals an immediate
    /// flush on the background task; the push itself performs no I/O.
    pub fn push(&self, fp: Fingerprint) {
        if !self.enabled {
            return;
        }

        let full = {
            let mut buffer = self.buffer.lock().expect("telemetry buffer mutex poisoned");
            buffer.push(fp);
            buffer.len() >= self.buffer_size
        };

        if full {
            let _ = self.flush_tx.try_send(());
        }
    }

    /// Number of buffered fingerprints awaiting export.
    pub fn buffered(&self) -> usize {
        self.buffer.lock().expect("telemetry buffer mutex poisoned").len()
    }

    /// Drop all buffered fingerprints.
    pub fn clear(&self) {
        self.buffer
            .lock()
            .expect("telemetry buffer mutex poisoned")
            .clear();
    }

    /// Run the flush loop until shutdown, then release the buffer.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        if !self.enabled {
            return;
        }
        let Some(mut flush_rx) = self
            .flush_rx
            .lock()
            .expect("telemetry flush receiver mutex poisoned")
            .take()
        else {
            return;
        };

        let mut ticker = tokio::time::interval(self.flush_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.flush_once().await,
                Some(()) = flush_rx.recv() => self.flush_once().await,
                _ = shutdown.recv() => {
                    tracing::debug!("telemetry flush stopping");
                    break;
                }
            }
        }

        self.clear();
    }

    /// Snapshot and clear the buffer, then ship the snapshot as one batch.
    /// Pushes racing the in-flight call land in the fresh buffer.
    async fn flush_once(&self) {
        let batch = std::mem::take(
            &mut *self.buffer.lock().expect("telemetry buffer mutex poisoned"),
        );
        if batch.is_empty() {
            return;
        }

        let result = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&ExportBatch { events: &batch })
            .send()
            .await;

        match result {
            Ok(res) if res.status().is_success() => {
                metrics::record_telemetry_flush("ok", batch.len());
                tracing::debug!(count = batch.len(), "flushed fingerprints");
            }
            Ok(res) => {
                metrics::record_telemetry_flush("rejected", batch.len());
                tracing::warn!(
                    status = %res.status(),
                    dropped = batch.len(),
                    "telemetry flush rejected"
                );
            }
            Err(e) => {
                metrics::record_telemetry_flush("error", batch.len());
                tracing::debug!(error = %e, dropped = batch.len(), "telemetry flush error");
            }
        }
    }
}
