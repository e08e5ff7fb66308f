//! In-memory telemetry sink

use async_trait::async_trait;
use estate_core::effects::{TelemetryError, TelemetryPayload, TelemetrySink};
use parking_lot::Mutex;
use std::time::Duration;

/// Records delivered payloads; optionally fails every delivery.
#[derive(Debug, Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<TelemetryPayload>>,
    attempts: Mutex<usize>,
    failure: Option<TelemetryError>,
}

impl RecordingSink {
    /// Sink that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that rejects every payload with `error`.
    pub fn failing(error: TelemetryError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Payloads accepted so far.
    pub fn delivered(&self) -> Vec<TelemetryPayload> {
        self.delivered.lock().clone()
    }

    /// Deliveries attempted, successful or not.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }

    /// Wait until at least `n` deliveries were attempted, or give up after
    /// roughly one second. Returns whether the count was reached.
    pub async fn wait_for(&self, n: usize) -> bool {
        for _ in 0..200 {
            if self.attempts() >= n {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.attempts() >= n
    }
}

#[async_trait]
impl TelemetrySink for RecordingSink {
    async fn deliver(&self, payload: &TelemetryPayload) -> Result<(), TelemetryError> {
        *self.attempts.lock() += 1;
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.delivered.lock().push(payload.clone());
        Ok(())
    }
}
