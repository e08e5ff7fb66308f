//! The reporting service
//!
//! One instance per application, constructed at start-up and shared by
//! handle with every boundary. It owns the record store, the metrics, the
//! per-record attempt counters and the telemetry sink.

use crate::metrics::{ErrorMetrics, RecoveryTally};
use crate::recovery::{run_strategy, Outcome};
use crate::store::RecordStore;
use estate_core::effects::{
    ClockEffects, NavigationEffects, PlatformEffects, TelemetryPayload, TelemetrySink,
};
use estate_core::{ids, ErrorFactory, ErrorRecord, ReportingSettings, Severity};
use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug)]
struct ServiceState {
    store: RecordStore,
    metrics: ErrorMetrics,
    attempts: HashMap<String, u32>,
    tally: RecoveryTally,
}

impl ServiceState {
    fn new(capacity: usize) -> Self {
        Self {
            store: RecordStore::new(capacity),
            metrics: ErrorMetrics::new(),
            attempts: HashMap::new(),
            tally: RecoveryTally::default(),
        }
    }
}

/// Records errors, aggregates metrics, forwards telemetry and runs recovery.
pub struct ReportingService {
    settings: ReportingSettings,
    platform: Arc<dyn PlatformEffects>,
    sink: Option<Arc<dyn TelemetrySink>>,
    factory: ErrorFactory,
    session_id: String,
    state: Mutex<ServiceState>,
}

impl ReportingService {
    /// Create a service. Telemetry is forwarded only when `sink` is present
    /// and the environment is production.
    pub fn new(
        settings: ReportingSettings,
        platform: Arc<dyn PlatformEffects>,
        sink: Option<Arc<dyn TelemetrySink>>,
    ) -> Self {
        let clock: Arc<dyn ClockEffects> = Arc::new(platform.clone());
        let session_id = ids::session_id(platform.now_ms());
        info!(
            %session_id,
            environment = ?settings.environment,
            telemetry = sink.is_some(),
            "Reporting service started"
        );
        Self {
            state: Mutex::new(ServiceState::new(settings.max_retained_records)),
            settings,
            platform,
            sink,
            factory: ErrorFactory::new(clock),
            session_id,
        }
    }

    /// Factory sharing this service's clock.
    pub fn factory(&self) -> &ErrorFactory {
        &self.factory
    }

    /// Host platform handle.
    pub fn platform(&self) -> &Arc<dyn PlatformEffects> {
        &self.platform
    }

    /// Settings in effect.
    pub fn settings(&self) -> &ReportingSettings {
        &self.settings
    }

    /// Identifier of this service instance, sent with every payload.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Store `record`, update metrics and forward telemetry when enabled.
    pub fn report_error(&self, record: ErrorRecord) {
        log_record(&record);

        let payload = (record.should_report && self.settings.environment.is_production()).then(|| {
            TelemetryPayload::from_record(
                &record,
                self.settings.user_agent.clone(),
                self.platform.current_url(),
                self.session_id.clone(),
            )
        });

        {
            let mut state = self.state.lock();
            state.metrics.record(&record);
            if let Some(evicted) = state.store.insert(record) {
                state.attempts.remove(&evicted.id);
                debug!(error_id = %evicted.id, "Evicted oldest error record");
            }
        }

        if let Some(payload) = payload {
            self.forward(payload);
        }
    }

    fn forward(&self, payload: TelemetryPayload) {
        let Some(sink) = self.sink.clone() else {
            debug!(error_id = %payload.error_id, "No telemetry sink configured");
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(error_id = %payload.error_id, "No async runtime; telemetry dropped");
            return;
        };
        handle.spawn(async move {
            if let Err(e) = sink.deliver(&payload).await {
                warn!(error_id = %payload.error_id, error = %e, "Failed to report error");
            }
        });
    }

    /// Run the record's recovery strategy. Never fails: every problem,
    /// including a panicking hook, yields `false`.
    pub async fn attempt_recovery(&self, record: &ErrorRecord) -> bool {
        let action = match record.recovery_action {
            Some(action) if record.is_recoverable => action,
            _ => {
                debug!(error_id = %record.id, "Record is not recoverable");
                return false;
            }
        };

        {
            let mut state = self.state.lock();
            let attempts = state.attempts.entry(record.id.clone()).or_insert(0);
            if *attempts >= self.settings.max_recovery_attempts {
                warn!(
                    error_id = %record.id,
                    attempts = *attempts,
                    "Recovery attempts exhausted"
                );
                return false;
            }
            let first = *attempts == 0;
            *attempts += 1;
            if first {
                state.tally.record_attempt();
            }
        }

        let outcome = AssertUnwindSafe(run_strategy(self.platform.as_ref(), record, action))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Outcome::Failed("recovery strategy panicked".to_string()));

        let mut state = self.state.lock();
        match &outcome {
            Outcome::Recovered => {
                state.attempts.remove(&record.id);
                state.tally.record_recovery();
                info!(error_id = %record.id, %action, "Recovery succeeded");
            }
            Outcome::Failed(reason) => {
                warn!(error_id = %record.id, %action, %reason, "Recovery failed");
            }
        }
        state.metrics.recovery_success_rate = state.tally.rate();
        outcome.is_recovered()
    }

    /// Snapshot of the metrics.
    pub fn get_metrics(&self) -> ErrorMetrics {
        self.state.lock().metrics.clone()
    }

    /// Look up a retained record.
    pub fn get_error(&self, id: &str) -> Option<ErrorRecord> {
        self.state.lock().store.get(id).cloned()
    }

    /// Up to `limit` retained records, newest first.
    pub fn recent_errors(&self, limit: usize) -> Vec<ErrorRecord> {
        self.state.lock().store.recent(limit)
    }

    /// Number of retained records.
    pub fn retained(&self) -> usize {
        self.state.lock().store.len()
    }

    /// Drop every record and attempt counter and zero the metrics.
    pub fn clear_errors(&self) {
        let mut state = self.state.lock();
        state.store.clear();
        state.metrics = ErrorMetrics::new();
        state.attempts.clear();
        state.tally = RecoveryTally::default();
        debug!("Error records cleared");
    }
}

impl std::fmt::Debug for ReportingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportingService")
            .field("session_id", &self.session_id)
            .field("settings", &self.settings)
            .field("telemetry", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

fn log_record(record: &ErrorRecord) {
    let category = record.category.as_str();
    match record.severity {
        Severity::Low => {
            debug!(error_id = %record.id, category, message = %record.message, "Error reported")
        }
        Severity::Medium => {
            info!(error_id = %record.id, category, message = %record.message, "Error reported")
        }
        Severity::High => {
            warn!(error_id = %record.id, category, message = %record.message, "Error reported")
        }
        Severity::Critical => {
            error!(error_id = %record.id, category, message = %record.message, "Error reported")
        }
    }
}
