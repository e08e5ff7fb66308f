//! Shared boundary state machine
//!
//! Every variant wraps a [`BoundaryCore`]. The core guards child renders,
//! classifies and reports failures, and serializes recovery attempts: a
//! retry requested while another is in flight is ignored.

use crate::connectivity::ConnectivityMonitor;
use crate::error::{panic_message, RenderError};
use crate::state::{BoundaryKind, BoundaryState};
use crate::view::{FallbackView, Rendered};
use estate_core::effects::{ClockEffects, NavigationEffects};
use estate_core::{BoundarySettings, ErrorCategory, ErrorOptions, ErrorRecord, RecoveryAction};
use estate_reporting::ReportingService;
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info};

/// Everything a boundary needs from the application.
#[derive(Clone, Debug)]
pub struct BoundaryContext {
    /// Shared reporting service
    pub service: Arc<ReportingService>,
    /// Retry and backoff limits
    pub settings: BoundarySettings,
    /// Online/offline state consumed by network boundaries
    pub connectivity: Arc<ConnectivityMonitor>,
}

impl BoundaryContext {
    /// Context with default settings and an online monitor.
    pub fn new(service: Arc<ReportingService>) -> Self {
        Self {
            service,
            settings: BoundarySettings::default(),
            connectivity: Arc::new(ConnectivityMonitor::new(true)),
        }
    }

    /// Replace the boundary settings.
    pub fn with_settings(mut self, settings: BoundarySettings) -> Self {
        self.settings = settings;
        self
    }

    /// Share `monitor` with every network boundary built from this context.
    pub fn with_connectivity(mut self, monitor: Arc<ConnectivityMonitor>) -> Self {
        self.connectivity = monitor;
        self
    }
}

#[derive(Debug)]
struct Inner {
    state: BoundaryState,
    error: Option<ErrorRecord>,
    retry_count: u32,
}

/// State machine shared by every boundary variant.
#[derive(Debug)]
pub struct BoundaryCore {
    kind: BoundaryKind,
    category: ErrorCategory,
    ctx: BoundaryContext,
    inner: Mutex<Inner>,
}

impl BoundaryCore {
    /// Core forcing `category` onto uncategorized failures.
    pub fn new(kind: BoundaryKind, category: ErrorCategory, ctx: BoundaryContext) -> Self {
        Self {
            kind,
            category,
            ctx,
            inner: Mutex::new(Inner {
                state: BoundaryState::Clean,
                error: None,
                retry_count: 0,
            }),
        }
    }

    /// Variant owning this core.
    pub fn kind(&self) -> BoundaryKind {
        self.kind
    }

    /// Category forced onto uncategorized failures.
    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    /// Current state.
    pub fn state(&self) -> BoundaryState {
        self.inner.lock().state
    }

    /// Failed retries since the last clean render.
    pub fn retry_count(&self) -> u32 {
        self.inner.lock().retry_count
    }

    /// The intercepted failure, if any.
    pub fn error(&self) -> Option<ErrorRecord> {
        self.inner.lock().error.clone()
    }

    /// Application context.
    pub fn context(&self) -> &BoundaryContext {
        &self.ctx
    }

    /// Reporting service.
    pub fn service(&self) -> &Arc<ReportingService> {
        &self.ctx.service
    }

    /// Run `child` unless a failure is already intercepted.
    ///
    /// `Err` results and panics are classified, reported and stored; the
    /// boundary enters `Caught`, or `Degraded` when `degrade` accepts the
    /// record.
    pub(crate) fn guard<T, E, F>(
        &self,
        child: F,
        degrade: impl FnOnce(&ErrorRecord) -> bool,
    ) -> Result<T, ErrorRecord>
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<RenderError>,
    {
        if let Some(record) = self.inner.lock().error.clone() {
            return Err(record);
        }

        let failure = match catch_unwind(AssertUnwindSafe(child)) {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e.into(),
            Err(payload) => RenderError::Message(panic_message(payload.as_ref())),
        };

        let record = self.classify(failure);
        self.ctx.service.report_error(record.clone());

        let next = if degrade(&record) {
            BoundaryState::Degraded
        } else {
            BoundaryState::Caught
        };
        let mut inner = self.inner.lock();
        inner.state = next;
        inner.error = Some(record.clone());
        debug!(
            boundary = %self.kind,
            error_id = %record.id,
            category = %record.category,
            state = %next,
            "Boundary intercepted failure"
        );
        Err(record)
    }

    fn classify(&self, failure: RenderError) -> ErrorRecord {
        let factory = self.ctx.service.factory();
        let options = || ErrorOptions::new().component_stack(self.kind.name());
        match failure {
            RenderError::Record(record) => record,
            RenderError::Error(e) => factory.from_error(&*e, Some(self.category), options()),
            RenderError::Message(message) => {
                factory.from_message(message, Some(self.category), options())
            }
        }
    }

    /// Render `child`, or the fallback panel once a failure is intercepted.
    pub fn render<T, E, F>(&self, child: F) -> Rendered<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<RenderError>,
    {
        match self.guard(child, |_| false) {
            Ok(value) => Rendered::Children(value),
            Err(record) => Rendered::Fallback(self.view_for(&record)),
        }
    }

    /// Fallback panel for the intercepted failure.
    pub fn fallback(&self) -> Option<FallbackView> {
        let record = self.error()?;
        (self.state() != BoundaryState::Degraded).then(|| self.view_for(&record))
    }

    pub(crate) fn view_for(&self, record: &ErrorRecord) -> FallbackView {
        let inner = self.inner.lock();
        FallbackView::build(
            self.kind,
            record,
            inner.state,
            inner.retry_count,
            self.ctx.settings.max_retries,
            !self.ctx.service.settings().environment.is_production(),
        )
    }

    /// Request a full page reload. Always available.
    pub fn reload_page(&self) -> bool {
        info!(boundary = %self.kind, "Page reload requested from fallback");
        self.ctx.service.platform().reload();
        true
    }

    /// Run the intercepted record's recovery action once.
    pub async fn retry(&self) -> bool {
        self.retry_after(|_| 0).await
    }

    /// Like [`retry`](Self::retry), sleeping `delay(retry_count)` ms first.
    /// The boundary is `Recovering` during the delay.
    pub(crate) async fn retry_after(&self, delay: impl FnOnce(u32) -> u64) -> bool {
        let Some((record, attempt)) = self.begin_recovery() else {
            return false;
        };

        let wait = delay(attempt);
        if wait > 0 {
            debug!(boundary = %self.kind, retry_count = attempt, delay_ms = wait, "Backing off");
            self.ctx.service.platform().sleep_ms(wait).await;
        }

        let recovered = self.ctx.service.attempt_recovery(&record).await;
        self.finish_recovery(recovered);
        recovered
    }

    /// Run a specific recovery `action` for the intercepted record, subject
    /// to the same serialization and retry accounting as [`retry`](Self::retry).
    pub(crate) async fn recover_with(&self, action: RecoveryAction) -> bool {
        let Some((record, _)) = self.begin_recovery() else {
            return false;
        };
        let recovered = match record.with_recovery_action(action) {
            Some(targeted) => self.ctx.service.attempt_recovery(&targeted).await,
            None => false,
        };
        self.finish_recovery(recovered);
        recovered
    }

    fn begin_recovery(&self) -> Option<(ErrorRecord, u32)> {
        let mut inner = self.inner.lock();
        if inner.state != BoundaryState::Caught {
            debug!(boundary = %self.kind, state = %inner.state, "Retry ignored");
            return None;
        }
        let record = inner.error.clone()?;
        if !record.is_recoverable {
            return None;
        }
        if inner.retry_count >= self.ctx.settings.max_retries {
            inner.state = BoundaryState::Exhausted;
            return None;
        }
        inner.state = BoundaryState::Recovering;
        debug!(
            boundary = %self.kind,
            error_id = %record.id,
            retry_count = inner.retry_count,
            "Boundary recovering"
        );
        Some((record, inner.retry_count))
    }

    fn finish_recovery(&self, recovered: bool) {
        let mut inner = self.inner.lock();
        if recovered {
            inner.state = BoundaryState::Clean;
            inner.error = None;
            inner.retry_count = 0;
        } else {
            inner.retry_count += 1;
            inner.state = if inner.retry_count >= self.ctx.settings.max_retries {
                BoundaryState::Exhausted
            } else {
                BoundaryState::Caught
            };
        }
        debug!(
            boundary = %self.kind,
            state = %inner.state,
            retry_count = inner.retry_count,
            "Recovery resolved"
        );
    }

    /// Drop the intercepted failure and render children again.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.state = BoundaryState::Clean;
        inner.error = None;
        inner.retry_count = 0;
        debug!(boundary = %self.kind, "Boundary reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_core::{EstateError, ReportingSettings};
    use estate_testkit::MockPlatform;

    fn core(kind: BoundaryKind) -> BoundaryCore {
        let service = Arc::new(ReportingService::new(
            ReportingSettings::default(),
            Arc::new(MockPlatform::new()),
            None,
        ));
        BoundaryCore::new(kind, kind.default_category(), BoundaryContext::new(service))
    }

    #[test]
    fn test_error_values_take_boundary_category() {
        let core = core(BoundaryKind::Network);
        let result = core.render(|| Err::<(), _>(EstateError::platform("socket closed")));
        assert!(result.fallback().is_some());

        let record = core.error().unwrap();
        assert_eq!(record.category, ErrorCategory::Network);
        assert_eq!(record.message, "Platform error: socket closed");
        assert_eq!(core.state(), BoundaryState::Caught);
        assert_eq!(core.service().get_metrics().total_errors, 1);
    }

    #[test]
    fn test_reset_returns_to_clean() {
        let core = core(BoundaryKind::Ui);
        core.render(|| Err::<(), _>("broken"));
        core.reset();
        assert_eq!(core.state(), BoundaryState::Clean);
        assert!(core.fallback().is_none());
        assert_eq!(core.render(|| Ok::<_, &str>(5)).children(), Some(5));
    }

    #[tokio::test]
    async fn test_retry_ignored_when_clean() {
        let core = core(BoundaryKind::Ui);
        assert!(!core.retry().await);
        assert_eq!(core.retry_count(), 0);
    }
}
