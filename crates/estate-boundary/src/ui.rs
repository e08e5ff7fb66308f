//! Generic UI boundary

use crate::machine::{BoundaryContext, BoundaryCore};
use crate::error::RenderError;
use crate::state::{BoundaryAction, BoundaryKind, BoundaryState};
use crate::view::Rendered;
use estate_core::{ErrorCategory, Severity};

/// Default boundary for every category without a dedicated variant.
///
/// In graceful degradation mode a non-critical failure swaps the children for
/// a caller-supplied substitute permanently, bypassing the retry flow.
#[derive(Debug)]
pub struct UiBoundary {
    core: BoundaryCore,
    graceful: bool,
}

impl UiBoundary {
    /// Create a UI boundary forcing `category` onto uncategorized failures.
    pub fn new(category: ErrorCategory, ctx: BoundaryContext) -> Self {
        Self {
            core: BoundaryCore::new(BoundaryKind::Ui, category, ctx),
            graceful: false,
        }
    }

    /// Enable graceful degradation.
    pub fn graceful(mut self) -> Self {
        self.graceful = true;
        self
    }

    /// Shared state machine.
    pub fn core(&self) -> &BoundaryCore {
        &self.core
    }

    /// Render `child`, or the fallback once a failure is intercepted.
    pub fn render<T, E, F>(&self, child: F) -> Rendered<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<RenderError>,
    {
        self.core.render(child)
    }

    /// Render `child`; in graceful mode a non-critical failure renders
    /// `degraded()` from then on.
    pub fn render_or<T, E, F, D>(&self, child: F, degraded: D) -> Rendered<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<RenderError>,
        D: FnOnce() -> T,
    {
        if !self.graceful {
            return self.core.render(child);
        }
        match self
            .core
            .guard(child, |record| record.severity < Severity::Critical)
        {
            Ok(value) => Rendered::Children(value),
            Err(_) if self.core.state() == BoundaryState::Degraded => {
                Rendered::Degraded(degraded())
            }
            Err(record) => Rendered::Fallback(self.core.view_for(&record)),
        }
    }

    /// Handle a fallback control.
    pub async fn perform(&self, action: BoundaryAction) -> bool {
        match action {
            BoundaryAction::Retry => self.core.retry().await,
            BoundaryAction::ReloadPage => self.core.reload_page(),
            BoundaryAction::Reconnect | BoundaryAction::SwitchNetwork => false,
        }
    }
}
