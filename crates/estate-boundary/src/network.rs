//! Connectivity-aware boundary

use crate::machine::{BoundaryContext, BoundaryCore};
use crate::error::RenderError;
use crate::state::{BoundaryAction, BoundaryKind, BoundaryState};
use crate::view::{FallbackView, Rendered};
use estate_core::BoundarySettings;
use tracing::{debug, info};

/// Delay before retry number `retry_count`: `min(base * 2^retry_count, cap)`.
pub fn backoff_delay_ms(settings: &BoundarySettings, retry_count: u32) -> u64 {
    let factor = 2u64.checked_pow(retry_count).unwrap_or(u64::MAX);
    settings
        .backoff_base_ms
        .saturating_mul(factor)
        .min(settings.backoff_cap_ms)
}

/// Forces `network` onto uncategorized failures, retries with exponential
/// backoff and recovers on its own when connectivity returns.
#[derive(Debug)]
pub struct NetworkBoundary {
    core: BoundaryCore,
}

impl NetworkBoundary {
    /// Create a network boundary observing the context's connectivity monitor.
    pub fn new(ctx: BoundaryContext) -> Self {
        let kind = BoundaryKind::Network;
        Self {
            core: BoundaryCore::new(kind, kind.default_category(), ctx),
        }
    }

    /// Shared state machine.
    pub fn core(&self) -> &BoundaryCore {
        &self.core
    }

    /// Whether the monitor currently reports online.
    pub fn is_online(&self) -> bool {
        self.core.context().connectivity.is_online()
    }

    /// Render `child`, or the fallback once a failure is intercepted.
    pub fn render<T, E, F>(&self, child: F) -> Rendered<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<RenderError>,
    {
        match self.core.render(child) {
            Rendered::Fallback(view) => Rendered::Fallback(self.annotate(view)),
            other => other,
        }
    }

    /// Fallback panel, including connectivity status.
    pub fn fallback(&self) -> Option<FallbackView> {
        self.core.fallback().map(|view| self.annotate(view))
    }

    fn annotate(&self, mut view: FallbackView) -> FallbackView {
        if !self.is_online() {
            view.help.insert(0, "You appear to be offline.".to_string());
        }
        view
    }

    /// Retry after the backoff delay for the current retry count.
    pub async fn retry(&self) -> bool {
        let settings = self.core.context().settings.clone();
        self.core
            .retry_after(|retry_count| backoff_delay_ms(&settings, retry_count))
            .await
    }

    /// Handle a fallback control.
    pub async fn perform(&self, action: BoundaryAction) -> bool {
        match action {
            BoundaryAction::Retry => self.retry().await,
            BoundaryAction::ReloadPage => self.core.reload_page(),
            BoundaryAction::Reconnect | BoundaryAction::SwitchNetwork => false,
        }
    }

    /// Watch the connectivity monitor and retry whenever it goes from
    /// offline to online while a failure is intercepted. Returns when the
    /// monitor is dropped.
    pub async fn auto_recover(&self) {
        let mut rx = self.core.context().connectivity.subscribe();
        let mut online = *rx.borrow_and_update();
        while rx.changed().await.is_ok() {
            let now = *rx.borrow_and_update();
            let reconnected = !online && now;
            online = now;
            if reconnected && self.core.state() == BoundaryState::Caught {
                info!("Connectivity restored; retrying");
                let recovered = self.retry().await;
                debug!(recovered, "Automatic recovery finished");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_backoff_schedule() {
        let settings = BoundarySettings::default();
        let delays: Vec<_> = (0..7).map(|n| backoff_delay_ms(&settings, n)).collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16000, 30000, 30000]);
    }

    proptest! {
        #[test]
        fn backoff_is_capped_and_monotone(n in 0u32..200) {
            let settings = BoundarySettings::default();
            let d = backoff_delay_ms(&settings, n);
            prop_assert!(d <= settings.backoff_cap_ms);
            prop_assert!(backoff_delay_ms(&settings, n + 1) >= d);
        }
    }
}
