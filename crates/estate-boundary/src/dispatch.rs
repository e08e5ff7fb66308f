//! Category dispatch
//!
//! Selection is static: the caller names a category up front, and the
//! boundary never inspects the failure it later catches to pick a variant.

use crate::ar::ArBoundary;
use crate::machine::{BoundaryContext, BoundaryCore};
use crate::error::RenderError;
use crate::network::NetworkBoundary;
use crate::state::{BoundaryAction, BoundaryKind, BoundaryState};
use crate::ui::UiBoundary;
use crate::view::{FallbackView, Rendered};
use crate::wallet::WalletBoundary;
use estate_core::ErrorCategory;

/// One boundary of any variant.
#[derive(Debug)]
pub enum ErrorBoundary {
    /// Wallet/chain failures
    Wallet(WalletBoundary),
    /// Network failures
    Network(NetworkBoundary),
    /// AR failures and capability gaps
    AugmentedReality(ArBoundary),
    /// Everything else
    Ui(UiBoundary),
}

impl ErrorBoundary {
    /// Pick the variant for `category`; no category means the UI boundary.
    pub fn for_category(category: Option<ErrorCategory>, ctx: BoundaryContext) -> Self {
        match BoundaryKind::for_category(category) {
            BoundaryKind::Wallet => Self::Wallet(WalletBoundary::new(ctx)),
            BoundaryKind::Network => Self::Network(NetworkBoundary::new(ctx)),
            BoundaryKind::AugmentedReality => Self::AugmentedReality(ArBoundary::new(ctx)),
            BoundaryKind::Ui => Self::Ui(UiBoundary::new(
                category.unwrap_or(ErrorCategory::Ui),
                ctx,
            )),
        }
    }

    /// Shared state machine of the selected variant.
    pub fn core(&self) -> &BoundaryCore {
        match self {
            Self::Wallet(b) => b.core(),
            Self::Network(b) => b.core(),
            Self::AugmentedReality(b) => b.core(),
            Self::Ui(b) => b.core(),
        }
    }

    /// Selected variant.
    pub fn kind(&self) -> BoundaryKind {
        self.core().kind()
    }

    /// Current state.
    pub fn state(&self) -> BoundaryState {
        self.core().state()
    }

    /// Run mount-time probing. Only the AR boundary probes anything.
    pub async fn mount(&self) {
        if let Self::AugmentedReality(b) = self {
            b.mount().await;
        }
    }

    /// Render `child` through the selected variant.
    pub fn render<T, E, F>(&self, child: F) -> Rendered<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<RenderError>,
    {
        match self {
            Self::Wallet(b) => b.render(child),
            Self::Network(b) => b.render(child),
            Self::AugmentedReality(b) => b.render(child),
            Self::Ui(b) => b.render(child),
        }
    }

    /// Render `child`, substituting `degraded()` when a graceful UI boundary
    /// intercepts a non-critical failure. Other variants ignore `degraded`.
    pub fn render_or<T, E, F, D>(&self, child: F, degraded: D) -> Rendered<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<RenderError>,
        D: FnOnce() -> T,
    {
        match self {
            Self::Ui(b) => b.render_or(child, degraded),
            other => other.render(child),
        }
    }

    /// Follow connectivity changes until the monitor goes away. Only the
    /// network boundary recovers on its own; other variants return at once.
    pub async fn auto_recover(&self) {
        if let Self::Network(b) = self {
            b.auto_recover().await;
        }
    }

    /// Fallback panel of the selected variant.
    pub fn fallback(&self) -> Option<FallbackView> {
        match self {
            Self::Network(b) => b.fallback(),
            other => other.core().fallback(),
        }
    }

    /// Retry with the variant's retry policy.
    pub async fn retry(&self) -> bool {
        self.perform(BoundaryAction::Retry).await
    }

    /// Handle a fallback control.
    pub async fn perform(&self, action: BoundaryAction) -> bool {
        match self {
            Self::Wallet(b) => b.perform(action).await,
            Self::Network(b) => b.perform(action).await,
            Self::AugmentedReality(b) => b.perform(action).await,
            Self::Ui(b) => b.perform(action).await,
        }
    }
}
