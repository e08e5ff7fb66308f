//! Wallet/chain boundary

use crate::machine::{BoundaryContext, BoundaryCore};
use crate::error::RenderError;
use crate::state::{BoundaryAction, BoundaryKind};
use crate::view::Rendered;
use estate_core::effects::{NavigationEffects, WALLET_PERSISTED_FLAGS};
use estate_core::RecoveryAction;
use tracing::info;

/// Forces `wallet-chain` onto uncategorized failures and adds reconnect and
/// chain-switch controls to the fallback.
#[derive(Debug)]
pub struct WalletBoundary {
    core: BoundaryCore,
}

impl WalletBoundary {
    /// Create a wallet boundary.
    pub fn new(ctx: BoundaryContext) -> Self {
        let kind = BoundaryKind::Wallet;
        Self {
            core: BoundaryCore::new(kind, kind.default_category(), ctx),
        }
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

    /// Forget persisted wallet connection state and reload. The reloaded
    /// page starts from a clean boundary.
    pub fn reconnect(&self) -> bool {
        let platform = self.core.service().platform();
        platform.clear_persisted_flags(WALLET_PERSISTED_FLAGS);
        info!("Wallet reconnect requested");
        platform.reload();
        self.core.reset();
        true
    }

    /// Ask the wallet for the intercepted record's target chain.
    pub async fn switch_network(&self) -> bool {
        self.core.recover_with(RecoveryAction::SwitchNetwork).await
    }

    /// Handle a fallback control.
    pub async fn perform(&self, action: BoundaryAction) -> bool {
        match action {
            BoundaryAction::Retry => self.core.retry().await,
            BoundaryAction::Reconnect => self.reconnect(),
            BoundaryAction::SwitchNetwork => self.switch_network().await,
            BoundaryAction::ReloadPage => self.core.reload_page(),
        }
    }
}
