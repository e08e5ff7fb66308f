//! Recovery strategy dispatch
//!
//! One strategy per recovery action. Every failure mode, including a
//! panicking retry hook, collapses into [`Outcome::Failed`]; nothing here
//! returns an error to the caller.

use estate_core::effects::{
    NavigationEffects, PermissionEffects, PermissionState, PlatformEffects, WalletEffects,
};
use estate_core::{ErrorRecord, RecoveryAction};
use tracing::debug;

/// Result of running one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The strategy reports success
    Recovered,
    /// The strategy ran and failed, or could not run
    Failed(String),
}

impl Outcome {
    fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }

    /// Whether the strategy succeeded.
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered)
    }
}

/// Run the strategy for `action` against `record`.
pub async fn run_strategy(
    platform: &dyn PlatformEffects,
    record: &ErrorRecord,
    action: RecoveryAction,
) -> Outcome {
    debug!(error_id = %record.id, %action, "Running recovery strategy");
    match action {
        RecoveryAction::Retry | RecoveryAction::Refresh => retry(record).await,
        RecoveryAction::Reconnect | RecoveryAction::Reload => {
            // Reload hands control to the host; from the caller's side it
            // always succeeds.
            platform.reload();
            Outcome::Recovered
        }
        RecoveryAction::SwitchNetwork => switch_network(platform, record).await,
        RecoveryAction::GrantPermission => grant_permission(platform, record).await,
        RecoveryAction::InstallExtension | RecoveryAction::ContactSupport | RecoveryAction::Ignore => {
            Outcome::failed(format!("no strategy for '{action}'"))
        }
    }
}

async fn retry(record: &ErrorRecord) -> Outcome {
    match record.hooks.retry() {
        Some(attempt) => match attempt.await {
            Ok(()) => Outcome::Recovered,
            Err(e) => Outcome::failed(e.to_string()),
        },
        None => Outcome::failed("no retry hook attached"),
    }
}

async fn switch_network(platform: &dyn PlatformEffects, record: &ErrorRecord) -> Outcome {
    let Some(chain_id) = record.target_chain_id() else {
        return Outcome::failed(format!(
            "context has no '{}'",
            ErrorRecord::TARGET_CHAIN_ID
        ));
    };
    match platform.switch_chain(chain_id).await {
        Ok(()) => Outcome::Recovered,
        Err(e) => Outcome::failed(e.to_string()),
    }
}

async fn grant_permission(platform: &dyn PlatformEffects, record: &ErrorRecord) -> Outcome {
    let Some(name) = record.permission_name() else {
        return Outcome::failed(format!(
            "context has no '{}'",
            ErrorRecord::PERMISSION_NAME
        ));
    };
    // Success means a prompt can be shown, not that the user granted it.
    match platform.query_permission(name).await {
        Ok(PermissionState::Prompt) => Outcome::Recovered,
        Ok(state) => Outcome::failed(format!("permission '{name}' is {state:?}")),
        Err(e) => Outcome::failed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use estate_core::effects::WalletError;
    use estate_core::ErrorCategory;
    use estate_testkit::{failing_retry, record, with_context, MockPlatform};

    #[tokio::test]
    async fn test_reload_always_succeeds() {
        let platform = MockPlatform::new();
        let r = record("w", ErrorCategory::WalletChain);
        let outcome = run_strategy(&platform, &r, RecoveryAction::Reconnect).await;
        assert!(outcome.is_recovered());
        assert_eq!(platform.reload_count(), 1);
    }

    #[tokio::test]
    async fn test_retry_without_hook_fails() {
        let platform = MockPlatform::new();
        let r = record("n", ErrorCategory::Network);
        assert_matches!(
            run_strategy(&platform, &r, RecoveryAction::Retry).await,
            Outcome::Failed(_)
        );
    }

    #[tokio::test]
    async fn test_retry_hook_failure() {
        let platform = MockPlatform::new();
        let (hooks, calls) = failing_retry();
        let mut r = record("n", ErrorCategory::Network);
        r.hooks = hooks;
        assert!(!run_strategy(&platform, &r, RecoveryAction::Refresh)
            .await
            .is_recovered());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_switch_network_uses_context_chain() {
        let platform = MockPlatform::new();
        let r = with_context(
            record("w", ErrorCategory::WalletChain),
            ErrorRecord::TARGET_CHAIN_ID,
            "0x89",
        );
        assert!(run_strategy(&platform, &r, RecoveryAction::SwitchNetwork)
            .await
            .is_recovered());
        assert_eq!(platform.chain_switches(), vec![137]);
    }

    #[tokio::test]
    async fn test_switch_network_requires_chain_and_provider() {
        let platform = MockPlatform::new().with_wallet(Err(WalletError::NoProvider));
        let bare = record("w", ErrorCategory::WalletChain);
        assert!(!run_strategy(&platform, &bare, RecoveryAction::SwitchNetwork)
            .await
            .is_recovered());
        assert!(platform.chain_switches().is_empty());

        let targeted = with_context(bare, ErrorRecord::TARGET_CHAIN_ID, 1);
        assert!(!run_strategy(&platform, &targeted, RecoveryAction::SwitchNetwork)
            .await
            .is_recovered());
    }

    #[tokio::test]
    async fn test_grant_permission_needs_prompt() {
        let r = with_context(
            record("p", ErrorCategory::Permission),
            ErrorRecord::PERMISSION_NAME,
            "camera",
        );

        let prompt = MockPlatform::new();
        assert!(run_strategy(&prompt, &r, RecoveryAction::GrantPermission)
            .await
            .is_recovered());

        let granted = MockPlatform::new().with_permission(Some(PermissionState::Granted));
        assert!(!run_strategy(&granted, &r, RecoveryAction::GrantPermission)
            .await
            .is_recovered());

        let broken = MockPlatform::new().with_permission(None);
        assert!(!run_strategy(&broken, &r, RecoveryAction::GrantPermission)
            .await
            .is_recovered());
    }

    #[tokio::test]
    async fn test_unhandled_actions_fail() {
        let platform = MockPlatform::new();
        let r = record("r", ErrorCategory::Resource);
        for action in [
            RecoveryAction::InstallExtension,
            RecoveryAction::ContactSupport,
            RecoveryAction::Ignore,
        ] {
            assert!(!run_strategy(&platform, &r, action).await.is_recovered());
        }
        assert_eq!(platform.side_effects(), 0);
    }
}
