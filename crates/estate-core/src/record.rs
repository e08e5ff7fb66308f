//! Error records and the closed classification taxonomy
//!
//! An [`ErrorRecord`] is the normalized description of a caught failure. Its
//! classification is two-dimensional and flat: one [`ErrorCategory`] crossed
//! with one [`Severity`]. Neither axis accepts free-form strings.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

// ============================================================================
// Categories
// ============================================================================

/// What kind of failure a record describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    /// Wallet connection or blockchain failures
    WalletChain,
    /// Connectivity and request failures
    Network,
    /// Augmented-reality capability or session failures
    AugmentedReality,
    /// Invalid user input
    Validation,
    /// Failures while producing UI output
    Ui,
    /// Identity could not be verified
    Authentication,
    /// A platform permission is missing
    Permission,
    /// A required resource could not be loaded or allocated
    Resource,
    /// Not classified
    Unknown,
}

impl ErrorCategory {
    /// Every category, in declaration order.
    pub const ALL: [ErrorCategory; 9] = [
        Self::WalletChain,
        Self::Network,
        Self::AugmentedReality,
        Self::Validation,
        Self::Ui,
        Self::Authentication,
        Self::Permission,
        Self::Resource,
        Self::Unknown,
    ];

    /// Stable wire name (matches the serde representation).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WalletChain => "wallet-chain",
            Self::Network => "network",
            Self::AugmentedReality => "augmented-reality",
            Self::Validation => "validation",
            Self::Ui => "ui",
            Self::Authentication => "authentication",
            Self::Permission => "permission",
            Self::Resource => "resource",
            Self::Unknown => "unknown",
        }
    }

    /// Short human label for panels.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::WalletChain => "Wallet",
            Self::Network => "Network",
            Self::AugmentedReality => "AR",
            Self::Validation => "Validation",
            Self::Ui => "Display",
            Self::Authentication => "Authentication",
            Self::Permission => "Permission",
            Self::Resource => "Resource",
            Self::Unknown => "Unexpected",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }

    /// Factory defaults for records of this category.
    #[must_use]
    pub fn defaults(&self) -> CategoryDefaults {
        use RecoveryAction::{
            ContactSupport, GrantPermission, Ignore, Reconnect, Refresh, Reload, Retry,
            SwitchNetwork,
        };

        let (severity, action, options, is_recoverable, should_report): (
            Severity,
            RecoveryAction,
            &'static [RecoveryAction],
            bool,
            bool,
        ) = match self {
            Self::WalletChain => (
                Severity::High,
                Reconnect,
                &[Reconnect, Reload, SwitchNetwork],
                true,
                true,
            ),
            Self::Network => (Severity::Medium, Retry, &[Retry, Refresh], true, true),
            Self::AugmentedReality => (Severity::Medium, Ignore, &[Ignore], false, true),
            Self::Validation => (Severity::Low, Ignore, &[Ignore], true, false),
            Self::Ui => (Severity::Medium, Refresh, &[Refresh, Reload], true, true),
            Self::Authentication => (Severity::High, Reconnect, &[Reconnect, Reload], true, true),
            Self::Permission => (
                Severity::Medium,
                GrantPermission,
                &[GrantPermission, Reload],
                true,
                true,
            ),
            Self::Resource => (Severity::High, Retry, &[Retry, ContactSupport], true, true),
            Self::Unknown => (Severity::Medium, Retry, &[Retry, Reload], true, true),
        };

        CategoryDefaults {
            severity,
            recovery_action: action,
            recovery_options: options,
            is_recoverable,
            should_report,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed per-category defaults applied by the factory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryDefaults {
    /// Default severity
    pub severity: Severity,
    /// Default recovery action
    pub recovery_action: RecoveryAction,
    /// Admissible recovery actions, default first
    pub recovery_options: &'static [RecoveryAction],
    /// Whether retry UI is offered
    pub is_recoverable: bool,
    /// Whether the record is forwarded to telemetry
    pub should_report: bool,
}

// ============================================================================
// Severity
// ============================================================================

/// How bad a failure is. Ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    /// Cosmetic or self-correcting
    Low,
    /// Feature degraded
    Medium,
    /// Feature unusable
    High,
    /// Application unusable
    Critical,
}

impl Severity {
    /// Every severity, least severe first.
    pub const ALL: [Severity; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Stable wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Styling hint for frontends.
    #[must_use]
    pub fn tone(&self) -> &'static str {
        match self {
            Self::Low => "info",
            Self::Medium => "warning",
            Self::High => "error",
            Self::Critical => "fatal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Recovery actions
// ============================================================================

/// A way out of a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecoveryAction {
    /// Run the caller-supplied retry hook
    Retry,
    /// Re-fetch through the retry hook
    Refresh,
    /// Reconnect the wallet (reloads the page)
    Reconnect,
    /// Reload the page
    Reload,
    /// Install a wallet extension
    InstallExtension,
    /// Ask the wallet to switch chains
    SwitchNetwork,
    /// Ask the platform for a permission
    GrantPermission,
    /// Escalate to a human
    ContactSupport,
    /// Nothing to do
    Ignore,
}

impl RecoveryAction {
    /// Stable wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retry => "retry",
            Self::Refresh => "refresh",
            Self::Reconnect => "reconnect",
            Self::Reload => "reload",
            Self::InstallExtension => "install-extension",
            Self::SwitchNetwork => "switch-network",
            Self::GrantPermission => "grant-permission",
            Self::ContactSupport => "contact-support",
            Self::Ignore => "ignore",
        }
    }

    /// Button label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Retry => "Try Again",
            Self::Refresh => "Refresh",
            Self::Reconnect => "Reconnect Wallet",
            Self::Reload => "Reload Page",
            Self::InstallExtension => "Install Wallet",
            Self::SwitchNetwork => "Switch Network",
            Self::GrantPermission => "Grant Permission",
            Self::ContactSupport => "Contact Support",
            Self::Ignore => "Dismiss",
        }
    }

    /// Whether the action does something the user can trigger from a retry control.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Self::Ignore)
    }
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Recovery hooks
// ============================================================================

/// A retry hook failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("retry failed: {0}")]
pub struct RetryFailure(pub String);

impl From<&str> for RetryFailure {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RetryFailure {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Future returned by a retry hook.
pub type RetryFuture = BoxFuture<'static, Result<(), RetryFailure>>;

type RetryFn = Arc<dyn Fn() -> RetryFuture + Send + Sync>;

/// Callables attached to a record for the recovery strategies.
///
/// Hooks never serialize; two hook sets compare equal when they share the
/// same callables.
#[derive(Clone, Default)]
pub struct RecoveryHooks {
    retry: Option<RetryFn>,
}

impl RecoveryHooks {
    /// Hooks with a retry callback.
    pub fn with_retry<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), RetryFailure>> + Send + 'static,
    {
        let retry: RetryFn = Arc::new(move || -> RetryFuture { Box::pin(f()) });
        Self { retry: Some(retry) }
    }

    /// Start the retry callback, if one is attached.
    pub fn retry(&self) -> Option<RetryFuture> {
        self.retry.as_ref().map(|f| f())
    }

    /// Whether a retry callback is attached.
    #[must_use]
    pub fn has_retry(&self) -> bool {
        self.retry.is_some()
    }
}

impl fmt::Debug for RecoveryHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryHooks")
            .field("retry", &self.retry.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl PartialEq for RecoveryHooks {
    fn eq(&self, other: &Self) -> bool {
        match (&self.retry, &other.retry) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// Free-form key/value bag carried with a record.
pub type ErrorContext = BTreeMap<String, serde_json::Value>;

/// Normalized description of a caught failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    /// Category-prefixed id, unique within a reporting session
    pub id: String,
    /// Classification axis one
    pub category: ErrorCategory,
    /// Classification axis two
    pub severity: Severity,
    /// Raw technical text
    pub message: String,
    /// Human-readable translation of `message`
    pub user_message: String,
    /// Extra diagnostics (error source chain, etc.)
    pub technical_details: Option<String>,
    /// Captured backtrace
    pub stack: Option<String>,
    /// Which boundary/component caught the failure
    pub component_stack: Option<String>,
    /// Suggested recovery; always a member of `recovery_options`
    pub recovery_action: Option<RecoveryAction>,
    /// Admissible recoveries, preferred first
    pub recovery_options: Vec<RecoveryAction>,
    /// Gate for any retry UI
    pub is_recoverable: bool,
    /// Gate for telemetry forwarding
    pub should_report: bool,
    /// Creation time in milliseconds since the Unix epoch
    pub timestamp_ms: u64,
    /// Free-form context
    #[serde(default)]
    pub context: ErrorContext,
    /// Recovery callables
    #[serde(skip)]
    pub hooks: RecoveryHooks,
}

impl ErrorRecord {
    /// Context key holding the chain id for `switch-network`.
    pub const TARGET_CHAIN_ID: &'static str = "targetChainId";

    /// Context key holding the permission name for `grant-permission`.
    pub const PERMISSION_NAME: &'static str = "permission";

    /// Copy of this record with a different suggested recovery.
    ///
    /// Returns `None` when `action` is not one of the record's options.
    #[must_use]
    pub fn with_recovery_action(&self, action: RecoveryAction) -> Option<Self> {
        if !self.recovery_options.contains(&action) {
            return None;
        }
        let mut record = self.clone();
        record.recovery_action = Some(action);
        Some(record)
    }

    /// Target chain id from the context, accepting numbers and `0x` hex strings.
    #[must_use]
    pub fn target_chain_id(&self) -> Option<u64> {
        match self.context.get(Self::TARGET_CHAIN_ID)? {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => match s.strip_prefix("0x") {
                Some(hex) => u64::from_str_radix(hex, 16).ok(),
                None => s.parse().ok(),
            },
            _ => None,
        }
    }

    /// Permission name from the context.
    #[must_use]
    pub fn permission_name(&self) -> Option<&str> {
        self.context.get(Self::PERMISSION_NAME)?.as_str()
    }

    /// Whether a retry control may be offered for this record at all.
    #[must_use]
    pub fn offers_retry(&self) -> bool {
        self.is_recoverable && self.recovery_action.is_some_and(|a| a.is_actionable())
    }
}
