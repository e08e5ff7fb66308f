//! Boundary state machine vocabulary

use estate_core::ErrorCategory;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one boundary instance.
///
/// ```text
/// Clean ──fail──► Caught ──retry──► Recovering ──ok──► Clean
///                   ▲                   │
///                   └──────fail─────────┤
///                                       └─fail, retries spent──► Exhausted
/// ```
///
/// `Degraded` is entered instead of `Caught` by a UI boundary in graceful
/// degradation mode and never left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryState {
    /// Children render
    Clean,
    /// A failure was intercepted; fallback shown
    Caught,
    /// A recovery attempt is in flight; retry controls disabled
    Recovering,
    /// Retries spent; only a page reload remains
    Exhausted,
    /// Caller-supplied substitute rendered permanently
    Degraded,
}

impl fmt::Display for BoundaryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Clean => "clean",
            Self::Caught => "caught",
            Self::Recovering => "recovering",
            Self::Exhausted => "exhausted",
            Self::Degraded => "degraded",
        };
        f.write_str(s)
    }
}

/// The four boundary variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryKind {
    /// Wallet connection and chain failures
    Wallet,
    /// Connectivity-aware boundary with backoff
    Network,
    /// Device-capability gated boundary
    AugmentedReality,
    /// Everything else
    Ui,
}

impl BoundaryKind {
    /// Variant serving `category`.
    pub fn for_category(category: Option<ErrorCategory>) -> Self {
        match category {
            Some(ErrorCategory::WalletChain) => Self::Wallet,
            Some(ErrorCategory::Network) => Self::Network,
            Some(ErrorCategory::AugmentedReality) => Self::AugmentedReality,
            _ => Self::Ui,
        }
    }

    /// Category forced onto uncategorized failures.
    pub fn default_category(&self) -> ErrorCategory {
        match self {
            Self::Wallet => ErrorCategory::WalletChain,
            Self::Network => ErrorCategory::Network,
            Self::AugmentedReality => ErrorCategory::AugmentedReality,
            Self::Ui => ErrorCategory::Ui,
        }
    }

    /// Name recorded as the component stack of captured failures.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Wallet => "WalletBoundary",
            Self::Network => "NetworkBoundary",
            Self::AugmentedReality => "ArBoundary",
            Self::Ui => "UiBoundary",
        }
    }

    pub(crate) fn title(&self) -> &'static str {
        match self {
            Self::Wallet => "Wallet Connection Error",
            Self::Network => "Connection Problem",
            Self::AugmentedReality => "AR Experience Unavailable",
            Self::Ui => "Something Went Wrong",
        }
    }

    pub(crate) fn help(&self) -> &'static [&'static str] {
        match self {
            Self::Wallet => &[
                "Make sure your wallet extension is unlocked.",
                "Check that your wallet is connected to the supported network.",
            ],
            Self::Network => &[
                "Check your internet connection.",
                "The page will retry automatically when you are back online.",
            ],
            Self::AugmentedReality => &[
                "AR previews need a camera, motion sensors and a browser with WebXR support.",
                "You can still browse the listing photos and floor plans.",
            ],
            Self::Ui => &["Reloading the page usually fixes this."],
        }
    }
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// User-triggerable fallback controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryAction {
    /// Run the record's recovery action
    Retry,
    /// Clear persisted wallet flags and reload
    Reconnect,
    /// Ask the wallet for the record's target chain
    SwitchNetwork,
    /// Full reload; always available
    ReloadPage,
}

impl BoundaryAction {
    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Retry => "Try Again",
            Self::Reconnect => "Reconnect Wallet",
            Self::SwitchNetwork => "Switch Network",
            Self::ReloadPage => "Reload Page",
        }
    }
}
