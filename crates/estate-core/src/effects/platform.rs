//! Host platform capabilities consumed by recovery strategies and boundaries
//!
//! These are opaque capability probes: the pipeline only looks at the
//! outcome, never at how the host produced it.

use crate::errors::EstateResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Persisted flags that record a wallet connection. Cleared on reconnect.
pub const WALLET_PERSISTED_FLAGS: &[&str] = &[
    "walletconnect",
    "wallet.connected",
    "wallet.lastProvider",
];

/// Page navigation and persisted client state.
pub trait NavigationEffects: Send + Sync {
    /// Request a full reload. Hosts never return control to the page that
    /// asked; headless hosts record the request.
    fn reload(&self);

    /// Location reported with telemetry.
    fn current_url(&self) -> String;

    /// Remove persisted flags by key.
    fn clear_persisted_flags(&self, keys: &[&str]);
}

/// Wallet provider failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// No injected provider
    #[error("no wallet provider available")]
    NoProvider,
    /// The provider refused the request
    #[error("wallet rejected request: {0}")]
    Rejected(String),
}

/// Injected wallet provider.
#[async_trait]
pub trait WalletEffects: Send + Sync {
    /// Ask the wallet to switch to `chain_id`.
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;
}

/// Result of a permissions query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// Already granted
    Granted,
    /// A request can be shown to the user
    Prompt,
    /// Denied; no prompt possible
    Denied,
}

/// Platform permissions API.
#[async_trait]
pub trait PermissionEffects: Send + Sync {
    /// Query the state of a named permission (e.g. `"camera"`).
    async fn query_permission(&self, name: &str) -> EstateResult<PermissionState>;
}

/// Device capability probes used by the AR boundary.
#[async_trait]
pub trait DeviceEffects: Send + Sync {
    /// Camera can be opened.
    async fn has_camera_access(&self) -> bool;

    /// Orientation events are delivered.
    async fn has_gyroscope(&self) -> bool;

    /// Motion events are delivered.
    async fn has_accelerometer(&self) -> bool;

    /// An immersive AR session is supported.
    async fn supports_xr_session(&self) -> bool;
}
