//! Liveness probing

use async_trait::async_trait;

/// Why a liveness probe reported offline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// No response
    #[error("health probe unreachable: {0}")]
    Unreachable(String),
    /// Non-2xx response
    #[error("health probe returned status {0}")]
    Status(u16),
}

/// A single liveness check (a `HEAD` request in production).
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// `Ok` means online.
    async fn check(&self) -> Result<(), ProbeError>;
}
