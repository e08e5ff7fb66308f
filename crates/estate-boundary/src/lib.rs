//! # Estate Boundary - Error Boundaries
//!
//! Boundaries guard a render closure. When the closure returns `Err` or
//! panics, the failure is classified by the reporting service's factory,
//! reported, and replaced by a headless [`FallbackView`] with recovery
//! controls.
//!
//! ## Variants
//!
//! - [`WalletBoundary`]: reconnect (clear wallet flags, reload) and chain switch
//! - [`NetworkBoundary`]: exponential backoff, automatic recovery when
//!   [`ConnectivityMonitor`] reports the connection is back
//! - [`ArBoundary`]: device capability probing that can preempt children
//! - [`UiBoundary`]: everything else, with optional graceful degradation
//!
//! [`ErrorBoundary`] selects a variant from an optional category.
//!
//! Retries are serialized per boundary; sibling boundaries recover
//! independently.

#![forbid(unsafe_code)]

pub mod ar;
pub mod connectivity;
pub mod dispatch;
pub mod error;
pub mod machine;
pub mod network;
pub mod state;
pub mod ui;
pub mod view;
pub mod wallet;

pub use ar::ArBoundary;
pub use connectivity::ConnectivityMonitor;
pub use dispatch::ErrorBoundary;
pub use error::RenderError;
pub use machine::{BoundaryContext, BoundaryCore};
pub use network::{backoff_delay_ms, NetworkBoundary};
pub use state::{BoundaryAction, BoundaryKind, BoundaryState};
pub use ui::UiBoundary;
pub use view::{ActionButton, CapabilityCheck, CapabilityPanel, FallbackView, Rendered};
pub use wallet::WalletBoundary;
