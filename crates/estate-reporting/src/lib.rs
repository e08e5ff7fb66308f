//! # Estate Reporting - Error Reporting Service
//!
//! The single place error records are recorded, metrics aggregated and
//! recovery orchestrated.
//!
//! - [`ReportingService`]: explicit service object, shared as
//!   `Arc<ReportingService>`
//! - [`ErrorMetrics`]: per-category and per-severity counts, top recurring
//!   ids, recovery success rate
//! - [`RecordStore`]: bounded id → record map, oldest evicted first
//! - [`recovery`]: one strategy per recovery action
//!
//! Telemetry delivery is fire-and-forget on the ambient tokio runtime:
//! failures are logged and dropped, never retried.

#![forbid(unsafe_code)]

pub mod metrics;
pub mod recovery;
pub mod service;
pub mod store;

pub use estate_core::effects::TelemetryPayload;
pub use metrics::{ErrorMetrics, TopError, TOP_ERRORS_LIMIT};
pub use recovery::Outcome;
pub use service::ReportingService;
pub use store::RecordStore;
