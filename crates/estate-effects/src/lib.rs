//! # Estate Effects - Production Handlers
//!
//! Real implementations of the effect traits declared in `estate-core`.
//!
//! - [`SystemClock`]: wall clock and tokio sleep
//! - [`HttpTelemetrySink`]: JSON `POST` to the ingestion endpoint
//! - [`HttpHealthProbe`]: `HEAD` against the liveness endpoint
//! - [`HeadlessPlatform`]: navigation, wallet, permissions and device
//!   capabilities for hosts without a browser (CLI, services, tests that want
//!   real time)
//!
//! Deterministic doubles live in `estate-testkit`.

#![forbid(unsafe_code)]

pub mod clock;
pub mod http;
pub mod platform;

pub use clock::SystemClock;
pub use http::{HttpHealthProbe, HttpTelemetrySink};
pub use platform::HeadlessPlatform;
