//! # Estate Core - Error Records and Classification
//!
//! Foundation crate for the Estate Guard error pipeline. Everything a frontend
//! needs to describe a failure lives here; nothing here performs I/O.
//!
//! ## What Belongs Here
//!
//! - The closed taxonomy: [`ErrorCategory`], [`Severity`], [`RecoveryAction`]
//! - The canonical [`ErrorRecord`] and its non-serializable [`RecoveryHooks`]
//! - [`ErrorFactory`], which normalizes raw failures into records
//! - The user-facing message rule table
//! - Error id and session id derivation
//! - [`EstateConfig`] loading, merging and validation
//! - Effect traits for every platform capability the pipeline consumes
//!
//! ## What Does NOT Belong Here
//!
//! - Effect handler implementations (belong in estate-effects)
//! - Record storage, metrics and recovery dispatch (belong in estate-reporting)
//! - Boundary state machines and fallback views (belong in estate-boundary)
//!
//! ## Data Flow
//!
//! ```text
//! raw failure ──► ErrorFactory ──► ErrorRecord ──► ReportingService
//!                   │                                  │
//!                   └─ messages / ids                  └─ effects (sink, wallet, ...)
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod effects;
pub mod errors;
pub mod factory;
pub mod ids;
pub mod messages;
pub mod record;

pub use config::{
    BoundarySettings, DeviceSettings, Environment, EstateConfig, NetworkSettings,
    ReportingSettings,
};
pub use errors::{EstateError, EstateResult};
pub use factory::{ErrorFactory, ErrorOptions};
pub use messages::user_friendly_message;
pub use record::{
    CategoryDefaults, ErrorCategory, ErrorContext, ErrorRecord, RecoveryAction, RecoveryHooks,
    RetryFailure, RetryFuture, Severity,
};
