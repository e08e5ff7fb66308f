//! Platform effect trait definitions
//!
//! Pure trait definitions for every side effect the pipeline performs. This
//! module defines **what** can be done; handlers in `estate-effects` (real)
//! and `estate-testkit` (deterministic) define **how**.
//!
//! The browser surface the pipeline was designed around maps onto these
//! traits one concern at a time: wall-clock time, navigation and persisted
//! flags, the wallet provider, the permissions API, device capability
//! probes, the telemetry sink and the liveness probe.

pub mod clock;
pub mod connectivity;
pub mod platform;
pub mod telemetry;

pub use clock::ClockEffects;
pub use connectivity::{HealthProbe, ProbeError};
pub use platform::{
    DeviceEffects, NavigationEffects, PermissionEffects, PermissionState, WalletEffects,
    WalletError, WALLET_PERSISTED_FLAGS,
};
pub use telemetry::{TelemetryError, TelemetryPayload, TelemetrySink};

/// Everything a reporting service and its boundaries consume from the host.
pub trait PlatformEffects:
    ClockEffects + NavigationEffects + WalletEffects + PermissionEffects + DeviceEffects
{
}

/// Automatic implementation for types that satisfy the required bounds
impl<T> PlatformEffects for T where
    T: ClockEffects + NavigationEffects + WalletEffects + PermissionEffects + DeviceEffects + ?Sized
{
}
