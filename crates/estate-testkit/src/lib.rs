//! Estate Guard Testing Infrastructure
//!
//! Deterministic doubles for every effect trait in `estate-core`, plus record
//! fixtures, so reporting and boundary tests never touch the network, the
//! wall clock or a real wallet.
//!
//! ```rust,no_run
//! use estate_testkit::{MockPlatform, RecordingSink};
//! use std::sync::Arc;
//!
//! let platform = Arc::new(MockPlatform::new().without_camera());
//! let sink = Arc::new(RecordingSink::new());
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod clock;
pub mod fixtures;
pub mod platform;
pub mod probe;
pub mod sink;

pub use clock::MockClock;
pub use fixtures::*;
pub use platform::MockPlatform;
pub use probe::ScriptedProbe;
pub use sink::RecordingSink;
