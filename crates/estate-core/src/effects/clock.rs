//! Wall-clock time

use async_trait::async_trait;
use std::sync::Arc;

/// Millisecond wall clock and cooperative sleep.
#[async_trait]
pub trait ClockEffects: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;

    /// Suspend for `ms` milliseconds.
    async fn sleep_ms(&self, ms: u64);
}

#[async_trait]
impl<T: ClockEffects + ?Sized> ClockEffects for Arc<T> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    async fn sleep_ms(&self, ms: u64) {
        (**self).sleep_ms(ms).await;
    }
}
