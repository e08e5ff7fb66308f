//! Controllable clock

use async_trait::async_trait;
use estate_core::effects::ClockEffects;
use parking_lot::Mutex;
use std::sync::Arc;

/// Epoch used by fixtures: 2024-01-01T00:00:00Z.
pub const FIXTURE_EPOCH_MS: u64 = 1_704_067_200_000;

/// Clock whose time only moves when told to.
///
/// `sleep_ms` returns immediately after advancing time and recording the
/// requested duration, so backoff schedules can be asserted exactly.
#[derive(Clone, Debug)]
pub struct MockClock {
    now: Arc<Mutex<u64>>,
    sleeps: Arc<Mutex<Vec<u64>>>,
}

impl MockClock {
    /// Create a clock starting at `now_ms`.
    pub fn new(now_ms: u64) -> Self {
        Self {
            now: Arc::new(Mutex::new(now_ms)),
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Advance time by `ms`.
    pub fn advance(&self, ms: u64) {
        *self.now.lock() += ms;
    }

    /// Set absolute time.
    pub fn set(&self, now_ms: u64) {
        *self.now.lock() = now_ms;
    }

    /// Every duration passed to `sleep_ms`, in call order.
    pub fn sleeps(&self) -> Vec<u64> {
        self.sleeps.lock().clone()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new(FIXTURE_EPOCH_MS)
    }
}

#[async_trait]
impl ClockEffects for MockClock {
    fn now_ms(&self) -> u64 {
        *self.now.lock()
    }

    async fn sleep_ms(&self, ms: u64) {
        self.sleeps.lock().push(ms);
        self.advance(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sleep_advances_and_records() {
        let clock = MockClock::new(1_000);
        clock.sleep_ms(250).await;
        clock.sleep_ms(500).await;
        assert_eq!(clock.now_ms(), 1_750);
        assert_eq!(clock.sleeps(), vec![250, 500]);
    }

    #[test]
    fn test_clones_share_time() {
        let clock = MockClock::default();
        let other = clock.clone();
        other.advance(10);
        assert_eq!(clock.now_ms(), FIXTURE_EPOCH_MS + 10);
    }
}
