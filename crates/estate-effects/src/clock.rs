//! Real time handler for production use

use async_trait::async_trait;
use estate_core::effects::ClockEffects;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Wall clock backed by `SystemTime` and `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ClockEffects for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64
    }

    async fn sleep_ms(&self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_after_2020() {
        assert!(SystemClock::new().now_ms() > 1_577_836_800_000);
    }

    #[tokio::test]
    async fn test_sleep_advances_time() {
        let clock = SystemClock::new();
        let before = clock.now_ms();
        clock.sleep_ms(5).await;
        assert!(clock.now_ms() >= before);
    }
}
