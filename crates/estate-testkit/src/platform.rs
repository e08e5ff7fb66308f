//! Scriptable platform double
//!
//! Implements every platform effect trait with switchable outcomes and
//! records the calls the pipeline makes, for assertions.

use crate::clock::MockClock;
use async_trait::async_trait;
use estate_core::effects::{
    ClockEffects, DeviceEffects, NavigationEffects, PermissionEffects, PermissionState,
    WalletEffects, WalletError,
};
use estate_core::{EstateError, EstateResult};
use parking_lot::Mutex;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
struct Capabilities {
    camera: bool,
    gyroscope: bool,
    accelerometer: bool,
    xr_session: bool,
}

#[derive(Debug)]
struct Calls {
    reloads: usize,
    cleared_flags: Vec<String>,
    chain_switches: Vec<u64>,
    permission_queries: Vec<String>,
}

/// Platform double with every capability present by default.
#[derive(Debug)]
pub struct MockPlatform {
    clock: MockClock,
    url: String,
    capabilities: Mutex<Capabilities>,
    wallet: Mutex<Result<(), WalletError>>,
    permission: Mutex<Option<PermissionState>>,
    flags: Mutex<BTreeSet<String>>,
    calls: Mutex<Calls>,
}

impl MockPlatform {
    /// Full capabilities, an accepting wallet, `prompt` permissions.
    pub fn new() -> Self {
        Self {
            clock: MockClock::default(),
            url: "https://listings.test/property/42".to_string(),
            capabilities: Mutex::new(Capabilities {
                camera: true,
                gyroscope: true,
                accelerometer: true,
                xr_session: true,
            }),
            wallet: Mutex::new(Ok(())),
            permission: Mutex::new(Some(PermissionState::Prompt)),
            flags: Mutex::new(BTreeSet::new()),
            calls: Mutex::new(Calls {
                reloads: 0,
                cleared_flags: Vec::new(),
                chain_switches: Vec::new(),
                permission_queries: Vec::new(),
            }),
        }
    }

    /// Use `clock` for time.
    pub fn with_clock(mut self, clock: MockClock) -> Self {
        self.clock = clock;
        self
    }

    /// Report `url` as the current location.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Camera access unavailable.
    pub fn without_camera(self) -> Self {
        self.capabilities.lock().camera = false;
        self
    }

    /// Set every device capability at once.
    pub fn with_capabilities(
        self,
        camera: bool,
        gyroscope: bool,
        accelerometer: bool,
        xr_session: bool,
    ) -> Self {
        *self.capabilities.lock() = Capabilities {
            camera,
            gyroscope,
            accelerometer,
            xr_session,
        };
        self
    }

    /// Outcome of every chain switch request.
    pub fn with_wallet(self, outcome: Result<(), WalletError>) -> Self {
        *self.wallet.lock() = outcome;
        self
    }

    /// Answer permission queries with `state`; `None` makes the query fail.
    pub fn with_permission(self, state: Option<PermissionState>) -> Self {
        *self.permission.lock() = state;
        self
    }

    /// Mark persisted flags as present.
    pub fn with_flags(self, keys: &[&str]) -> Self {
        self.flags
            .lock()
            .extend(keys.iter().map(|k| (*k).to_string()));
        self
    }

    /// Flip camera availability after construction.
    pub fn set_camera(&self, available: bool) {
        self.capabilities.lock().camera = available;
    }

    /// Shared handle to the clock.
    pub fn clock(&self) -> &MockClock {
        &self.clock
    }

    /// Reloads requested so far.
    pub fn reload_count(&self) -> usize {
        self.calls.lock().reloads
    }

    /// Keys passed to `clear_persisted_flags`, in call order.
    pub fn cleared_flags(&self) -> Vec<String> {
        self.calls.lock().cleared_flags.clone()
    }

    /// Persisted flags still present.
    pub fn flags(&self) -> Vec<String> {
        self.flags.lock().iter().cloned().collect()
    }

    /// Chain ids requested through the wallet.
    pub fn chain_switches(&self) -> Vec<u64> {
        self.calls.lock().chain_switches.clone()
    }

    /// Permission names queried.
    pub fn permission_queries(&self) -> Vec<String> {
        self.calls.lock().permission_queries.clone()
    }

    /// Total strategy side effects observed (reloads, switches, queries).
    pub fn side_effects(&self) -> usize {
        let calls = self.calls.lock();
        calls.reloads + calls.chain_switches.len() + calls.permission_queries.len()
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClockEffects for MockPlatform {
    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    async fn sleep_ms(&self, ms: u64) {
        self.clock.sleep_ms(ms).await;
    }
}

impl NavigationEffects for MockPlatform {
    fn reload(&self) {
        self.calls.lock().reloads += 1;
    }

    fn current_url(&self) -> String {
        self.url.clone()
    }

    fn clear_persisted_flags(&self, keys: &[&str]) {
        let mut flags = self.flags.lock();
        let mut calls = self.calls.lock();
        for key in keys {
            flags.remove(*key);
            calls.cleared_flags.push((*key).to_string());
        }
    }
}

#[async_trait]
impl WalletEffects for MockPlatform {
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        self.calls.lock().chain_switches.push(chain_id);
        self.wallet.lock().clone()
    }
}

#[async_trait]
impl PermissionEffects for MockPlatform {
    async fn query_permission(&self, name: &str) -> EstateResult<PermissionState> {
        self.calls.lock().permission_queries.push(name.to_string());
        let state = *self.permission.lock();
        state.ok_or_else(|| EstateError::platform(format!("permission query for '{name}' failed")))
    }
}

#[async_trait]
impl DeviceEffects for MockPlatform {
    async fn has_camera_access(&self) -> bool {
        self.capabilities.lock().camera
    }

    async fn has_gyroscope(&self) -> bool {
        self.capabilities.lock().gyroscope
    }

    async fn has_accelerometer(&self) -> bool {
        self.capabilities.lock().accelerometer
    }

    async fn supports_xr_session(&self) -> bool {
        self.capabilities.lock().xr_session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_core::effects::WALLET_PERSISTED_FLAGS;

    #[test]
    fn test_clear_flags_records_keys() {
        let platform = MockPlatform::new().with_flags(&["wallet.connected", "theme"]);
        platform.clear_persisted_flags(WALLET_PERSISTED_FLAGS);
        assert_eq!(platform.flags(), vec!["theme".to_string()]);
        assert_eq!(platform.cleared_flags().len(), WALLET_PERSISTED_FLAGS.len());
    }

    #[tokio::test]
    async fn test_scripted_outcomes() {
        let platform = MockPlatform::new()
            .without_camera()
            .with_wallet(Err(WalletError::Rejected("user denied".into())))
            .with_permission(Some(PermissionState::Denied));

        assert!(!platform.has_camera_access().await);
        assert!(platform.has_gyroscope().await);
        assert!(platform.switch_chain(1).await.is_err());
        assert_eq!(
            platform.query_permission("camera").await.unwrap(),
            PermissionState::Denied
        );
        assert_eq!(platform.chain_switches(), vec![1]);
        assert_eq!(platform.side_effects(), 2);
    }
}
