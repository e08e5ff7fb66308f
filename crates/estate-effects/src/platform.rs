//! Headless platform handler
//!
//! Stands in for the browser when the pipeline runs without one. Device
//! capabilities come from `[device]` configuration; persisted flags live in
//! memory; reload requests are logged and counted; there is no wallet
//! provider and the permissions API reports `prompt` only for permissions
//! whose backing capability is configured as present.

use async_trait::async_trait;
use estate_core::effects::{
    ClockEffects, DeviceEffects, NavigationEffects, PermissionEffects, PermissionState,
    WalletEffects, WalletError,
};
use estate_core::{DeviceSettings, EstateError, EstateResult};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

use crate::clock::SystemClock;

/// Platform handler for hosts without a browser.
#[derive(Debug)]
pub struct HeadlessPlatform {
    device: DeviceSettings,
    url: String,
    clock: SystemClock,
    flags: Mutex<BTreeMap<String, String>>,
    reloads: AtomicU64,
}

impl HeadlessPlatform {
    /// Create a headless platform advertising `device` capabilities.
    pub fn new(device: DeviceSettings, url: impl Into<String>) -> Self {
        Self {
            device,
            url: url.into(),
            clock: SystemClock::new(),
            flags: Mutex::new(BTreeMap::new()),
            reloads: AtomicU64::new(0),
        }
    }

    /// Persist a flag.
    pub fn set_flag(&self, key: impl Into<String>, value: impl Into<String>) {
        self.flags.lock().insert(key.into(), value.into());
    }

    /// Read a persisted flag.
    pub fn flag(&self, key: &str) -> Option<String> {
        self.flags.lock().get(key).cloned()
    }

    /// Number of reloads requested so far.
    pub fn reload_count(&self) -> u64 {
        self.reloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClockEffects for HeadlessPlatform {
    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    async fn sleep_ms(&self, ms: u64) {
        self.clock.sleep_ms(ms).await;
    }
}

impl NavigationEffects for HeadlessPlatform {
    fn reload(&self) {
        let n = self.reloads.fetch_add(1, Ordering::SeqCst) + 1;
        info!(url = %self.url, reloads = n, "Page reload requested");
    }

    fn current_url(&self) -> String {
        self.url.clone()
    }

    fn clear_persisted_flags(&self, keys: &[&str]) {
        let mut flags = self.flags.lock();
        for key in keys {
            flags.remove(*key);
        }
    }
}

#[async_trait]
impl WalletEffects for HeadlessPlatform {
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        warn!(chain_id, "Chain switch requested without a wallet provider");
        Err(WalletError::NoProvider)
    }
}

#[async_trait]
impl PermissionEffects for HeadlessPlatform {
    async fn query_permission(&self, name: &str) -> EstateResult<PermissionState> {
        let available = match name {
            "camera" => self.device.camera,
            "gyroscope" => self.device.gyroscope,
            "accelerometer" => self.device.accelerometer,
            other => {
                return Err(EstateError::platform(format!(
                    "permission '{other}' is not supported"
                )))
            }
        };
        Ok(if available {
            PermissionState::Prompt
        } else {
            PermissionState::Denied
        })
    }
}

#[async_trait]
impl DeviceEffects for HeadlessPlatform {
    async fn has_camera_access(&self) -> bool {
        self.device.camera
    }

    async fn has_gyroscope(&self) -> bool {
        self.device.gyroscope
    }

    async fn has_accelerometer(&self) -> bool {
        self.device.accelerometer
    }

    async fn supports_xr_session(&self) -> bool {
        self.device.xr_session
    }
}
