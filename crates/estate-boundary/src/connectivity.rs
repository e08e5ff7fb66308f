//! Online/offline tracking for network boundaries
//!
//! State lives in a `watch` channel so any number of boundaries can observe
//! transitions. Two writers feed it: the embedding frontend (platform
//! online/offline events) and an optional background probe task.
//!
//! # Blocking Lock Usage
//!
//! Uses `parking_lot::Mutex` for the probe handle because the lock is never
//! held across `.await` points.

use estate_core::effects::HealthProbe;
use estate_core::NetworkSettings;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Shared online/offline state.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    online_tx: watch::Sender<bool>,
    probe: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectivityMonitor {
    /// Monitor starting in the given state.
    pub fn new(online: bool) -> Self {
        let (online_tx, _online_rx) = watch::channel(online);
        Self {
            online_tx,
            probe: Mutex::new(None),
        }
    }

    /// Monitor starting online. When `probe` is given it is polled every
    /// `probe_interval_secs` on the current tokio runtime.
    pub fn from_settings(
        settings: &NetworkSettings,
        probe: Option<Arc<dyn HealthProbe>>,
    ) -> Arc<Self> {
        let monitor = Arc::new(Self::default());
        if let Some(probe) = probe {
            info!(
                interval_secs = settings.probe_interval_secs,
                "Starting background health probe"
            );
            monitor.spawn_probe(probe, settings.probe_interval());
        }
        monitor
    }

    /// Last known state.
    pub fn is_online(&self) -> bool {
        *self.online_tx.borrow()
    }

    /// Record a platform online/offline event. Observers are woken only on
    /// an actual change.
    pub fn set_online(&self, online: bool) {
        let changed = self.online_tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            info!(online, "Connectivity changed");
        }
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.online_tx.subscribe()
    }

    /// Poll `probe` every `interval` on the current tokio runtime, replacing
    /// any probe task started earlier. Any probe failure means offline.
    pub fn spawn_probe(self: &Arc<Self>, probe: Arc<dyn HealthProbe>, interval: Duration) {
        let monitor = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let result = probe.check().await;
                let Some(monitor) = monitor.upgrade() else {
                    break;
                };
                if let Err(e) = &result {
                    debug!(error = %e, "Health probe failed");
                }
                monitor.set_online(result.is_ok());
            }
        });
        if let Some(previous) = self.probe.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Stop the background probe, if running.
    pub fn stop_probe(&self) {
        if let Some(handle) = self.probe.lock().take() {
            handle.abort();
        }
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Drop for ConnectivityMonitor {
    fn drop(&mut self) {
        self.stop_probe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_core::effects::ProbeError;
    use estate_testkit::ScriptedProbe;

    #[test]
    fn test_set_online_only_notifies_changes() {
        let monitor = ConnectivityMonitor::new(true);
        let rx = monitor.subscribe();
        monitor.set_online(true);
        assert!(!rx.has_changed().unwrap());
        monitor.set_online(false);
        assert!(rx.has_changed().unwrap());
        assert!(!monitor.is_online());
    }

    #[tokio::test]
    async fn test_probe_drives_state() {
        let monitor = Arc::new(ConnectivityMonitor::new(true));
        let probe = Arc::new(ScriptedProbe::new([Err(ProbeError::Status(503)), Ok(())]));
        let mut rx = monitor.subscribe();

        monitor.spawn_probe(probe.clone(), Duration::from_millis(10));
        rx.changed().await.unwrap();
        assert!(!*rx.borrow_and_update());
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());

        monitor.stop_probe();
        assert!(probe.calls() >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_interval_is_thirty_seconds() {
        let probe = Arc::new(ScriptedProbe::online());
        let monitor =
            ConnectivityMonitor::from_settings(&NetworkSettings::default(), Some(probe.clone()));

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(probe.calls(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(probe.calls(), 2);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(probe.calls(), 3);
        assert!(monitor.is_online());
    }

    #[test]
    fn test_from_settings_without_probe_stays_online() {
        let monitor = ConnectivityMonitor::from_settings(&NetworkSettings::default(), None);
        assert!(monitor.is_online());
        assert!(monitor.probe.lock().is_none());
    }
}
