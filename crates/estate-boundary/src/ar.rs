//! Augmented-reality boundary
//!
//! Probes device capabilities on mount and preempts its children with a
//! requirements panel when any is missing, whether or not anything failed.

use crate::machine::{BoundaryContext, BoundaryCore};
use crate::error::RenderError;
use crate::state::{BoundaryAction, BoundaryKind};
use crate::view::{CapabilityCheck, CapabilityPanel, Rendered};
use estate_core::effects::DeviceEffects;
use parking_lot::Mutex;
use tracing::{debug, info};

const REQUIREMENTS_TITLE: &str = "AR Requirements Not Met";

/// Capability-gated boundary for AR previews.
#[derive(Debug)]
pub struct ArBoundary {
    core: BoundaryCore,
    capabilities: Mutex<Option<CapabilityPanel>>,
}

impl ArBoundary {
    /// Create an AR boundary. Call [`mount`](Self::mount) before rendering.
    pub fn new(ctx: BoundaryContext) -> Self {
        let kind = BoundaryKind::AugmentedReality;
        Self {
            core: BoundaryCore::new(kind, kind.default_category(), ctx),
            capabilities: Mutex::new(None),
        }
    }

    /// Shared state machine.
    pub fn core(&self) -> &BoundaryCore {
        &self.core
    }

    /// Probe camera, gyroscope, accelerometer and AR session support.
    pub async fn mount(&self) -> CapabilityPanel {
        let platform = self.core.service().platform();
        let checks = vec![
            check("Camera Access", platform.has_camera_access().await),
            check("Gyroscope", platform.has_gyroscope().await),
            check("Accelerometer", platform.has_accelerometer().await),
            check("AR Session Support", platform.supports_xr_session().await),
        ];
        let panel = CapabilityPanel {
            title: REQUIREMENTS_TITLE.to_string(),
            checks,
            help: BoundaryKind::AugmentedReality
                .help()
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        };
        if panel.is_satisfied() {
            debug!("AR capabilities satisfied");
        } else {
            info!(missing = ?panel.lines(), "AR capabilities missing");
        }
        *self.capabilities.lock() = Some(panel.clone());
        panel
    }

    /// Capability probe results, once mounted.
    pub fn capabilities(&self) -> Option<CapabilityPanel> {
        self.capabilities.lock().clone()
    }

    /// Render `child` unless capabilities are missing. Before `mount` no
    /// probe result exists and children render normally.
    pub fn render<T, E, F>(&self, child: F) -> Rendered<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<RenderError>,
    {
        if let Some(panel) = self.capabilities().filter(|p| !p.is_satisfied()) {
            return Rendered::Requirements(panel);
        }
        self.core.render(child)
    }

    /// Handle a fallback control.
    pub async fn perform(&self, action: BoundaryAction) -> bool {
        match action {
            BoundaryAction::Retry => self.core.retry().await,
            BoundaryAction::ReloadPage => self.core.reload_page(),
            BoundaryAction::Reconnect | BoundaryAction::SwitchNetwork => false,
        }
    }
}

fn check(name: &str, available: bool) -> CapabilityCheck {
    CapabilityCheck {
        name: name.to_string(),
        available,
    }
}
