//! Headless fallback view models
//!
//! What a boundary shows in place of a failed subtree. Frontends render these;
//! the CLI prints them as JSON.

use crate::state::{BoundaryAction, BoundaryKind, BoundaryState};
use estate_core::{ErrorRecord, Severity};
use serde::{Deserialize, Serialize};

/// Outcome of rendering through a boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum Rendered<T> {
    /// The guarded child rendered
    Children(T),
    /// The child failed; fallback panel instead
    Fallback(FallbackView),
    /// Device capabilities are missing; requirements panel instead
    Requirements(CapabilityPanel),
    /// Caller-supplied substitute, rendered permanently
    Degraded(T),
}

impl<T> Rendered<T> {
    /// Rendered child, if any.
    pub fn children(self) -> Option<T> {
        match self {
            Self::Children(value) => Some(value),
            _ => None,
        }
    }

    /// Fallback panel, if any.
    pub fn fallback(&self) -> Option<&FallbackView> {
        match self {
            Self::Fallback(view) => Some(view),
            _ => None,
        }
    }
}

/// One fallback control.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionButton {
    /// Control identity
    pub action: BoundaryAction,
    /// Button text
    pub label: String,
    /// Whether the control accepts input
    pub enabled: bool,
}

impl ActionButton {
    fn new(action: BoundaryAction, enabled: bool) -> Self {
        Self {
            action,
            label: action.label().to_string(),
            enabled,
        }
    }
}

/// Panel rendered in place of a crashed subtree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackView {
    /// Variant that produced the panel
    pub boundary: BoundaryKind,
    /// Panel heading
    pub title: String,
    /// Human message; always shown
    pub user_message: String,
    /// Record severity
    pub severity: Severity,
    /// Styling tone derived from severity
    pub tone: String,
    /// Record id, for support requests
    pub error_id: String,
    /// Diagnostics; absent in production
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_details: Option<String>,
    /// Variant help text
    pub help: Vec<String>,
    /// Controls, reload last
    pub actions: Vec<ActionButton>,
    /// Boundary state when the panel was built
    pub state: BoundaryState,
    /// Failed retries so far
    pub retry_count: u32,
    /// Retry limit
    pub max_retries: u32,
}

impl FallbackView {
    pub(crate) fn build(
        kind: BoundaryKind,
        record: &ErrorRecord,
        state: BoundaryState,
        retry_count: u32,
        max_retries: u32,
        show_details: bool,
    ) -> Self {
        let idle = state == BoundaryState::Caught;
        let mut actions = Vec::new();

        if record.offers_retry() {
            actions.push(ActionButton::new(
                BoundaryAction::Retry,
                idle && retry_count < max_retries,
            ));
        }
        if kind == BoundaryKind::Wallet {
            actions.push(ActionButton::new(BoundaryAction::Reconnect, idle));
            if record.target_chain_id().is_some() {
                actions.push(ActionButton::new(BoundaryAction::SwitchNetwork, idle));
            }
        }
        actions.push(ActionButton::new(BoundaryAction::ReloadPage, true));

        Self {
            boundary: kind,
            title: kind.title().to_string(),
            user_message: record.user_message.clone(),
            severity: record.severity,
            tone: record.severity.tone().to_string(),
            error_id: record.id.clone(),
            technical_details: show_details.then(|| diagnostics(record)),
            help: kind.help().iter().map(|s| (*s).to_string()).collect(),
            actions,
            state,
            retry_count,
            max_retries,
        }
    }

    /// Control for `action`, if shown.
    pub fn button(&self, action: BoundaryAction) -> Option<&ActionButton> {
        self.actions.iter().find(|b| b.action == action)
    }

    /// Whether `action` is shown and enabled.
    pub fn is_enabled(&self, action: BoundaryAction) -> bool {
        self.button(action).is_some_and(|b| b.enabled)
    }
}

fn diagnostics(record: &ErrorRecord) -> String {
    let mut parts = vec![record.message.clone()];
    parts.extend(record.technical_details.clone());
    parts.extend(record.stack.clone());
    parts.extend(record.component_stack.as_ref().map(|c| format!("in {c}")));
    if !record.context.is_empty() {
        let context = record
            .context
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!("context: {context}"));
    }
    parts.join("\n")
}

/// One device capability probe result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityCheck {
    /// Display name
    pub name: String,
    /// Probe outcome
    pub available: bool,
}

impl CapabilityCheck {
    /// `"<name>: available"` or `"<name>: unavailable"`.
    pub fn line(&self) -> String {
        let status = if self.available {
            "available"
        } else {
            "unavailable"
        };
        format!("{}: {status}", self.name)
    }
}

/// Requirements panel shown by the AR boundary when capabilities are missing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityPanel {
    /// Panel heading
    pub title: String,
    /// Every probe, in probe order
    pub checks: Vec<CapabilityCheck>,
    /// Help text
    pub help: Vec<String>,
}

impl CapabilityPanel {
    /// One status line per capability.
    pub fn lines(&self) -> Vec<String> {
        self.checks.iter().map(CapabilityCheck::line).collect()
    }

    /// Whether every capability is present.
    pub fn is_satisfied(&self) -> bool {
        self.checks.iter().all(|c| c.available)
    }
}
