//! Scripted liveness probe

use async_trait::async_trait;
use estate_core::effects::{HealthProbe, ProbeError};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Probe that replays a fixed sequence of outcomes, then repeats the last one.
#[derive(Debug)]
pub struct ScriptedProbe {
    script: Mutex<VecDeque<Result<(), ProbeError>>>,
    last: Mutex<Result<(), ProbeError>>,
    calls: Mutex<usize>,
}

impl ScriptedProbe {
    /// Replay `script`; an empty script always reports online.
    pub fn new(script: impl IntoIterator<Item = Result<(), ProbeError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            last: Mutex::new(Ok(())),
            calls: Mutex::new(0),
        }
    }

    /// Always online.
    pub fn online() -> Self {
        Self::new([])
    }

    /// Always offline.
    pub fn offline() -> Self {
        Self::new([Err(ProbeError::Unreachable("scripted".into()))])
    }

    /// Checks performed so far.
    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl HealthProbe for ScriptedProbe {
    async fn check(&self) -> Result<(), ProbeError> {
        *self.calls.lock() += 1;
        let mut last = self.last.lock();
        if let Some(next) = self.script.lock().pop_front() {
            *last = next;
        }
        last.clone()
    }
}
