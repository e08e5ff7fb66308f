//! Record fixtures

use estate_core::{
    ErrorCategory, ErrorContext, ErrorRecord, RecoveryAction, RecoveryHooks, RetryFailure,
    Severity,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::clock::FIXTURE_EPOCH_MS;

/// A record built directly, bypassing the factory, with the category's
/// defaults and a caller-chosen id.
pub fn record(id: &str, category: ErrorCategory) -> ErrorRecord {
    let defaults = category.defaults();
    ErrorRecord {
        id: id.to_string(),
        category,
        severity: defaults.severity,
        message: format!("{} failure", category.as_str()),
        user_message: "Something went wrong.".to_string(),
        technical_details: None,
        stack: None,
        component_stack: None,
        recovery_action: Some(defaults.recovery_action),
        recovery_options: defaults.recovery_options.to_vec(),
        is_recoverable: defaults.is_recoverable,
        should_report: defaults.should_report,
        timestamp_ms: FIXTURE_EPOCH_MS,
        context: ErrorContext::new(),
        hooks: RecoveryHooks::default(),
    }
}

/// A record with severity overridden.
pub fn record_with_severity(id: &str, category: ErrorCategory, severity: Severity) -> ErrorRecord {
    ErrorRecord {
        severity,
        ..record(id, category)
    }
}

/// A retry hook that fails `failures` times, then succeeds. The counter
/// reports how many times the hook ran.
pub fn flaky_retry(failures: usize) -> (RecoveryHooks, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let hooks = RecoveryHooks::with_retry(move || {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if n < failures {
                Err(RetryFailure::from("still failing"))
            } else {
                Ok(())
            }
        }
    });
    (hooks, calls)
}

/// A retry hook that always fails.
pub fn failing_retry() -> (RecoveryHooks, Arc<AtomicUsize>) {
    flaky_retry(usize::MAX)
}

/// A network record whose retry hook succeeds.
pub fn retryable_network_record(id: &str) -> (ErrorRecord, Arc<AtomicUsize>) {
    let (hooks, calls) = flaky_retry(0);
    let mut record = record(id, ErrorCategory::Network);
    record.recovery_action = Some(RecoveryAction::Retry);
    record.hooks = hooks;
    (record, calls)
}

/// Insert a context value.
pub fn with_context(
    mut record: ErrorRecord,
    key: &str,
    value: impl Into<serde_json::Value>,
) -> ErrorRecord {
    record.context.insert(key.to_string(), value.into());
    record
}
