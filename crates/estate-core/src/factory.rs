//! # Error Factory
//!
//! Builds [`ErrorRecord`]s from two input shapes:
//!
//! - an explicit category and message, for call sites that raise a typed
//!   failure on purpose ([`ErrorFactory::create_error`] and the
//!   per-category constructors);
//! - an arbitrary caught error of unknown category, for the generic catch
//!   path of boundaries ([`ErrorFactory::from_error`],
//!   [`ErrorFactory::from_message`]).
//!
//! The factory never infers a category from message content: `from_error`
//! yields `unknown` unless the caller names a category.
//!
//! Construction is pure apart from the clock read that salts the id and the
//! optional backtrace capture.

use crate::effects::ClockEffects;
use crate::ids;
use crate::messages::user_friendly_message;
use crate::record::{
    ErrorCategory, ErrorContext, ErrorRecord, RecoveryAction, RecoveryHooks, RetryFailure,
    Severity,
};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::future::Future;
use std::sync::Arc;
use tracing::trace;

/// Optional overrides for record construction.
#[derive(Clone, Debug, Default)]
pub struct ErrorOptions {
    user_message: Option<String>,
    severity: Option<Severity>,
    technical_details: Option<String>,
    stack: Option<String>,
    component_stack: Option<String>,
    context: ErrorContext,
    recovery_action: Option<RecoveryAction>,
    recovery_options: Option<Vec<RecoveryAction>>,
    is_recoverable: Option<bool>,
    should_report: Option<bool>,
    hooks: RecoveryHooks,
}

impl ErrorOptions {
    /// No overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the derived user message.
    #[must_use]
    pub fn user_message(mut self, message: impl Into<String>) -> Self {
        self.user_message = Some(message.into());
        self
    }

    /// Override the category's default severity.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Attach technical details.
    #[must_use]
    pub fn technical_details(mut self, details: impl Into<String>) -> Self {
        self.technical_details = Some(details.into());
        self
    }

    /// Supply a stack instead of capturing one.
    #[must_use]
    pub fn stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Record which component caught the failure.
    #[must_use]
    pub fn component_stack(mut self, stack: impl Into<String>) -> Self {
        self.component_stack = Some(stack.into());
        self
    }

    /// Add a context entry.
    #[must_use]
    pub fn context(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Override the suggested recovery.
    #[must_use]
    pub fn recovery_action(mut self, action: RecoveryAction) -> Self {
        self.recovery_action = Some(action);
        self
    }

    /// Override the admissible recoveries.
    #[must_use]
    pub fn recovery_options(mut self, options: Vec<RecoveryAction>) -> Self {
        self.recovery_options = Some(options);
        self
    }

    /// Override recoverability.
    #[must_use]
    pub fn recoverable(mut self, recoverable: bool) -> Self {
        self.is_recoverable = Some(recoverable);
        self
    }

    /// Override telemetry forwarding.
    #[must_use]
    pub fn report(mut self, report: bool) -> Self {
        self.should_report = Some(report);
        self
    }

    /// Attach recovery hooks.
    #[must_use]
    pub fn hooks(mut self, hooks: RecoveryHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Attach a retry callback used by the `retry`/`refresh` strategies.
    #[must_use]
    pub fn retry<F, Fut>(self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), RetryFailure>> + Send + 'static,
    {
        self.hooks(RecoveryHooks::with_retry(f))
    }
}

/// Builds normalized error records.
#[derive(Clone)]
pub struct ErrorFactory {
    clock: Arc<dyn ClockEffects>,
}

impl std::fmt::Debug for ErrorFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorFactory").finish_non_exhaustive()
    }
}

impl ErrorFactory {
    /// Create a factory reading time from `clock`.
    pub fn new(clock: Arc<dyn ClockEffects>) -> Self {
        Self { clock }
    }

    /// Build a record with explicit category, severity and messages.
    ///
    /// Recovery fields fall back to the category defaults; recoverability and
    /// reporting default to `true`; the stack is captured when not supplied.
    /// A recovery action missing from the options is inserted at the front.
    pub fn create_error(
        &self,
        category: ErrorCategory,
        severity: Severity,
        message: impl Into<String>,
        user_message: impl Into<String>,
        options: ErrorOptions,
    ) -> ErrorRecord {
        let defaults = category.defaults();
        let message = message.into();
        let timestamp_ms = self.clock.now_ms();

        let recovery_action = options
            .recovery_action
            .or(Some(defaults.recovery_action));
        let mut recovery_options = options
            .recovery_options
            .unwrap_or_else(|| defaults.recovery_options.to_vec());
        if let Some(action) = recovery_action {
            if !recovery_options.contains(&action) {
                recovery_options.insert(0, action);
            }
        }

        let record = ErrorRecord {
            id: ids::error_id(category, &message, timestamp_ms),
            category,
            severity,
            user_message: user_message.into(),
            technical_details: options.technical_details,
            stack: options.stack.or_else(capture_stack),
            component_stack: options.component_stack,
            recovery_action,
            recovery_options,
            is_recoverable: options.is_recoverable.unwrap_or(true),
            should_report: options.should_report.unwrap_or(true),
            timestamp_ms,
            context: options.context,
            hooks: options.hooks,
            message,
        };
        trace!(
            error_id = %record.id,
            %category,
            %severity,
            recovery_action = ?record.recovery_action,
            "Error record created"
        );
        record
    }

    /// Build a record using every default of `category`.
    pub fn for_category(
        &self,
        category: ErrorCategory,
        message: impl Into<String>,
        options: ErrorOptions,
    ) -> ErrorRecord {
        let defaults = category.defaults();
        let message = message.into();
        let user_message = options
            .user_message
            .clone()
            .unwrap_or_else(|| user_friendly_message(&message, category));
        let severity = options.severity.unwrap_or(defaults.severity);
        let options = ErrorOptions {
            is_recoverable: options.is_recoverable.or(Some(defaults.is_recoverable)),
            should_report: options.should_report.or(Some(defaults.should_report)),
            ..options
        };
        self.create_error(category, severity, message, user_message, options)
    }

    /// Wallet or chain failure: high severity, reconnect then reload.
    pub fn web3_error(&self, message: impl Into<String>, options: ErrorOptions) -> ErrorRecord {
        self.for_category(ErrorCategory::WalletChain, message, options)
    }

    /// Connectivity failure: medium severity, retry then refresh.
    pub fn network_error(&self, message: impl Into<String>, options: ErrorOptions) -> ErrorRecord {
        self.for_category(ErrorCategory::Network, message, options)
    }

    /// AR failure: not recoverable, ignore. Usually a device capability gap.
    pub fn ar_error(&self, message: impl Into<String>, options: ErrorOptions) -> ErrorRecord {
        self.for_category(ErrorCategory::AugmentedReality, message, options)
    }

    /// Invalid input: low severity, not reported.
    pub fn validation_error(
        &self,
        message: impl Into<String>,
        options: ErrorOptions,
    ) -> ErrorRecord {
        self.for_category(ErrorCategory::Validation, message, options)
    }

    /// Rendering failure: medium severity, refresh then reload.
    pub fn ui_error(&self, message: impl Into<String>, options: ErrorOptions) -> ErrorRecord {
        self.for_category(ErrorCategory::Ui, message, options)
    }

    /// Identity failure: high severity, reconnect then reload.
    pub fn authentication_error(
        &self,
        message: impl Into<String>,
        options: ErrorOptions,
    ) -> ErrorRecord {
        self.for_category(ErrorCategory::Authentication, message, options)
    }

    /// Missing permission: medium severity, grant-permission then reload.
    pub fn permission_error(
        &self,
        message: impl Into<String>,
        options: ErrorOptions,
    ) -> ErrorRecord {
        self.for_category(ErrorCategory::Permission, message, options)
    }

    /// Resource failure: high severity, retry then contact support.
    pub fn resource_error(
        &self,
        message: impl Into<String>,
        options: ErrorOptions,
    ) -> ErrorRecord {
        self.for_category(ErrorCategory::Resource, message, options)
    }

    /// Unclassified failure: medium severity, retry then reload.
    pub fn unknown_error(&self, message: impl Into<String>, options: ErrorOptions) -> ErrorRecord {
        self.for_category(ErrorCategory::Unknown, message, options)
    }

    /// Normalize an arbitrary error.
    ///
    /// The message is the error's `Display`; its source chain becomes the
    /// technical details unless the caller supplied some. The category is
    /// `unknown` unless given.
    pub fn from_error(
        &self,
        error: &(dyn std::error::Error + 'static),
        category: Option<ErrorCategory>,
        options: ErrorOptions,
    ) -> ErrorRecord {
        let mut options = options;
        if options.technical_details.is_none() {
            options.technical_details = source_chain(error);
        }
        self.from_message(error.to_string(), category, options)
    }

    /// Normalize a bare failure message (panic payloads, foreign errors).
    pub fn from_message(
        &self,
        message: impl Into<String>,
        category: Option<ErrorCategory>,
        options: ErrorOptions,
    ) -> ErrorRecord {
        let category = category.unwrap_or(ErrorCategory::Unknown);
        self.for_category(category, message, options)
    }
}

fn source_chain(error: &(dyn std::error::Error + 'static)) -> Option<String> {
    let mut causes = Vec::new();
    let mut current = error.source();
    while let Some(cause) = current {
        causes.push(format!("caused by: {cause}"));
        current = cause.source();
    }
    (!causes.is_empty()).then(|| causes.join("\n"))
}

fn capture_stack() -> Option<String> {
    let backtrace = Backtrace::capture();
    matches!(backtrace.status(), BacktraceStatus::Captured).then(|| backtrace.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedClock(u64);

    #[async_trait]
    impl ClockEffects for FixedClock {
        fn now_ms(&self) -> u64 {
            self.0
        }

        async fn sleep_ms(&self, _ms: u64) {}
    }

    fn factory() -> ErrorFactory {
        ErrorFactory::new(Arc::new(FixedClock(1_000)))
    }

    #[derive(Debug, thiserror::Error)]
    #[error("listing fetch failed")]
    struct Outer(#[source] Inner);

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset")]
    struct Inner;

    #[test]
    fn test_create_error_defaults() {
        let record = factory().create_error(
            ErrorCategory::Ui,
            Severity::Low,
            "tile overflow",
            "Display glitch",
            ErrorOptions::new(),
        );
        assert!(record.is_recoverable);
        assert!(record.should_report);
        assert_eq!(record.recovery_action, Some(RecoveryAction::Refresh));
        assert_eq!(record.timestamp_ms, 1_000);
        assert_eq!(record.id, ids::error_id(ErrorCategory::Ui, "tile overflow", 1_000));
        assert_eq!(record.user_message, "Display glitch");
    }

    #[test]
    fn test_action_inserted_into_options() {
        let record = factory().network_error(
            "offline",
            ErrorOptions::new()
                .recovery_action(RecoveryAction::Reload)
                .recovery_options(vec![RecoveryAction::Retry]),
        );
        assert_eq!(
            record.recovery_options,
            vec![RecoveryAction::Reload, RecoveryAction::Retry]
        );
    }

    #[test]
    fn test_from_error_uses_source_chain() {
        let err = Outer(Inner);
        let record = factory().from_error(&err, None, ErrorOptions::new());
        assert_eq!(record.category, ErrorCategory::Unknown);
        assert_eq!(record.message, "listing fetch failed");
        assert_eq!(
            record.technical_details.as_deref(),
            Some("caused by: connection reset")
        );
        assert!(record.user_message.starts_with("Unable to connect"));
    }

    #[test]
    fn test_supplied_stack_is_kept() {
        let record = factory().ui_error("x", ErrorOptions::new().stack("at render()"));
        assert_eq!(record.stack.as_deref(), Some("at render()"));
    }

    #[test]
    fn test_explicit_user_message_wins() {
        let record = factory().web3_error(
            "wallet locked",
            ErrorOptions::new().user_message("Unlock your wallet"),
        );
        assert_eq!(record.user_message, "Unlock your wallet");
    }
}
