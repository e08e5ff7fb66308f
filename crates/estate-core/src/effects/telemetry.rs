//! Telemetry sink
//!
//! Best-effort, at-most-once delivery of reduced error reports. The sink
//! reports failure to its caller, which logs and discards it.

use crate::record::{ErrorCategory, ErrorContext, ErrorRecord, Severity};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Body posted to the ingestion endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryPayload {
    /// Record id
    pub error_id: String,
    /// Record category
    pub category: ErrorCategory,
    /// Record severity
    pub severity: Severity,
    /// Technical message
    pub message: String,
    /// Reporting client
    pub user_agent: String,
    /// Location at report time
    pub url: String,
    /// ISO-8601 record time
    pub timestamp: String,
    /// Record context, omitted when empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
    /// Reporting session
    pub session_id: String,
}

impl TelemetryPayload {
    /// Reduce a record to its wire payload.
    pub fn from_record(
        record: &ErrorRecord,
        user_agent: impl Into<String>,
        url: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            error_id: record.id.clone(),
            category: record.category,
            severity: record.severity,
            message: record.message.clone(),
            user_agent: user_agent.into(),
            url: url.into(),
            timestamp: iso8601(record.timestamp_ms),
            context: (!record.context.is_empty()).then(|| record.context.clone()),
            session_id: session_id.into(),
        }
    }
}

/// Format epoch milliseconds as ISO-8601 with millisecond precision.
#[must_use]
pub fn iso8601(timestamp_ms: u64) -> String {
    let millis = i64::try_from(timestamp_ms).unwrap_or(i64::MAX);
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_else(DateTime::<Utc>::default)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Telemetry delivery failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TelemetryError {
    /// The request never produced a response
    #[error("telemetry transport failed: {0}")]
    Transport(String),
    /// The endpoint answered with a non-2xx status
    #[error("telemetry endpoint returned status {0}")]
    Status(u16),
}

/// Destination for error reports.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    /// Deliver one payload. Any 2xx response is success.
    async fn deliver(&self, payload: &TelemetryPayload) -> Result<(), TelemetryError>;
}
