//! HTTP handlers for telemetry delivery and liveness probing
//!
//! Both handlers share one `reqwest::Client` configuration: a per-request
//! timeout and no retries. Delivery is at-most-once.

use async_trait::async_trait;
use estate_core::effects::{
    HealthProbe, ProbeError, TelemetryError, TelemetryPayload, TelemetrySink,
};
use estate_core::{EstateError, EstateResult, NetworkSettings};
use std::time::Duration;
use tracing::debug;

fn build_client(timeout: Duration) -> EstateResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| EstateError::platform(format!("failed to create HTTP client: {e}")))
}

/// Posts telemetry payloads as JSON.
#[derive(Debug, Clone)]
pub struct HttpTelemetrySink {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpTelemetrySink {
    /// Create a sink for `endpoint` with a per-request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> EstateResult<Self> {
        Ok(Self {
            endpoint: endpoint.into(),
            client: build_client(timeout)?,
        })
    }

    /// Ingestion endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TelemetrySink for HttpTelemetrySink {
    async fn deliver(&self, payload: &TelemetryPayload) -> Result<(), TelemetryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| TelemetryError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(error_id = %payload.error_id, %status, "Telemetry delivered");
            Ok(())
        } else {
            Err(TelemetryError::Status(status.as_u16()))
        }
    }
}

/// Issues `HEAD` requests against a liveness endpoint.
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpHealthProbe {
    /// Create a probe for `endpoint` with a per-request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> EstateResult<Self> {
        Ok(Self {
            endpoint: endpoint.into(),
            client: build_client(timeout)?,
        })
    }

    /// Probe for the configured `health_endpoint`, if any.
    pub fn from_settings(settings: &NetworkSettings) -> EstateResult<Option<Self>> {
        settings
            .health_endpoint
            .as_ref()
            .map(|endpoint| Self::new(endpoint.clone(), settings.request_timeout()))
            .transpose()
    }

    /// Liveness endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn check(&self) -> Result<(), ProbeError> {
        let response = self
            .client
            .head(&self.endpoint)
            .send()
            .await
            .map_err(|e| ProbeError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ProbeError::Status(status.as_u16()))
        }
    }
}
