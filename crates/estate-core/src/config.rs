//! Configuration for the Estate Guard pipeline
//!
//! Loaded from TOML, merged with `ESTATE_<SECTION>_<KEY>` environment
//! variables, then validated. Every field has a default so an empty file is a
//! valid configuration.

use crate::errors::{EstateError, EstateResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "ESTATE_";

/// Build flavour. Technical details and telemetry depend on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Technical details visible, telemetry off
    #[default]
    Development,
    /// Technical details hidden, telemetry on
    Production,
}

impl Environment {
    /// Whether this is a production build.
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    fn parse(value: &str) -> EstateResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(EstateError::config(format!("unknown environment '{other}'"))),
        }
    }
}

/// Reporting service settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingSettings {
    /// Build flavour
    pub environment: Environment,
    /// Telemetry ingestion endpoint
    pub endpoint: Option<String>,
    /// Retained-record bound; oldest records are evicted first
    pub max_retained_records: usize,
    /// Unsuccessful recovery attempts allowed per record
    pub max_recovery_attempts: u32,
    /// User agent sent with telemetry
    pub user_agent: String,
}

impl Default for ReportingSettings {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            endpoint: None,
            max_retained_records: 500,
            max_recovery_attempts: 3,
            user_agent: format!("estate-guard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Boundary settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundarySettings {
    /// Retries before a boundary is exhausted; must not exceed
    /// `reporting.max_recovery_attempts`
    pub max_retries: u32,
    /// First backoff delay for network retries
    pub backoff_base_ms: u64,
    /// Backoff ceiling
    pub backoff_cap_ms: u64,
}

impl Default for BoundarySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1_000,
            backoff_cap_ms: 30_000,
        }
    }
}

/// Connectivity settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Liveness endpoint for the periodic `HEAD` probe
    pub health_endpoint: Option<String>,
    /// Seconds between probes
    pub probe_interval_secs: u64,
    /// Per-request timeout for telemetry and probes
    pub request_timeout_secs: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            health_endpoint: None,
            probe_interval_secs: 30,
            request_timeout_secs: 10,
        }
    }
}

impl NetworkSettings {
    /// Period of the background liveness probe.
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    /// Timeout applied to each telemetry or probe request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Capabilities advertised by the headless platform.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Camera access
    pub camera: bool,
    /// Gyroscope
    pub gyroscope: bool,
    /// Accelerometer
    pub accelerometer: bool,
    /// AR session API
    pub xr_session: bool,
}

/// Complete Estate Guard configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstateConfig {
    /// `[reporting]`
    pub reporting: ReportingSettings,
    /// `[boundary]`
    pub boundary: BoundarySettings,
    /// `[network]`
    pub network: NetworkSettings,
    /// `[device]`
    pub device: DeviceSettings,
}

impl EstateConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> EstateResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a file.
    pub fn load_from_file(path: &Path) -> EstateResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EstateError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` when it exists, otherwise start from defaults; then
    /// merge the environment and validate.
    pub fn load(path: Option<&Path>) -> EstateResult<Self> {
        let mut config = match path {
            Some(p) if p.exists() => Self::load_from_file(p)?,
            _ => Self::default(),
        };
        config.merge_with_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `ESTATE_<SECTION>_<KEY>` variables from the process environment.
    pub fn merge_with_env(&mut self) -> EstateResult<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply `ESTATE_<SECTION>_<KEY>` pairs from an arbitrary source.
    pub fn merge_with_vars<I>(&mut self, vars: I) -> EstateResult<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(rest) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let Some((section, field)) = rest.split_once('_') else {
                continue;
            };
            let dotted = format!(
                "{}.{}",
                section.to_ascii_lowercase(),
                field.to_ascii_lowercase()
            );
            self.set_from_string(&dotted, &value)?;
        }
        Ok(())
    }

    /// Set a single value by dotted key (`section.field`).
    pub fn set_from_string(&mut self, key: &str, value: &str) -> EstateResult<()> {
        match key {
            "reporting.environment" => self.reporting.environment = Environment::parse(value)?,
            "reporting.endpoint" => self.reporting.endpoint = non_empty(value),
            "reporting.max_retained_records" => {
                self.reporting.max_retained_records = parse_num(key, value)?;
            }
            "reporting.max_recovery_attempts" => {
                self.reporting.max_recovery_attempts = parse_num(key, value)?;
            }
            "reporting.user_agent" => self.reporting.user_agent = value.to_string(),
            "boundary.max_retries" => self.boundary.max_retries = parse_num(key, value)?,
            "boundary.backoff_base_ms" => self.boundary.backoff_base_ms = parse_num(key, value)?,
            "boundary.backoff_cap_ms" => self.boundary.backoff_cap_ms = parse_num(key, value)?,
            "network.health_endpoint" => self.network.health_endpoint = non_empty(value),
            "network.probe_interval_secs" => {
                self.network.probe_interval_secs = parse_num(key, value)?;
            }
            "network.request_timeout_secs" => {
                self.network.request_timeout_secs = parse_num(key, value)?;
            }
            "device.camera" => self.device.camera = parse_bool(key, value)?,
            "device.gyroscope" => self.device.gyroscope = parse_bool(key, value)?,
            "device.accelerometer" => self.device.accelerometer = parse_bool(key, value)?,
            "device.xr_session" => self.device.xr_session = parse_bool(key, value)?,
            other => {
                return Err(EstateError::config(format!(
                    "unknown configuration key '{other}'"
                )))
            }
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> EstateResult<()> {
        if self.reporting.max_retained_records == 0 {
            return Err(EstateError::config(
                "reporting.max_retained_records must be at least 1",
            ));
        }
        if self.boundary.max_retries == 0 {
            return Err(EstateError::config("boundary.max_retries must be at least 1"));
        }
        if self.boundary.max_retries > self.reporting.max_recovery_attempts {
            return Err(EstateError::config(
                "boundary.max_retries must not exceed reporting.max_recovery_attempts",
            ));
        }
        if self.boundary.backoff_base_ms > self.boundary.backoff_cap_ms {
            return Err(EstateError::config(
                "boundary.backoff_base_ms must not exceed boundary.backoff_cap_ms",
            ));
        }
        if self.network.probe_interval_secs == 0 {
            return Err(EstateError::config(
                "network.probe_interval_secs must be at least 1",
            ));
        }
        for (name, endpoint) in [
            ("reporting.endpoint", &self.reporting.endpoint),
            ("network.health_endpoint", &self.network.health_endpoint),
        ] {
            if let Some(url) = endpoint {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(EstateError::config(format!(
                        "{name} must be an http(s) URL, got '{url}'"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> EstateResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| EstateError::config(format!("{key}: expected a number, got '{value}'")))
}

fn parse_bool(key: &str, value: &str) -> EstateResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(EstateError::config(format!(
            "{key}: expected a boolean, got '{value}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = EstateConfig::default();
        config.validate().unwrap();
        assert_eq!(config.boundary.max_retries, 3);
        assert_eq!(config.network.probe_interval_secs, 30);
        assert_eq!(config.boundary.backoff_cap_ms, 30_000);
        assert!(!config.reporting.environment.is_production());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EstateConfig::from_toml_str(
            r#"
            [reporting]
            environment = "production"
            endpoint = "https://errors.example.com/ingest"

            [device]
            camera = true
            "#,
        )
        .unwrap();
        assert!(config.reporting.environment.is_production());
        assert_eq!(config.reporting.max_retained_records, 500);
        assert!(config.device.camera);
        assert!(!config.device.xr_session);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[reporting]\nmax_recovery_attempts = 5\n\n[boundary]\nmax_retries = 5"
        )
        .unwrap();
        let config = EstateConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.boundary.max_retries, 5);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = EstateConfig::load(Some(Path::new("/nonexistent/estate.toml"))).unwrap();
        assert_eq!(config.boundary.max_retries, 3);
    }

    #[test]
    fn test_env_vars_override() {
        let mut config = EstateConfig::default();
        config
            .merge_with_vars([
                ("ESTATE_BOUNDARY_MAX_RETRIES".to_string(), "7".to_string()),
                ("ESTATE_DEVICE_XR_SESSION".to_string(), "yes".to_string()),
                ("ESTATE_REPORTING_ENVIRONMENT".to_string(), "prod".to_string()),
                ("UNRELATED".to_string(), "x".to_string()),
            ])
            .unwrap();
        assert_eq!(config.boundary.max_retries, 7);
        assert!(config.device.xr_session);
        assert_eq!(config.reporting.environment, Environment::Production);
    }

    #[test]
    fn test_boundary_retries_bounded_by_service_cap() {
        let mut config = EstateConfig::default();
        config.boundary.max_retries = 4;
        assert_matches!(config.validate(), Err(EstateError::Config { .. }));

        config.reporting.max_recovery_attempts = 4;
        config.validate().unwrap();
    }

    #[test]
    fn test_network_durations() {
        let network = NetworkSettings::default();
        assert_eq!(network.probe_interval(), Duration::from_secs(30));
        assert_eq!(network.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut config = EstateConfig::default();
        assert_matches!(
            config.set_from_string("boundary.colour", "blue"),
            Err(EstateError::Config { .. })
        );
    }

    #[test]
    fn test_validation_failures() {
        let mut config = EstateConfig::default();
        config.boundary.max_retries = 0;
        assert_matches!(config.validate(), Err(EstateError::Config { .. }));

        let mut config = EstateConfig::default();
        config.boundary.backoff_base_ms = 60_000;
        assert_matches!(config.validate(), Err(EstateError::Config { .. }));

        let mut config = EstateConfig::default();
        config.reporting.endpoint = Some("ftp://errors".to_string());
        assert_matches!(config.validate(), Err(EstateError::Config { .. }));
    }
}
