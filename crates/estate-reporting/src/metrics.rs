//! Aggregate error metrics

use estate_core::{ErrorCategory, ErrorRecord, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Length bound of [`ErrorMetrics::top_errors`].
pub const TOP_ERRORS_LIMIT: usize = 10;

/// A recurring error id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopError {
    /// Record id
    pub error_id: String,
    /// Times reported
    pub count: u64,
    /// Timestamp of the latest report (epoch ms)
    pub last_occurred: u64,
}

/// Process-wide aggregates, updated in place on every report.
///
/// Every category and severity key is present from construction, starting at
/// zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMetrics {
    /// Reports received
    pub total_errors: u64,
    /// Reports per category
    pub errors_by_category: BTreeMap<ErrorCategory, u64>,
    /// Reports per severity
    pub errors_by_severity: BTreeMap<Severity, u64>,
    /// Most reported ids, descending by count
    pub top_errors: Vec<TopError>,
    /// Recovered records over records with at least one recovery attempt
    pub recovery_success_rate: f64,
}

impl ErrorMetrics {
    /// Zeroed metrics.
    pub fn new() -> Self {
        Self {
            total_errors: 0,
            errors_by_category: ErrorCategory::ALL.iter().map(|c| (*c, 0)).collect(),
            errors_by_severity: Severity::ALL.iter().map(|s| (*s, 0)).collect(),
            top_errors: Vec::new(),
            recovery_success_rate: 0.0,
        }
    }

    /// Fold one report into the aggregates.
    pub fn record(&mut self, record: &ErrorRecord) {
        self.total_errors += 1;
        *self.errors_by_category.entry(record.category).or_insert(0) += 1;
        *self.errors_by_severity.entry(record.severity).or_insert(0) += 1;

        match self.top_errors.iter_mut().find(|e| e.error_id == record.id) {
            Some(entry) => {
                entry.count += 1;
                entry.last_occurred = record.timestamp_ms;
            }
            None => self.top_errors.push(TopError {
                error_id: record.id.clone(),
                count: 1,
                last_occurred: record.timestamp_ms,
            }),
        }
        // Stable: ties keep first-seen order.
        self.top_errors.sort_by(|a, b| b.count.cmp(&a.count));
        self.top_errors.truncate(TOP_ERRORS_LIMIT);
    }

    /// Reports seen for `category`.
    pub fn category_count(&self, category: ErrorCategory) -> u64 {
        self.errors_by_category.get(&category).copied().unwrap_or(0)
    }

    /// Reports seen for `severity`.
    pub fn severity_count(&self, severity: Severity) -> u64 {
        self.errors_by_severity.get(&severity).copied().unwrap_or(0)
    }
}

impl Default for ErrorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Recovery episodes started and recovered, feeding the success rate.
///
/// An episode starts with the first attempt on a record that has no open
/// attempt counter and ends when the counter is cleared by a success.
#[derive(Debug, Default)]
pub(crate) struct RecoveryTally {
    pub(crate) attempted: u64,
    pub(crate) recovered: u64,
}

impl RecoveryTally {
    pub(crate) fn record_attempt(&mut self) {
        self.attempted += 1;
    }

    pub(crate) fn record_recovery(&mut self) {
        self.recovered += 1;
    }

    pub(crate) fn rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.recovered as f64 / self.attempted as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_testkit::{record, record_with_severity};

    #[test]
    fn test_new_metrics_have_every_key() {
        let metrics = ErrorMetrics::new();
        assert_eq!(metrics.errors_by_category.len(), ErrorCategory::ALL.len());
        assert_eq!(metrics.errors_by_severity.len(), Severity::ALL.len());
        assert!(metrics.errors_by_category.values().all(|n| *n == 0));
    }

    #[test]
    fn test_repeat_ids_bubble_up() {
        let mut metrics = ErrorMetrics::new();
        metrics.record(&record("a", ErrorCategory::Ui));
        metrics.record(&record("b", ErrorCategory::Ui));
        metrics.record(&record_with_severity("b", ErrorCategory::Ui, Severity::Critical));

        assert_eq!(metrics.total_errors, 3);
        assert_eq!(metrics.top_errors[0].error_id, "b");
        assert_eq!(metrics.top_errors[0].count, 2);
        assert_eq!(metrics.severity_count(Severity::Critical), 1);
    }

    #[test]
    fn test_top_errors_truncate() {
        let mut metrics = ErrorMetrics::new();
        for i in 0..15 {
            metrics.record(&record(&format!("id-{i}"), ErrorCategory::Network));
        }
        assert_eq!(metrics.top_errors.len(), TOP_ERRORS_LIMIT);
        assert_eq!(metrics.category_count(ErrorCategory::Network), 15);
    }

    #[test]
    fn test_tally_rate() {
        let mut tally = RecoveryTally::default();
        assert_eq!(tally.rate(), 0.0);
        tally.record_attempt();
        tally.record_attempt();
        tally.record_recovery();
        assert!((tally.rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(ErrorMetrics::new()).unwrap();
        assert_eq!(json["totalErrors"], 0);
        assert_eq!(json["errorsByCategory"]["augmented-reality"], 0);
        assert_eq!(json["errorsBySeverity"]["critical"], 0);
    }
}
