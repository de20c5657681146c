//! Metrics definitions for the token issuer.
//!
//! All metrics follow Prometheus naming conventions:
//! - `issuer_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded by code:
//! - `outcome`: minted, reused, rotated, none
//! - `status`: success, error
//! - `result`: active, inactive reasons (bounded enum)
//! - `operation`: session store operation names

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and return the handle used by `/metrics`.
///
/// # Errors
///
/// Returns error if a recorder is already installed in this process.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("issuer_token_issuance".to_string()),
            &[
                0.001, 0.002, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set token issuance buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

/// Record one `/token` call.
///
/// Metrics: `issuer_token_issuance_total`, `issuer_token_issuance_duration_seconds`
/// Labels: `outcome`, `status`
pub fn record_token_issuance(outcome: &str, status: &str, duration: Duration) {
    histogram!("issuer_token_issuance_duration_seconds", "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("issuer_token_issuance_total", "outcome" => outcome.to_string(), "status" => status.to_string())
        .increment(1);
}

/// Record an introspection result.
///
/// Metric: `issuer_introspections_total`
/// Labels: `result`
pub fn record_introspection(result: &str) {
    counter!("issuer_introspections_total", "result" => result.to_string()).increment(1);
}

/// Record a failed session store call.
///
/// Metric: `issuer_session_store_errors_total`
/// Labels: `operation`
pub fn record_session_store_error(operation: &str) {
    counter!("issuer_session_store_errors_total", "operation" => operation.to_string())
        .increment(1);
}

/// Record a registration attempt.
///
/// Metric: `issuer_registrations_total`
/// Labels: `status`
pub fn record_registration(status: &str) {
    counter!("issuer_registrations_total", "status" => status.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};

    fn counter_total(snapshotter: &Snapshotter, name: &str) -> u64 {
        snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter(|(key, _, _, _)| key.key().name() == name)
            .map(|(_, _, _, value)| match value {
                DebugValue::Counter(v) => v,
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn test_record_token_issuance_counts() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            record_token_issuance("minted", "success", Duration::from_millis(3));
            record_token_issuance("reused", "success", Duration::from_millis(1));
        });

        assert_eq!(counter_total(&snapshotter, "issuer_token_issuance_total"), 2);
    }

    #[test]
    fn test_record_introspection_counts() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            record_introspection("active");
            record_introspection("not_current");
            record_introspection("invalid_token");
        });

        assert_eq!(counter_total(&snapshotter, "issuer_introspections_total"), 3);
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_session_store_error("get");
        record_registration("success");
    }
}
