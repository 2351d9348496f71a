//! Prometheus Metrics
//!
//! Counters for codec operations and repair-policy requests, registered in
//! the default Prometheus registry on first use. The CLI dumps them with
//! `--metrics`; embedding services can expose `prometheus::gather()` however
//! they serve metrics.

use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

use crate::error::{Error, Result};

/// Codec operations by name and outcome
pub static CODEC_OPERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "lrc_codec_operations_total",
        "Total number of LRC codec operations",
        &["operation", "outcome"]
    )
    .expect("lrc_codec_operations_total registers once")
});

/// Repair-policy requests by the path that answered them
pub static POLICY_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "lrc_policy_requests_total",
        "Total number of repair policy requests",
        &["path"]
    )
    .expect("lrc_policy_requests_total registers once")
});

/// Codec operation names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Encode,
    LocalRepair,
    GlobalRepair,
    Verify,
}

impl Operation {
    fn as_str(&self) -> &'static str {
        match self {
            Operation::Encode => "encode",
            Operation::LocalRepair => "local_repair",
            Operation::GlobalRepair => "global_repair",
            Operation::Verify => "verify",
        }
    }
}

/// Record the outcome of a codec operation
pub(crate) fn record_operation<T>(operation: Operation, result: &Result<T>) {
    let outcome = if result.is_ok() { "ok" } else { "error" };
    CODEC_OPERATIONS
        .with_label_values(&[operation.as_str(), outcome])
        .inc();
}

/// Record a verification that completed but found inconsistent parity
pub(crate) fn record_inconsistent() {
    CODEC_OPERATIONS
        .with_label_values(&[Operation::Verify.as_str(), "inconsistent"])
        .inc();
}

/// Record which path answered a policy request
pub(crate) fn record_policy(path: &str) {
    POLICY_REQUESTS.with_label_values(&[path]).inc();
}

/// Render every registered metric in the Prometheus text format
pub fn render() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| Error::Internal(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer).map_err(|e| Error::Internal(format!("Metrics are not UTF-8: {}", e)))
}
