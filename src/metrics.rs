//! Metrics collection for asset serving
//!
//! This module provides thread-safe metrics collection using atomic operations.
//! It tracks responses by status, gzip variants served, bytes and latency.

use crate::validator_store::ValidatorStoreStats;
use http::StatusCode;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector for the asset service
///
/// All operations are thread-safe using atomic operations.
#[derive(Debug, Default)]
pub struct AssetMetrics {
    total_requests: AtomicU64,
    ok_responses: AtomicU64,
    not_modified_responses: AtomicU64,
    not_found_responses: AtomicU64,
    other_responses: AtomicU64,

    gzip_responses: AtomicU64,
    bytes_to_client: AtomicU64,

    // Stored as microseconds
    total_request_duration_us: AtomicU64,
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub ok_responses: u64,
    pub not_modified_responses: u64,
    pub not_found_responses: u64,
    pub other_responses: u64,
    pub gzip_responses: u64,
    pub bytes_to_client: u64,
    pub total_request_duration_us: u64,
}

impl AssetMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed request by its response status
    pub fn record_response(&self, status: StatusCode, duration: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let counter = if status == StatusCode::OK {
            &self.ok_responses
        } else if status == StatusCode::NOT_MODIFIED {
            &self.not_modified_responses
        } else if status == StatusCode::NOT_FOUND {
            &self.not_found_responses
        } else {
            &self.other_responses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.total_request_duration_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Record a full response served from a gzip sibling
    pub fn record_gzip_response(&self) {
        self.gzip_responses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record body bytes handed to the transport (GET bodies only)
    pub fn record_bytes_to_client(&self, bytes: u64) {
        self.bytes_to_client.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Get a snapshot of current metrics
    pub fn get_stats(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            ok_responses: self.ok_responses.load(Ordering::Relaxed),
            not_modified_responses: self.not_modified_responses.load(Ordering::Relaxed),
            not_found_responses: self.not_found_responses.load(Ordering::Relaxed),
            other_responses: self.other_responses.load(Ordering::Relaxed),
            gzip_responses: self.gzip_responses.load(Ordering::Relaxed),
            bytes_to_client: self.bytes_to_client.load(Ordering::Relaxed),
            total_request_duration_us: self.total_request_duration_us.load(Ordering::Relaxed),
        }
    }
}

impl MetricsSnapshot {
    /// Share of requests answered with 304, as a percentage (0.0 to 100.0)
    pub fn not_modified_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            (self.not_modified_responses as f64 / self.total_requests as f64) * 100.0
        }
    }

    /// Calculate average request duration in milliseconds
    pub fn avg_request_duration_ms(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            (self.total_request_duration_us as f64 / self.total_requests as f64) / 1000.0
        }
    }
}

/// Format metrics in Prometheus exposition format
pub fn format_prometheus_metrics(
    snapshot: &MetricsSnapshot,
    validators: &ValidatorStoreStats,
) -> String {
    let counters: [(&str, &str, u64); 10] = [
        ("static_requests_total", "Total number of asset requests", snapshot.total_requests),
        ("static_ok_responses_total", "Responses served with a full body", snapshot.ok_responses),
        ("static_not_modified_responses_total", "Responses answered with 304 Not Modified", snapshot.not_modified_responses),
        ("static_not_found_responses_total", "Responses answered with 404 Not Found", snapshot.not_found_responses),
        ("static_other_responses_total", "Responses with any other status", snapshot.other_responses),
        ("static_gzip_responses_total", "Full responses served from a gzip sibling", snapshot.gzip_responses),
        ("static_bytes_to_client_total", "Body bytes handed to the transport", snapshot.bytes_to_client),
        ("static_request_duration_microseconds_total", "Cumulative request handling time", snapshot.total_request_duration_us),
        ("static_validator_hits_total", "Validator store lookups answered from memory", validators.hits),
        ("static_validator_misses_total", "Validator store lookups that recomputed", validators.misses),
    ];

    let mut output = String::new();
    for (name, help, value) in counters {
        let _ = writeln!(output, "# HELP {} {}", name, help);
        let _ = writeln!(output, "# TYPE {} counter", name);
        let _ = writeln!(output, "{} {}", name, value);
        output.push('\n');
    }

    let _ = writeln!(output, "# HELP static_validator_entries Validator records currently stored");
    let _ = writeln!(output, "# TYPE static_validator_entries gauge");
    let _ = writeln!(output, "static_validator_entries {}", validators.entries);

    output
}
