//! Reservation metrics in Prometheus text format
//!
//! Tracks:
//! - Outcome counters (confirmed, waitlisted, cancelled, promoted, ...)
//! - Errors by class
//! - Availability store call latency histograms
//! - Pending divergences awaiting reconciliation

use crate::common::error::ErrorKind;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Histogram bucket boundaries for latency measurements (in milliseconds)
const LATENCY_BUCKETS: [f64; 10] = [1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0];

/// Fixed-bucket histogram for latency tracking
#[derive(Debug)]
pub struct Histogram {
    buckets: Vec<AtomicU64>,
    boundaries: Vec<f64>,
    sum: AtomicU64,
    count: AtomicU64,
}

impl Histogram {
    pub fn new() -> Self {
        Self::with_buckets(&LATENCY_BUCKETS)
    }

    pub fn with_buckets(boundaries: &[f64]) -> Self {
        Self {
            buckets: (0..=boundaries.len()).map(|_| AtomicU64::new(0)).collect(),
            boundaries: boundaries.to_vec(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Record a value in the histogram
    pub fn observe(&self, value: f64) {
        let bucket_idx = self
            .boundaries
            .iter()
            .position(|&boundary| value <= boundary)
            .unwrap_or(self.boundaries.len());

        self.buckets[bucket_idx].fetch_add(1, Ordering::Relaxed);
        // Sum kept in microseconds
        self.sum
            .fetch_add((value * 1000.0) as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Cumulative `(le, count)` pairs, ending with `+Inf`
    pub fn get_buckets(&self) -> Vec<(f64, u64)> {
        let mut cumulative = 0u64;
        let mut result = Vec::with_capacity(self.boundaries.len() + 1);

        for (i, &boundary) in self.boundaries.iter().enumerate() {
            cumulative += self.buckets[i].load(Ordering::Relaxed);
            result.push((boundary, cumulative));
        }

        cumulative += self.buckets[self.boundaries.len()].load(Ordering::Relaxed);
        result.push((f64::INFINITY, cumulative));

        result
    }

    pub fn sum(&self) -> f64 {
        self.sum.load(Ordering::Relaxed) as f64 / 1000.0
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicU64,
}

impl Gauge {
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    pub fn set(&self, v: u64) {
        self.value.store(v, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Which availability store operation a latency sample belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamOp {
    GetTable,
    SetAvailability,
}

impl UpstreamOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamOp::GetTable => "get_table",
            UpstreamOp::SetAvailability => "set_availability",
        }
    }
}

/// Metrics registry for the coordinator
#[derive(Debug)]
pub struct MetricsRegistry {
    pub confirmed: Counter,
    pub waitlisted: Counter,
    pub cancelled: Counter,
    pub promoted: Counter,
    pub waitlist_removals: Counter,

    pub validation_errors: Counter,
    pub not_found_errors: Counter,
    pub upstream_errors: Counter,
    pub internal_errors: Counter,

    pub pending_divergences: Gauge,

    get_table_latency: Histogram,
    set_availability_latency: Histogram,

    start_time: Instant,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            confirmed: Counter::new(),
            waitlisted: Counter::new(),
            cancelled: Counter::new(),
            promoted: Counter::new(),
            waitlist_removals: Counter::new(),
            validation_errors: Counter::new(),
            not_found_errors: Counter::new(),
            upstream_errors: Counter::new(),
            internal_errors: Counter::new(),
            pending_divergences: Gauge::new(),
            get_table_latency: Histogram::new(),
            set_availability_latency: Histogram::new(),
            start_time: Instant::now(),
        }
    }

    pub fn record_error(&self, kind: ErrorKind) {
        match kind {
            ErrorKind::Validation => self.validation_errors.inc(),
            ErrorKind::NotFound => self.not_found_errors.inc(),
            ErrorKind::UpstreamUnavailable => self.upstream_errors.inc(),
            ErrorKind::Internal => self.internal_errors.inc(),
        }
    }

    pub fn record_upstream(&self, op: UpstreamOp, duration: Duration) {
        self.upstream_latency(op)
            .observe(duration.as_secs_f64() * 1000.0);
    }

    pub fn upstream_latency(&self, op: UpstreamOp) -> &Histogram {
        match op {
            UpstreamOp::GetTable => &self.get_table_latency,
            UpstreamOp::SetAvailability => &self.set_availability_latency,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Generate Prometheus-compatible metrics output
    pub fn to_prometheus(&self) -> String {
        let mut out = String::new();

        out.push_str("# HELP tableside_outcomes_total Reservation requests by outcome\n");
        out.push_str("# TYPE tableside_outcomes_total counter\n");
        for (outcome, counter) in [
            ("confirmed", &self.confirmed),
            ("waitlisted", &self.waitlisted),
            ("cancelled", &self.cancelled),
            ("promoted", &self.promoted),
            ("removed_from_waitlist", &self.waitlist_removals),
        ] {
            let _ = writeln!(
                out,
                "tableside_outcomes_total{{outcome=\"{}\"}} {}",
                outcome,
                counter.get()
            );
        }

        out.push_str("# HELP tableside_errors_total Failed reservation requests by class\n");
        out.push_str("# TYPE tableside_errors_total counter\n");
        for (class, counter) in [
            ("validation", &self.validation_errors),
            ("not_found", &self.not_found_errors),
            ("upstream", &self.upstream_errors),
            ("internal", &self.internal_errors),
        ] {
            let _ = writeln!(
                out,
                "tableside_errors_total{{class=\"{}\"}} {}",
                class,
                counter.get()
            );
        }

        out.push_str("# HELP tableside_pending_divergences Cancellations awaiting reconciliation\n");
        out.push_str("# TYPE tableside_pending_divergences gauge\n");
        let _ = writeln!(
            out,
            "tableside_pending_divergences {}",
            self.pending_divergences.get()
        );

        out.push_str("# HELP tableside_uptime_seconds Server uptime in seconds\n");
        out.push_str("# TYPE tableside_uptime_seconds gauge\n");
        let _ = writeln!(out, "tableside_uptime_seconds {}", self.uptime_seconds());

        out.push_str(
            "# HELP tableside_upstream_duration_ms Availability store call duration in milliseconds\n",
        );
        out.push_str("# TYPE tableside_upstream_duration_ms histogram\n");
        for op in [UpstreamOp::GetTable, UpstreamOp::SetAvailability] {
            let hist = self.upstream_latency(op);
            for (le, count) in hist.get_buckets() {
                let le = if le.is_infinite() {
                    "+Inf".to_string()
                } else {
                    le.to_string()
                };
                let _ = writeln!(
                    out,
                    "tableside_upstream_duration_ms_bucket{{op=\"{}\",le=\"{}\"}} {}",
                    op.as_str(),
                    le,
                    count
                );
            }
            let _ = writeln!(
                out,
                "tableside_upstream_duration_ms_sum{{op=\"{}\"}} {}",
                op.as_str(),
                hist.sum()
            );
            let _ = writeln!(
                out,
                "tableside_upstream_duration_ms_count{{op=\"{}\"}} {}",
                op.as_str(),
                hist.count()
            );
        }

        out
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global metrics instance
pub static METRICS: once_cell::sync::Lazy<MetricsRegistry> =
    once_cell::sync::Lazy::new(MetricsRegistry::new);
