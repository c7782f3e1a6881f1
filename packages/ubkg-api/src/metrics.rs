//! Query metrics for the UBKG API
//!
//! Lightweight, thread-safe collection of per-query statistics. One
//! collector is shared by every request through the [`crate::executor::QueryExecutor`].
//!
//! # Overview
//!
//! Tracked per server:
//! - Query latencies with percentile calculations (p50, p95, p99)
//! - Slow query detection
//! - Per-template counts and average latency
//! - Timeouts, backend failures and rows dropped by lenient mapping
//!
//! The snapshot is reported under `query_stats` by `/status`.
//!
//! # Example
//!
//! ```
//! use ubkg_api::metrics::QueryMetrics;
//!
//! let metrics = QueryMetrics::new();
//! metrics.record_query("sabs", 15);
//!
//! let stats = metrics.snapshot();
//! assert_eq!(stats.query_count, 1);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use serde::Serialize;

/// Number of recent latencies kept for percentile calculation.
const LATENCY_WINDOW_SIZE: usize = 1000;

/// Number of recent slow queries kept for reporting.
const MAX_SLOW_QUERIES: usize = 10;

/// Number of templates listed in [`MetricsSnapshot::template_stats`].
const TOP_TEMPLATES: usize = 5;

/// Queries at or above this duration are recorded as slow.
///
/// Traversal templates routinely take hundreds of milliseconds, so the bar
/// is a full second.
pub const SLOW_QUERY_THRESHOLD_MS: u64 = 1000;

/// Thread-safe query metrics collector.
///
/// Create one per process and share it behind an `Arc`.
pub struct QueryMetrics {
    // ========================================================================
    // Query Metrics
    // ========================================================================
    /// Completed queries (successful ones only)
    query_count: AtomicU64,

    /// Queries at or above SLOW_QUERY_THRESHOLD_MS
    slow_query_count: AtomicU64,

    /// Rolling window of recent latencies
    latencies_ms: Mutex<VecDeque<u64>>,

    /// Sum of the latencies currently in the window
    latency_sum_ms: AtomicU64,

    // ========================================================================
    // Failures
    // ========================================================================
    timeout_count: AtomicU64,

    failure_count: AtomicU64,

    /// Rows skipped because they lacked expected columns
    dropped_row_count: AtomicU64,

    // ========================================================================
    // Per-template
    // ========================================================================
    /// template → (count, latency sum)
    templates: Mutex<HashMap<String, (u64, u64)>>,

    slow_queries: Mutex<VecDeque<SlowQuery>>,

    started_at: Instant,
}

/// A query that took at least SLOW_QUERY_THRESHOLD_MS.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SlowQuery {
    /// Template name, e.g. `concepts_expand`
    pub template: String,
    pub duration_ms: u64,
    /// When the query finished (ms since the collector started)
    pub timestamp_ms: u64,
}

/// Point-in-time copy of the metrics.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MetricsSnapshot {
    pub query_count: u64,
    pub slow_query_count: u64,
    pub query_p50_ms: u64,
    pub query_p95_ms: u64,
    pub query_p99_ms: u64,
    pub query_avg_ms: u64,

    pub timeout_count: u64,
    pub failure_count: u64,
    pub dropped_row_count: u64,

    /// Most recent slow queries, oldest first
    pub top_slow_queries: Vec<SlowQuery>,

    pub uptime_secs: u64,

    /// Most frequently run templates
    pub template_stats: Vec<TemplateStat>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TemplateStat {
    pub template: String,
    pub count: u64,
    pub avg_ms: u64,
}

impl QueryMetrics {
    pub fn new() -> Self {
        Self {
            query_count: AtomicU64::new(0),
            slow_query_count: AtomicU64::new(0),
            latencies_ms: Mutex::new(VecDeque::with_capacity(LATENCY_WINDOW_SIZE)),
            latency_sum_ms: AtomicU64::new(0),
            timeout_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            dropped_row_count: AtomicU64::new(0),
            templates: Mutex::new(HashMap::new()),
            slow_queries: Mutex::new(VecDeque::with_capacity(MAX_SLOW_QUERIES)),
            started_at: Instant::now(),
        }
    }

    /// Record a completed query.
    ///
    /// O(1) amortized: atomic increments plus bounded deque operations.
    pub fn record_query(&self, template: &str, duration_ms: u64) {
        self.query_count.fetch_add(1, Ordering::Relaxed);

        {
            let mut templates = self.templates.lock().unwrap();
            let entry = templates.entry(template.to_string()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += duration_ms;
        }

        {
            let mut latencies = self.latencies_ms.lock().unwrap();
            if latencies.len() >= LATENCY_WINDOW_SIZE {
                if let Some(old) = latencies.pop_front() {
                    self.latency_sum_ms.fetch_sub(old, Ordering::Relaxed);
                }
            }
            latencies.push_back(duration_ms);
            self.latency_sum_ms.fetch_add(duration_ms, Ordering::Relaxed);
        }

        if duration_ms >= SLOW_QUERY_THRESHOLD_MS {
            self.slow_query_count.fetch_add(1, Ordering::Relaxed);

            let slow_query = SlowQuery {
                template: template.to_string(),
                duration_ms,
                timestamp_ms: self.started_at.elapsed().as_millis() as u64,
            };

            let mut slow_queries = self.slow_queries.lock().unwrap();
            if slow_queries.len() >= MAX_SLOW_QUERIES {
                slow_queries.pop_front();
            }
            slow_queries.push_back(slow_query);
        }
    }

    pub fn record_timeout(&self) {
        self.timeout_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_rows(&self, dropped: usize) {
        if dropped > 0 {
            self.dropped_row_count.fetch_add(dropped as u64, Ordering::Relaxed);
        }
    }

    /// O(LATENCY_WINDOW_SIZE) for the percentile sort; only `/status` calls it.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let (p50, p95, p99, avg) = {
            let latencies = self.latencies_ms.lock().unwrap();
            if latencies.is_empty() {
                (0, 0, 0, 0)
            } else {
                let mut sorted: Vec<u64> = latencies.iter().copied().collect();
                sorted.sort_unstable();

                let len = sorted.len();
                let p50 = sorted[len * 50 / 100];
                let p95 = sorted[len * 95 / 100];
                let p99 = sorted.get(len * 99 / 100).copied().unwrap_or(sorted[len - 1]);
                let avg = self.latency_sum_ms.load(Ordering::Relaxed) / len as u64;

                (p50, p95, p99, avg)
            }
        };

        let top_slow = {
            let slow = self.slow_queries.lock().unwrap();
            slow.iter().cloned().collect()
        };

        MetricsSnapshot {
            query_count: self.query_count.load(Ordering::Relaxed),
            slow_query_count: self.slow_query_count.load(Ordering::Relaxed),
            query_p50_ms: p50,
            query_p95_ms: p95,
            query_p99_ms: p99,
            query_avg_ms: avg,
            timeout_count: self.timeout_count.load(Ordering::Relaxed),
            failure_count: self.failure_count.load(Ordering::Relaxed),
            dropped_row_count: self.dropped_row_count.load(Ordering::Relaxed),
            top_slow_queries: top_slow,
            uptime_secs: self.started_at.elapsed().as_secs(),
            template_stats: self.top_templates(TOP_TEMPLATES),
        }
    }

    /// Top `n` templates by count; ties broken by name so output is stable.
    fn top_templates(&self, n: usize) -> Vec<TemplateStat> {
        let templates = self.templates.lock().unwrap();
        let mut stats: Vec<TemplateStat> = templates
            .iter()
            .map(|(name, (count, latency_sum))| TemplateStat {
                template: name.clone(),
                count: *count,
                avg_ms: if *count > 0 { latency_sum / count } else { 0 },
            })
            .collect();

        stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.template.cmp(&b.template)));
        stats.truncate(n);
        stats
    }
}

impl Default for QueryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod metrics_tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_metrics_new() {
        let snap = QueryMetrics::new().snapshot();
        assert_eq!(snap.query_count, 0);
        assert_eq!(snap.query_p50_ms, 0);
        assert_eq!(snap.query_p99_ms, 0);
        assert_eq!(snap.timeout_count, 0);
        assert!(snap.top_slow_queries.is_empty());
        assert!(snap.template_stats.is_empty());
    }

    #[test]
    fn test_slow_query_tracking() {
        let m = QueryMetrics::new();
        m.record_query("sabs", 50);
        m.record_query("sabs", SLOW_QUERY_THRESHOLD_MS - 1);
        assert_eq!(m.snapshot().slow_query_count, 0);

        m.record_query("concepts_expand", SLOW_QUERY_THRESHOLD_MS);
        let snap = m.snapshot();
        assert_eq!(snap.slow_query_count, 1);
        assert_eq!(snap.top_slow_queries[0].template, "concepts_expand");
        assert_eq!(snap.top_slow_queries[0].duration_ms, SLOW_QUERY_THRESHOLD_MS);
    }

    #[test]
    fn test_slow_query_buffer_is_bounded() {
        let m = QueryMetrics::new();
        for i in 0..(MAX_SLOW_QUERIES as u64 + 5) {
            m.record_query("concepts_subgraph", SLOW_QUERY_THRESHOLD_MS + i);
        }
        let snap = m.snapshot();
        assert_eq!(snap.top_slow_queries.len(), MAX_SLOW_QUERIES);
        assert_eq!(snap.top_slow_queries[0].duration_ms, SLOW_QUERY_THRESHOLD_MS + 5);
    }

    #[test]
    fn test_percentiles() {
        let m = QueryMetrics::new();
        for ms in 1..=100 {
            m.record_query("sabs", ms);
        }
        let snap = m.snapshot();
        assert_eq!(snap.query_p50_ms, 51);
        assert_eq!(snap.query_p95_ms, 96);
        assert_eq!(snap.query_p99_ms, 100);
        assert_eq!(snap.query_avg_ms, 50);
    }

    #[test]
    fn test_latency_window_evicts_oldest() {
        let m = QueryMetrics::new();
        for _ in 0..LATENCY_WINDOW_SIZE {
            m.record_query("sabs", 1000);
        }
        for _ in 0..LATENCY_WINDOW_SIZE {
            m.record_query("sabs", 10);
        }
        let snap = m.snapshot();
        assert_eq!(snap.query_avg_ms, 10);
        assert_eq!(snap.query_count, 2 * LATENCY_WINDOW_SIZE as u64);
    }

    #[test]
    fn test_template_stats_sorted_by_count() {
        let m = QueryMetrics::new();
        m.record_query("sources", 30);
        m.record_query("sabs", 10);
        m.record_query("sabs", 20);
        let stats = m.snapshot().template_stats;
        assert_eq!(stats[0].template, "sabs");
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].avg_ms, 15);
        assert_eq!(stats[1].template, "sources");
    }

    #[test]
    fn test_failure_counters() {
        let m = QueryMetrics::new();
        m.record_timeout();
        m.record_failure();
        m.record_failure();
        m.record_dropped_rows(0);
        m.record_dropped_rows(3);
        let snap = m.snapshot();
        assert_eq!(snap.timeout_count, 1);
        assert_eq!(snap.failure_count, 2);
        assert_eq!(snap.dropped_row_count, 3);
    }

    #[test]
    fn test_concurrent_recording() {
        let m = Arc::new(QueryMetrics::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let m = Arc::clone(&m);
                thread::spawn(move || {
                    for _ in 0..250 {
                        m.record_query("terms_term_id_codes", 5);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let snap = m.snapshot();
        assert_eq!(snap.query_count, 1000);
        assert_eq!(snap.template_stats[0].count, 1000);
    }
}
