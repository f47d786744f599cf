//! Thread-safe metrics collection
//!
//! Atomic counters for the hot paths and mutex-protected collections for the
//! timing samples and per-method tallies. Served as JSON from `/metrics`.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Processing-time samples kept for percentile estimates
const MAX_TIMING_SAMPLES: usize = 1000;

/// Global metrics collector instance
pub static METRICS: Lazy<MetricsCollector> = Lazy::new(MetricsCollector::new);

/// Get reference to global metrics collector
pub fn metrics() -> &'static MetricsCollector {
    &METRICS
}

pub struct MetricsCollector {
    tasks_received: AtomicU64,
    tasks_processing: AtomicU64,
    tasks_completed: AtomicU64,
    tasks_failed: AtomicU64,
    max_concurrent_tasks: AtomicU64,

    rpc_requests: AtomicU64,
    rpc_errors: AtomicU64,
    requests_by_method: Mutex<BTreeMap<String, u64>>,
    errors_by_code: Mutex<BTreeMap<i32, u64>>,

    processing_times: Mutex<Vec<u64>>, // milliseconds

    uptime_start: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            tasks_received: AtomicU64::new(0),
            tasks_processing: AtomicU64::new(0),
            tasks_completed: AtomicU64::new(0),
            tasks_failed: AtomicU64::new(0),
            max_concurrent_tasks: AtomicU64::new(0),
            rpc_requests: AtomicU64::new(0),
            rpc_errors: AtomicU64::new(0),
            requests_by_method: Mutex::new(BTreeMap::new()),
            errors_by_code: Mutex::new(BTreeMap::new()),
            processing_times: Mutex::new(Vec::new()),
            uptime_start: AtomicU64::new(current_timestamp()),
        }
    }

    // Task processing
    pub fn task_processing_started(&self) {
        self.tasks_received.fetch_add(1, Ordering::Relaxed);
        let in_flight = self.tasks_processing.fetch_add(1, Ordering::Relaxed) + 1;
        self.max_concurrent_tasks
            .fetch_max(in_flight, Ordering::Relaxed);
    }

    pub fn task_processing_completed(&self, duration: Duration) {
        self.tasks_completed.fetch_add(1, Ordering::Relaxed);
        self.finish_task(duration);
    }

    pub fn task_processing_failed(&self, duration: Duration) {
        self.tasks_failed.fetch_add(1, Ordering::Relaxed);
        self.finish_task(duration);
    }

    fn finish_task(&self, duration: Duration) {
        // Saturate rather than wrap if a finish is ever reported twice
        let _ = self
            .tasks_processing
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
        self.record_processing_time(duration);
    }

    fn record_processing_time(&self, duration: Duration) {
        if let Ok(mut times) = self.processing_times.lock() {
            times.push(duration.as_millis() as u64);
            if times.len() > MAX_TIMING_SAMPLES {
                times.remove(0);
            }
        }
    }

    // JSON-RPC
    pub fn rpc_request(&self, method: &str) {
        self.rpc_requests.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut methods) = self.requests_by_method.lock() {
            *methods.entry(method.to_string()).or_insert(0) += 1;
        }
    }

    pub fn rpc_error(&self, code: i32) {
        self.rpc_errors.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut codes) = self.errors_by_code.lock() {
            *codes.entry(code).or_insert(0) += 1;
        }
    }

    /// Reset every counter (useful for testing)
    pub fn reset(&self) {
        for counter in [
            &self.tasks_received,
            &self.tasks_processing,
            &self.tasks_completed,
            &self.tasks_failed,
            &self.max_concurrent_tasks,
            &self.rpc_requests,
            &self.rpc_errors,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        if let Ok(mut methods) = self.requests_by_method.lock() {
            methods.clear();
        }
        if let Ok(mut codes) = self.errors_by_code.lock() {
            codes.clear();
        }
        if let Ok(mut times) = self.processing_times.lock() {
            times.clear();
        }
        self.uptime_start
            .store(current_timestamp(), Ordering::Relaxed);
    }

    /// Average and p50/p95/p99 of the retained samples
    fn processing_time_statistics(&self) -> (f64, f64, f64, f64) {
        let Ok(times) = self.processing_times.lock() else {
            return (0.0, 0.0, 0.0, 0.0);
        };
        if times.is_empty() {
            return (0.0, 0.0, 0.0, 0.0);
        }

        let mut sorted = times.clone();
        drop(times);
        sorted.sort_unstable();

        let avg = sorted.iter().sum::<u64>() as f64 / sorted.len() as f64;
        (
            avg,
            percentile(&sorted, 50.0),
            percentile(&sorted, 95.0),
            percentile(&sorted, 99.0),
        )
    }

    pub fn get_metrics(&self) -> MetricsSnapshot {
        let now = current_timestamp();
        let (avg, p50, p95, p99) = self.processing_time_statistics();

        MetricsSnapshot {
            tasks: TaskMetrics {
                tasks_received: self.tasks_received.load(Ordering::Relaxed),
                tasks_processing: self.tasks_processing.load(Ordering::Relaxed),
                tasks_completed: self.tasks_completed.load(Ordering::Relaxed),
                tasks_failed: self.tasks_failed.load(Ordering::Relaxed),
                max_concurrent_tasks: self.max_concurrent_tasks.load(Ordering::Relaxed),
                avg_processing_time_ms: avg,
                processing_time_p50_ms: p50,
                processing_time_p95_ms: p95,
                processing_time_p99_ms: p99,
            },
            rpc: RpcMetrics {
                requests: self.rpc_requests.load(Ordering::Relaxed),
                errors: self.rpc_errors.load(Ordering::Relaxed),
                requests_by_method: self
                    .requests_by_method
                    .lock()
                    .map(|m| m.clone())
                    .unwrap_or_default(),
                errors_by_code: self
                    .errors_by_code
                    .lock()
                    .map(|m| m.clone())
                    .unwrap_or_default(),
            },
            uptime_seconds: now.saturating_sub(self.uptime_start.load(Ordering::Relaxed)),
            timestamp: now,
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub tasks: TaskMetrics,
    pub rpc: RpcMetrics,
    pub uptime_seconds: u64,
    pub timestamp: u64,
}

#[derive(Debug, Serialize)]
pub struct TaskMetrics {
    pub tasks_received: u64,
    pub tasks_processing: u64,
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub max_concurrent_tasks: u64,
    pub avg_processing_time_ms: f64,
    pub processing_time_p50_ms: f64,
    pub processing_time_p95_ms: f64,
    pub processing_time_p99_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct RpcMetrics {
    pub requests: u64,
    pub errors: u64,
    pub requests_by_method: BTreeMap<String, u64>,
    pub errors_by_code: BTreeMap<i32, u64>,
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Nearest-rank percentile over an ascending slice
fn percentile(sorted: &[u64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((pct / 100.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[rank.min(sorted.len() - 1)] as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_counters() {
        let collector = MetricsCollector::new();

        collector.task_processing_started();
        collector.task_processing_started();
        assert_eq!(collector.get_metrics().tasks.tasks_processing, 2);

        collector.task_processing_completed(Duration::from_millis(10));
        collector.task_processing_failed(Duration::from_millis(30));

        let tasks = collector.get_metrics().tasks;
        assert_eq!(tasks.tasks_received, 2);
        assert_eq!(tasks.tasks_processing, 0);
        assert_eq!(tasks.tasks_completed, 1);
        assert_eq!(tasks.tasks_failed, 1);
        assert_eq!(tasks.max_concurrent_tasks, 2);
        assert_eq!(tasks.avg_processing_time_ms, 20.0);
    }

    #[test]
    fn test_in_flight_never_underflows() {
        let collector = MetricsCollector::new();
        collector.task_processing_completed(Duration::ZERO);
        assert_eq!(collector.get_metrics().tasks.tasks_processing, 0);
    }

    #[test]
    fn test_rpc_tallies() {
        let collector = MetricsCollector::new();
        collector.rpc_request("tasks/send");
        collector.rpc_request("tasks/send");
        collector.rpc_request("tasks/get");
        collector.rpc_error(-32602);

        let rpc = collector.get_metrics().rpc;
        assert_eq!(rpc.requests, 3);
        assert_eq!(rpc.errors, 1);
        assert_eq!(rpc.requests_by_method["tasks/send"], 2);
        assert_eq!(rpc.errors_by_code[&-32602], 1);
    }

    #[test]
    fn test_timing_samples_are_bounded() {
        let collector = MetricsCollector::new();
        for i in 0..(MAX_TIMING_SAMPLES as u64 + 10) {
            collector.record_processing_time(Duration::from_millis(i));
        }
        let len = collector.processing_times.lock().unwrap().len();
        assert_eq!(len, MAX_TIMING_SAMPLES);
    }

    #[test]
    fn test_percentile() {
        let samples: Vec<u64> = (1..=100).collect();
        assert_eq!(percentile(&samples, 50.0), 51.0);
        assert_eq!(percentile(&samples, 99.0), 99.0);
        assert_eq!(percentile(&[], 95.0), 0.0);
    }

    #[test]
    fn test_reset() {
        let collector = MetricsCollector::new();
        collector.rpc_request("tasks/get");
        collector.task_processing_started();
        collector.reset();

        let snapshot = collector.get_metrics();
        assert_eq!(snapshot.rpc.requests, 0);
        assert!(snapshot.rpc.requests_by_method.is_empty());
        assert_eq!(snapshot.tasks.tasks_received, 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let value = serde_json::to_value(MetricsCollector::new().get_metrics()).unwrap();
        assert!(value["tasks"]["tasks_completed"].is_u64());
        assert!(value["rpc"]["errors_by_code"].is_object());
    }
}
