use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard};
use tracing::warn;

/// Identifies one counter/observation bucket. Typed key, so path contents
/// never collide with a separator; escaping happens only at render time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetricKey {
    pub method: String,
    pub path: String,
    pub status: u16,
}

impl MetricKey {
    fn new(method: &str, path: &str, status: u16) -> Self {
        MetricKey {
            method: method.to_string(),
            path: path.to_string(),
            status,
        }
    }
}

#[derive(Debug, Default)]
struct Bucket {
    request_count: u64,
    duration_samples: Vec<f64>,
}

/// In-memory request metrics, keyed by (method, path, status). Shared
/// across request tasks behind a mutex; recording failures are logged and
/// swallowed so they can never fail the request being served.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    buckets: Mutex<BTreeMap<MetricKey, Bucket>>,
}

impl MetricsRegistry {
    pub fn increment_request(&self, method: &str, path: &str, status: u16) {
        let mut buckets = self.lock();
        let bucket = buckets
            .entry(MetricKey::new(method, path, status))
            .or_default();
        bucket.request_count += 1;
    }

    pub fn observe_duration(&self, method: &str, path: &str, status: u16, seconds: f64) {
        let mut buckets = self.lock();
        let bucket = buckets
            .entry(MetricKey::new(method, path, status))
            .or_default();
        bucket.duration_samples.push(seconds);
    }

    /// Render the registry in Prometheus text exposition format: one
    /// counter line per key, then a `_sum`/`_count` pair per key that has
    /// duration samples. Count+sum summary only; no buckets, no quantiles.
    pub fn render(&self) -> String {
        let buckets = self.lock();
        let mut out = String::new();

        out.push_str("# HELP http_requests_total Total HTTP requests served, by method, path and status.\n");
        out.push_str("# TYPE http_requests_total counter\n");
        for (key, bucket) in buckets.iter() {
            let _ = writeln!(
                out,
                "http_requests_total{{method=\"{}\",path=\"{}\",status=\"{}\"}} {}",
                escape_label_value(&key.method),
                escape_label_value(&key.path),
                key.status,
                bucket.request_count,
            );
        }

        if buckets.values().any(|b| !b.duration_samples.is_empty()) {
            out.push_str("# HELP http_request_duration_seconds Wall-clock request duration in seconds.\n");
            out.push_str("# TYPE http_request_duration_seconds summary\n");
            for (key, bucket) in buckets.iter() {
                if bucket.duration_samples.is_empty() {
                    continue;
                }
                let labels = format!(
                    "method=\"{}\",path=\"{}\",status=\"{}\"",
                    escape_label_value(&key.method),
                    escape_label_value(&key.path),
                    key.status,
                );
                let sum: f64 = bucket.duration_samples.iter().sum();
                let _ = writeln!(out, "http_request_duration_seconds_sum{{{labels}}} {sum}");
                let _ = writeln!(
                    out,
                    "http_request_duration_seconds_count{{{labels}}} {}",
                    bucket.duration_samples.len(),
                );
            }
        }

        out
    }

    // A poisoned mutex means a panic mid-update; the counters are still
    // usable, so recover the inner map rather than dropping the record.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<MetricKey, Bucket>> {
        self.buckets.lock().unwrap_or_else(|poisoned| {
            warn!("metrics registry lock poisoned; continuing with recovered state");
            poisoned.into_inner()
        })
    }
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
