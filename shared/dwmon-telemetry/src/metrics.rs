//! Self-metrics primitives

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Monotonic counter
#[derive(Clone, Default)]
pub struct Counter {
    value: Arc<AtomicU64>,
    name: String,
}

impl Counter {
    pub fn new(name: &str) -> Self {
        Self {
            value: Arc::new(AtomicU64::new(0)),
            name: name.to_string(),
        }
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, n: u64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Summary of the samples currently held by a `DurationHistogram`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistogramSnapshot {
    pub count: usize,
    pub mean_ms: f64,
    pub p50_ms: f64,
    pub p99_ms: f64,
    pub max_ms: f64,
}

/// Sliding window of recent durations
#[derive(Clone)]
pub struct DurationHistogram {
    samples: Arc<Mutex<VecDeque<Duration>>>,
    name: String,
    max_samples: usize,
}

impl DurationHistogram {
    pub fn new(name: &str, max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            samples: Arc::new(Mutex::new(VecDeque::with_capacity(max_samples))),
            name: name.to_string(),
            max_samples,
        }
    }

    pub fn record(&self, value: Duration) {
        let mut samples = self.samples.lock();
        if samples.len() == self.max_samples {
            samples.pop_front();
        }
        samples.push_back(value);
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        let mut sorted: Vec<f64> = {
            let samples = self.samples.lock();
            samples.iter().map(|d| d.as_secs_f64() * 1000.0).collect()
        };
        if sorted.is_empty() {
            return HistogramSnapshot::default();
        }
        sorted.sort_by(f64::total_cmp);

        let rank = |p: f64| {
            let idx = ((sorted.len() as f64) * p / 100.0) as usize;
            sorted[idx.min(sorted.len() - 1)]
        };

        HistogramSnapshot {
            count: sorted.len(),
            mean_ms: sorted.iter().sum::<f64>() / sorted.len() as f64,
            p50_ms: rank(50.0),
            p99_ms: rank(99.0),
            max_ms: sorted[sorted.len() - 1],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
