use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

use crate::domain::sample::Timestamped;
use crate::domain::{HealthSample, LatencySample, ProbeResult};
use crate::ports::MetricStore;

/// In-memory sliding window of health and latency samples
pub struct MemoryStore {
    health: VecDeque<HealthSample>,
    latency: VecDeque<LatencySample>,
    retention: Duration,
}

impl MemoryStore {
    pub fn new(retention: Duration) -> Self {
        Self {
            health: VecDeque::new(),
            latency: VecDeque::new(),
            retention,
        }
    }

    pub fn with_default_retention() -> Self {
        Self::new(Duration::hours(24))
    }

    /// Timestamps never go backwards, even if the wall clock does.
    fn monotonic(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        match self.health.back() {
            Some(last) if last.timestamp > at => last.timestamp,
            _ => at,
        }
    }

    fn prune_front<T: Timestamped>(samples: &mut VecDeque<T>, cutoff: DateTime<Utc>) {
        while samples.front().is_some_and(|s| s.timestamp() <= cutoff) {
            samples.pop_front();
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_default_retention()
    }
}

impl MetricStore for MemoryStore {
    fn record(&mut self, result: &ProbeResult, at: DateTime<Utc>) {
        let at = self.monotonic(at);

        self.health.push_back(HealthSample::new(at, result.healthy));
        if let Some(latency_ms) = result.latency_ms {
            self.latency.push_back(LatencySample::new(at, latency_ms));
        }

        self.prune(at);
    }

    fn prune(&mut self, now: DateTime<Utc>) {
        let cutoff = now - self.retention;
        Self::prune_front(&mut self.health, cutoff);
        Self::prune_front(&mut self.latency, cutoff);
    }

    fn health_samples(&self) -> Vec<HealthSample> {
        self.health.iter().copied().collect()
    }

    fn latency_samples(&self) -> Vec<LatencySample> {
        self.latency.iter().copied().collect()
    }

    fn uptime_percent(&self) -> Option<f64> {
        if self.health.is_empty() {
            return None;
        }
        let healthy = self.health.iter().filter(|s| s.healthy).count();
        Some((healthy as f64 / self.health.len() as f64) * 100.0)
    }

    fn average_latency(&self) -> Option<f64> {
        if self.latency.is_empty() {
            return None;
        }
        let total: f64 = self.latency.iter().map(|s| s.latency_ms).sum();
        Some(total / self.latency.len() as f64)
    }

    fn max_latency(&self) -> Option<f64> {
        self.latency.iter().map(|s| s.latency_ms).reduce(f64::max)
    }

    fn len(&self) -> usize {
        self.health.len()
    }
}
