use chrono::{DateTime, Utc};

use crate::domain::{HealthSample, LatencySample, ProbeResult};

/// Port for the rolling history of probe results
pub trait MetricStore: Send + Sync {
    /// Append the samples for one check and prune everything outside the window ending at `at`
    fn record(&mut self, result: &ProbeResult, at: DateTime<Utc>);

    /// Drop samples that fell out of the window ending at `now`
    fn prune(&mut self, now: DateTime<Utc>);

    /// Health samples, oldest first
    fn health_samples(&self) -> Vec<HealthSample>;

    /// Latency samples, oldest first
    fn latency_samples(&self) -> Vec<LatencySample>;

    /// Percentage of healthy samples, `None` without data
    fn uptime_percent(&self) -> Option<f64>;

    fn average_latency(&self) -> Option<f64>;

    fn max_latency(&self) -> Option<f64>;

    /// Get the number of health samples
    fn len(&self) -> usize;

    /// Check if the store is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
