use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of one check, kept in the health history
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthSample {
    pub timestamp: DateTime<Utc>,
    pub healthy: bool,
}

impl HealthSample {
    pub fn new(timestamp: DateTime<Utc>, healthy: bool) -> Self {
        Self { timestamp, healthy }
    }
}

/// Round-trip time of one measured check
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencySample {
    pub timestamp: DateTime<Utc>,
    pub latency_ms: f64,
}

impl LatencySample {
    pub fn new(timestamp: DateTime<Utc>, latency_ms: f64) -> Self {
        Self {
            timestamp,
            latency_ms: latency_ms.max(0.0),
        }
    }
}

/// Anything carrying a sample timestamp, so both histories prune the same way
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

impl Timestamped for HealthSample {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Timestamped for LatencySample {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
