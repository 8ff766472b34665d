use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, warn};

use crate::domain::{ProbeFailure, ProbeResult, TargetId};
use crate::ports::TargetSource;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Executes one health check against a target
pub struct HealthProbe {
    source: Arc<dyn TargetSource>,
    timeout: Duration,
}

impl HealthProbe {
    pub fn new(source: Arc<dyn TargetSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Never fails: every transport problem is folded into the returned result.
    pub async fn check(&self, target: &TargetId) -> ProbeResult {
        match tokio::time::timeout(self.timeout, self.run(target)).await {
            Ok(result) => result,
            Err(_) => {
                error!(collection = %target, timeout = ?self.timeout, "Health check timed out");
                ProbeResult::failed(
                    target.clone(),
                    ProbeFailure::ConnectionFailure(format!(
                        "no response within {}s",
                        self.timeout.as_secs_f64()
                    )),
                )
            }
        }
    }

    async fn run(&self, target: &TargetId) -> ProbeResult {
        let started = Instant::now();

        let targets = match self.source.list_targets().await {
            Ok(targets) => targets,
            Err(e) => {
                error!(collection = %target, error = %e, "Connection error");
                return ProbeResult::failed(
                    target.clone(),
                    ProbeFailure::ConnectionFailure(e.to_string()),
                );
            }
        };

        if !targets.contains(target) {
            warn!(collection = %target, known = targets.len(), "Target not found");
            return ProbeResult::failed(target.clone(), ProbeFailure::TargetNotFound);
        }

        match self.source.get_target_detail(target).await {
            Ok(detail) => {
                let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
                debug!(collection = %target, latency_ms, status = %detail.status, "Health check passed");
                ProbeResult::healthy(target.clone(), detail, latency_ms)
            }
            Err(e) => {
                error!(collection = %target, error = %e, "Detail fetch error");
                ProbeResult::failed(
                    target.clone(),
                    ProbeFailure::DetailFetchFailure(e.to_string()),
                )
            }
        }
    }
}
