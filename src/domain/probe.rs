use serde::Serialize;

use super::{TargetDetail, TargetId};

/// Why a health check did not produce a healthy result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "cause", rename_all = "snake_case")]
pub enum ProbeFailure {
    #[error("target not found")]
    TargetNotFound,

    #[error("connection failed: {0}")]
    ConnectionFailure(String),

    #[error("detail fetch failed: {0}")]
    DetailFetchFailure(String),
}

/// Payload of a probe result: the target's status when healthy, the failure otherwise
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProbeDetail {
    Status(TargetDetail),
    Failure(ProbeFailure),
}

/// Result of a single health check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    pub target: TargetId,
    pub healthy: bool,
    pub detail: ProbeDetail,
    pub latency_ms: Option<f64>,
}

impl ProbeResult {
    pub fn healthy(target: TargetId, detail: TargetDetail, latency_ms: f64) -> Self {
        Self {
            target,
            healthy: true,
            detail: ProbeDetail::Status(detail),
            latency_ms: Some(latency_ms.max(0.0)),
        }
    }

    /// Failed checks never carry a latency: no complete round-trip was measured.
    pub fn failed(target: TargetId, failure: ProbeFailure) -> Self {
        Self {
            target,
            healthy: false,
            detail: ProbeDetail::Failure(failure),
            latency_ms: None,
        }
    }

    #[cfg(test)]
    pub fn failure(&self) -> Option<&ProbeFailure> {
        match &self.detail {
            ProbeDetail::Failure(failure) => Some(failure),
            ProbeDetail::Status(_) => None,
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> Option<&TargetDetail> {
        match &self.detail {
            ProbeDetail::Status(detail) => Some(detail),
            ProbeDetail::Failure(_) => None,
        }
    }

    /// Human-readable description of the detail, used as the alert reason
    pub fn describe(&self) -> String {
        match &self.detail {
            ProbeDetail::Failure(failure) => failure.to_string(),
            ProbeDetail::Status(detail) => format!(
                "collection '{}' status {} ({} segments)",
                detail.name, detail.status, detail.segment_count
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_messages() {
        assert_eq!(ProbeFailure::TargetNotFound.to_string(), "target not found");
        assert_eq!(
            ProbeFailure::ConnectionFailure("refused".into()).to_string(),
            "connection failed: refused"
        );
        assert_eq!(
            ProbeFailure::DetailFetchFailure("HTTP 500".into()).to_string(),
            "detail fetch failed: HTTP 500"
        );
    }

    #[test]
    fn test_failed_result_has_no_latency() {
        let result = ProbeResult::failed("docs".into(), ProbeFailure::TargetNotFound);
        assert!(!result.healthy);
        assert_eq!(result.latency_ms, None);
        assert_eq!(result.describe(), "target not found");
        assert!(result.status().is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let result = ProbeResult::failed(
            "docs".into(),
            ProbeFailure::ConnectionFailure("timed out".into()),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["healthy"], false);
        assert_eq!(json["detail"]["kind"], "connection_failure");
        assert_eq!(json["detail"]["cause"], "timed out");
        assert!(json["latency_ms"].is_null());

        let healthy = ProbeResult::healthy(
            "docs".into(),
            TargetDetail::new("docs", "green", 2).with_counts(Some(10), Some(10)),
            12.5,
        );
        let json = serde_json::to_value(&healthy).unwrap();
        assert_eq!(json["detail"]["name"], "docs");
        assert_eq!(json["detail"]["point_count"], 10);
        assert_eq!(json["latency_ms"], 12.5);
    }
}
