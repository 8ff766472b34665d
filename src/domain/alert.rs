use serde::{Deserialize, Serialize};

use super::{ProbeResult, TargetId};

const SMS_REASON_LIMIT: usize = 100;

/// Classification of a probe result against the latency threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    /// Nothing worth notifying about
    Clear,
    Failure { reason: String },
    LatencyBreach { latency_ms: f64, threshold_ms: f64 },
}

impl Verdict {
    /// Maps a probe result to a verdict. Failures take priority over latency,
    /// and a latency equal to the threshold is not a breach.
    pub fn evaluate(result: &ProbeResult, threshold_ms: f64) -> Self {
        if !result.healthy {
            return Self::Failure {
                reason: result.describe(),
            };
        }

        match result.latency_ms {
            Some(latency_ms) if latency_ms > threshold_ms => Self::LatencyBreach {
                latency_ms,
                threshold_ms,
            },
            _ => Self::Clear,
        }
    }

    pub fn is_alert(&self) -> bool {
        !matches!(self, Self::Clear)
    }
}

/// Rendered notification text for each channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
    pub sms: String,
}

impl AlertMessage {
    /// Returns `None` for a clear verdict.
    pub fn for_verdict(verdict: &Verdict, target: &TargetId) -> Option<Self> {
        match verdict {
            Verdict::Clear => None,
            Verdict::Failure { reason } => Some(Self {
                subject: "Qdrant Monitor Alert - API Down".to_string(),
                body: format!("Collection '{}' failed its health check.\n\n{}", target, reason),
                sms: format!("Qdrant API is down: {}...", truncate(reason, SMS_REASON_LIMIT)),
            }),
            Verdict::LatencyBreach {
                latency_ms,
                threshold_ms,
            } => Some(Self {
                subject: "Qdrant Monitor Alert - Slow Response".to_string(),
                body: format!(
                    "Collection '{}' responded in {:.2} ms, above the {} ms threshold.",
                    target, latency_ms, threshold_ms
                ),
                sms: format!(
                    "Qdrant API slow: {:.2} ms on '{}' (threshold {} ms)",
                    latency_ms, target, threshold_ms
                ),
            }),
        }
    }
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProbeFailure, TargetDetail};

    fn healthy(latency_ms: f64) -> ProbeResult {
        ProbeResult::healthy("docs".into(), TargetDetail::new("docs", "green", 1), latency_ms)
    }

    #[test]
    fn test_unhealthy_is_always_failure() {
        let result = ProbeResult::failed("docs".into(), ProbeFailure::TargetNotFound);
        assert_eq!(
            Verdict::evaluate(&result, 500.0),
            Verdict::Failure {
                reason: "target not found".to_string()
            }
        );

        // Even a forged result with a tiny latency stays a failure
        let mut forged = ProbeResult::failed(
            "docs".into(),
            ProbeFailure::DetailFetchFailure("boom".into()),
        );
        forged.latency_ms = Some(1.0);
        assert!(matches!(
            Verdict::evaluate(&forged, 500.0),
            Verdict::Failure { .. }
        ));
    }

    #[test]
    fn test_latency_breach_is_strict() {
        assert_eq!(
            Verdict::evaluate(&healthy(600.0), 500.0),
            Verdict::LatencyBreach {
                latency_ms: 600.0,
                threshold_ms: 500.0
            }
        );
        assert_eq!(Verdict::evaluate(&healthy(500.0), 500.0), Verdict::Clear);
        assert_eq!(Verdict::evaluate(&healthy(0.0), 100.0), Verdict::Clear);
    }

    #[test]
    fn test_clear_has_no_message() {
        assert!(AlertMessage::for_verdict(&Verdict::Clear, &"docs".into()).is_none());
        assert!(!Verdict::Clear.is_alert());
    }

    #[test]
    fn test_failure_message_truncates_sms() {
        let reason = "x".repeat(250);
        let message = AlertMessage::for_verdict(
            &Verdict::Failure {
                reason: reason.clone(),
            },
            &"docs".into(),
        )
        .unwrap();

        assert_eq!(message.subject, "Qdrant Monitor Alert - API Down");
        assert!(message.body.contains(&reason));
        assert_eq!(
            message.sms,
            format!("Qdrant API is down: {}...", "x".repeat(100))
        );
    }

    #[test]
    fn test_breach_message() {
        let message = AlertMessage::for_verdict(
            &Verdict::LatencyBreach {
                latency_ms: 612.345,
                threshold_ms: 500.0,
            },
            &"docs".into(),
        )
        .unwrap();

        assert_eq!(message.subject, "Qdrant Monitor Alert - Slow Response");
        assert!(message.body.contains("612.35 ms"));
        assert!(message.sms.contains("threshold 500 ms"));
    }
}
