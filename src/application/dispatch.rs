use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::domain::{AlertMessage, TargetId, Verdict};
use crate::ports::{EmailNotifier, SmsNotifier};

/// Per-channel delivery outcome; `None` means the channel is not configured
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub email: Option<bool>,
    pub sms: Option<bool>,
}

/// Delivers confirmed alerts through every configured channel
#[derive(Default)]
pub struct AlertDispatcher {
    email: Option<Arc<dyn EmailNotifier>>,
    sms: Option<Arc<dyn SmsNotifier>>,
}

impl AlertDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_email(mut self, notifier: Arc<dyn EmailNotifier>) -> Self {
        self.email = Some(notifier);
        self
    }

    pub fn with_sms(mut self, notifier: Arc<dyn SmsNotifier>) -> Self {
        self.sms = Some(notifier);
        self
    }

    pub fn channels(&self) -> Vec<&str> {
        let mut channels = Vec::new();
        if let Some(email) = &self.email {
            channels.push(email.name());
        }
        if let Some(sms) = &self.sms {
            channels.push(sms.name());
        }
        channels
    }

    /// Sends once per channel, concurrently. A failing channel never stops the other.
    pub async fn dispatch(&self, verdict: &Verdict, target: &TargetId) -> DispatchReport {
        let Some(message) = AlertMessage::for_verdict(verdict, target) else {
            return DispatchReport::default();
        };

        let email = async {
            match &self.email {
                Some(notifier) => Some(notifier.send(&message.subject, &message.body).await),
                None => None,
            }
        };
        let sms = async {
            match &self.sms {
                Some(notifier) => Some(notifier.send(&message.sms).await),
                None => None,
            }
        };

        let (email, sms) = futures::join!(email, sms);
        let report = DispatchReport { email, sms };

        for (channel, outcome) in [("email", report.email), ("sms", report.sms)] {
            match outcome {
                Some(true) => info!(collection = %target, channel, "Alert sent"),
                Some(false) => error!(collection = %target, channel, "Alert delivery failed"),
                None => {}
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingEmail {
        ok: bool,
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl EmailNotifier for RecordingEmail {
        async fn send(&self, subject: &str, body: &str) -> bool {
            self.sent
                .lock()
                .unwrap()
                .push((subject.to_string(), body.to_string()));
            self.ok
        }
    }

    #[derive(Default)]
    struct RecordingSms {
        ok: bool,
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SmsNotifier for RecordingSms {
        async fn send(&self, body: &str) -> bool {
            self.sent.lock().unwrap().push(body.to_string());
            self.ok
        }
    }

    fn failure() -> Verdict {
        Verdict::Failure {
            reason: "connection failed: refused".to_string(),
        }
    }

    #[tokio::test]
    async fn test_failing_channel_does_not_block_other() {
        let email = Arc::new(RecordingEmail {
            ok: false,
            ..Default::default()
        });
        let sms = Arc::new(RecordingSms {
            ok: true,
            ..Default::default()
        });
        let dispatcher = AlertDispatcher::new()
            .with_email(email.clone())
            .with_sms(sms.clone());

        let report = dispatcher.dispatch(&failure(), &"docs".into()).await;

        assert_eq!(
            report,
            DispatchReport {
                email: Some(false),
                sms: Some(true)
            }
        );
        assert_eq!(email.sent.lock().unwrap().len(), 1);
        assert_eq!(
            sms.sent.lock().unwrap()[0],
            "Qdrant API is down: connection failed: refused..."
        );
    }

    #[tokio::test]
    async fn test_clear_verdict_sends_nothing() {
        let email = Arc::new(RecordingEmail {
            ok: true,
            ..Default::default()
        });
        let dispatcher = AlertDispatcher::new().with_email(email.clone());

        let report = dispatcher.dispatch(&Verdict::Clear, &"docs".into()).await;

        assert_eq!(report, DispatchReport::default());
        assert!(email.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_channels() {
        let dispatcher = AlertDispatcher::new();
        assert!(dispatcher.channels().is_empty());

        let report = dispatcher.dispatch(&failure(), &"docs".into()).await;
        assert_eq!(report, DispatchReport::default());
    }
}
