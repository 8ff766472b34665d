use async_trait::async_trait;

/// Delivery failure on a notification channel
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("provider returned status {0}")]
    Rejected(u16),
}

/// Email-style channel. Returns whether the message was accepted.
#[async_trait]
pub trait EmailNotifier: Send + Sync {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(&self, subject: &str, body: &str) -> bool;
}

/// SMS-style channel. Returns whether the message was accepted.
#[async_trait]
pub trait SmsNotifier: Send + Sync {
    fn name(&self) -> &str {
        "sms"
    }

    async fn send(&self, body: &str) -> bool;
}
