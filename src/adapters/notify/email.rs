use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::config::EmailConfig;
use crate::ports::{EmailNotifier, NotifyError};

/// Email channel delivering through an HTTP mail relay
pub struct HttpEmailNotifier {
    client: reqwest::Client,
    config: EmailConfig,
}

impl HttpEmailNotifier {
    pub fn new(config: EmailConfig, timeout: Duration) -> Result<Self, NotifyError> {
        Ok(Self {
            client: super::build_client(timeout)?,
            config,
        })
    }

    async fn try_send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let payload = serde_json::json!({
            "from": self.config.from,
            "to": [self.config.to],
            "subject": subject,
            "text": body,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let mut request = self.client.post(&self.config.relay_url).json(&payload);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        super::check_response(request.send().await).await
    }
}

#[async_trait]
impl EmailNotifier for HttpEmailNotifier {
    async fn send(&self, subject: &str, body: &str) -> bool {
        match self.try_send(subject, body).await {
            Ok(()) => {
                debug!(to = %self.config.to, "Email accepted by relay");
                true
            }
            Err(e) => {
                error!(to = %self.config.to, error = %e, "Failed to send email");
                false
            }
        }
    }
}
