use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::config::SmsConfig;
use crate::ports::{NotifyError, SmsNotifier};

/// SMS channel using the Twilio Messages API
pub struct TwilioSmsNotifier {
    client: reqwest::Client,
    config: SmsConfig,
}

impl TwilioSmsNotifier {
    pub fn new(config: SmsConfig, timeout: Duration) -> Result<Self, NotifyError> {
        Ok(Self {
            client: super::build_client(timeout)?,
            config,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    async fn try_send(&self, body: &str) -> Result<(), NotifyError> {
        let params = [
            ("To", self.config.to.as_str()),
            ("From", self.config.from.as_str()),
            ("Body", body),
        ];

        let request = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params);

        super::check_response(request.send().await).await
    }
}

#[async_trait]
impl SmsNotifier for TwilioSmsNotifier {
    async fn send(&self, body: &str) -> bool {
        match self.try_send(body).await {
            Ok(()) => {
                debug!(to = %self.config.to, "SMS queued by provider");
                true
            }
            Err(e) => {
                error!(to = %self.config.to, error = %e, "Failed to send SMS");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> SmsConfig {
        SmsConfig {
            account_sid: "AC123".to_string(),
            auth_token: "token".to_string(),
            from: "+15550001111".to_string(),
            to: "+15552223333".to_string(),
            api_base: server.uri(),
        }
    }

    #[tokio::test]
    async fn test_send_posts_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .and(header_exists("authorization"))
            .and(body_string_contains("Body=Qdrant+API+is+down"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = TwilioSmsNotifier::new(config(&server), Duration::from_secs(2)).unwrap();
        assert!(notifier.send("Qdrant API is down: boom...").await);
    }

    #[tokio::test]
    async fn test_unreachable_provider_returns_false() {
        let config = SmsConfig {
            account_sid: "AC123".to_string(),
            auth_token: "token".to_string(),
            from: "+1".to_string(),
            to: "+2".to_string(),
            api_base: "http://127.0.0.1:1".to_string(),
        };

        let notifier = TwilioSmsNotifier::new(config, Duration::from_millis(200)).unwrap();
        assert!(!notifier.send("hello").await);
    }
}
