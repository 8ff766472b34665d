mod email;
mod sms;

use std::time::Duration;

pub use email::HttpEmailNotifier;
pub use sms::TwilioSmsNotifier;

use crate::ports::NotifyError;

fn build_client(timeout: Duration) -> Result<reqwest::Client, NotifyError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| NotifyError::Transport(e.to_string()))
}

async fn check_response(
    result: Result<reqwest::Response, reqwest::Error>,
) -> Result<(), NotifyError> {
    let response = result.map_err(|e| NotifyError::Transport(e.to_string()))?;
    if !response.status().is_success() {
        return Err(NotifyError::Rejected(response.status().as_u16()));
    }
    Ok(())
}
