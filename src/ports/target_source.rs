use async_trait::async_trait;

use crate::domain::{TargetDetail, TargetId};

/// Transport-level failure talking to the monitored service
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    Decode(String),
}

/// Port for discovering targets and reading their status
#[async_trait]
pub trait TargetSource: Send + Sync {
    /// List the names of every target the service knows about
    async fn list_targets(&self) -> Result<Vec<TargetId>, SourceError>;

    /// Fetch the status of a single target
    async fn get_target_detail(&self, id: &TargetId) -> Result<TargetDetail, SourceError>;
}
