use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::domain::{TargetDetail, TargetId};
use crate::ports::{SourceError, TargetSource};

/// Envelope wrapping every Qdrant REST response
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct CollectionsResult {
    collections: Vec<CollectionDescription>,
}

#[derive(Debug, Deserialize)]
struct CollectionDescription {
    name: String,
}

/// Only the fields the monitor reports; the rest of the payload is ignored so
/// schema drift in unrelated config sections cannot break the probe.
#[derive(Debug, Deserialize)]
struct CollectionInfo {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    vectors_count: Option<u64>,
    #[serde(default)]
    points_count: Option<u64>,
    #[serde(default)]
    segments_count: u64,
}

/// Qdrant adapter using the REST API
pub struct QdrantAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl QdrantAdapter {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        let base_url: String = base_url.into();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Appends each segment to the base URL, percent-encoding it so a collection
    /// name can never reshape the path or leak into the query.
    fn url_for(&self, segments: &[&str]) -> Result<reqwest::Url, SourceError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| SourceError::Transport(format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::Transport("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, SourceError> {
        let url = self.url_for(segments)?;
        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.header("api-key", key);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;
        Ok(envelope.result)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        SourceError::Timeout
    } else {
        SourceError::Transport(err.to_string())
    }
}

#[async_trait]
impl TargetSource for QdrantAdapter {
    async fn list_targets(&self) -> Result<Vec<TargetId>, SourceError> {
        let result: CollectionsResult = self.get_json(&["collections"]).await?;
        Ok(result
            .collections
            .into_iter()
            .map(|c| TargetId::new(c.name))
            .collect())
    }

    async fn get_target_detail(&self, id: &TargetId) -> Result<TargetDetail, SourceError> {
        let info: CollectionInfo = self.get_json(&["collections", id.as_str()]).await?;

        Ok(TargetDetail::new(
            id.as_str(),
            info.status.unwrap_or_else(|| "unknown".to_string()),
            info.segments_count,
        )
        .with_counts(info.vectors_count, info.points_count))
    }
}
