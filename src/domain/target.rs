use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a monitorable collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TargetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TargetId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Sanitized status of a collection, trimmed to the fields the monitor reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDetail {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_count: Option<u64>,
    pub segment_count: u64,
}

impl TargetDetail {
    pub fn new(name: impl Into<String>, status: impl Into<String>, segment_count: u64) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
            vector_count: None,
            point_count: None,
            segment_count,
        }
    }

    pub fn with_counts(mut self, vector_count: Option<u64>, point_count: Option<u64>) -> Self {
        self.vector_count = vector_count;
        self.point_count = point_count;
        self
    }
}
