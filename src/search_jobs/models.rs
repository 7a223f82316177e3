use crate::catalog::ToolSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub type JobId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("Unsupported search criteria key: {0}")]
    UnsupportedKey(String),

    #[error("Values of criteria key {0} must be a list of strings")]
    InvalidValues(String),
}

/// Batch search request: criteria key to lookup values.
///
/// Keeps keys in the order the client sent them, results follow that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct SearchCriteria {
    entries: Vec<(String, Vec<String>)>,
}

impl SearchCriteria {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of lookup values across all keys.
    pub fn lookup_count(&self) -> usize {
        self.entries.iter().map(|(_, values)| values.len()).sum()
    }
}

impl<K, V> FromIterator<(K, Vec<V>)> for SearchCriteria
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, Vec<V>)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, values)| (key.into(), values.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }
}

impl TryFrom<Map<String, Value>> for SearchCriteria {
    type Error = CriteriaError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map {
            let Value::Array(items) = value else {
                return Err(CriteriaError::InvalidValues(key));
            };
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => values.push(s),
                    _ => return Err(CriteriaError::InvalidValues(key)),
                }
            }
            entries.push((key, values));
        }
        Ok(Self { entries })
    }
}

impl From<SearchCriteria> for Map<String, Value> {
    fn from(criteria: SearchCriteria) -> Self {
        criteria
            .entries
            .into_iter()
            .map(|(key, values)| {
                let values = values.into_iter().map(Value::String).collect();
                (key, Value::Array(values))
            })
            .collect()
    }
}

/// A batch search job as exposed to clients.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub job_id: JobId,
    pub status: JobStatus,
    pub criteria: SearchCriteria,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<ToolSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub queued_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new_pending(job_id: JobId, criteria: SearchCriteria, queued_at: DateTime<Utc>) -> Self {
        Self {
            job_id,
            status: JobStatus::Pending,
            criteria,
            result: None,
            error: None,
            queued_at,
            completed_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == JobStatus::Pending
    }
}
