//! Metadata filters applied at retrieval time

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::document::DocumentMetadata;
use crate::error::CoreError;

/// Metadata keys a filter can constrain
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKey {
    FileName,
    DateTime,
}

impl MetadataKey {
    /// Field name, shared by the metadata map and the index schema
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileName => "file_name",
            Self::DateTime => "date_time",
        }
    }
}

impl std::fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file_name" => Ok(Self::FileName),
            "date_time" => Ok(Self::DateTime),
            other => Err(CoreError::Validation(format!(
                "unknown metadata key: {other}"
            ))),
        }
    }
}

/// `key == value`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExactMatch {
    pub key: MetadataKey,
    pub value: String,
}

/// Conjunction of exact-match constraints. Empty matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryFilter {
    pub filters: Vec<ExactMatch>,
}

impl QueryFilter {
    /// Filter that accepts every chunk
    pub fn none() -> Self {
        Self::default()
    }

    /// Filter on `date_time == date`
    pub fn date(date: impl Into<String>) -> Self {
        Self::none().and(MetadataKey::DateTime, date)
    }

    /// Builder pattern: add a constraint
    pub fn and(mut self, key: MetadataKey, value: impl Into<String>) -> Self {
        self.filters.push(ExactMatch {
            key,
            value: value.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Whether `metadata` satisfies every constraint.
    ///
    /// A missing value never matches.
    pub fn matches(&self, metadata: &DocumentMetadata) -> bool {
        self.filters
            .iter()
            .all(|f| metadata.get(f.key.as_str()) == Some(f.value.as_str()))
    }
}
