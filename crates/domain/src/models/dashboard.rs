//! Dashboard RAG summary models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::compliance::RagStatus;

/// Number of records per RAG status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RagCounts {
    #[serde(rename = "Green")]
    pub green: u64,
    #[serde(rename = "Amber")]
    pub amber: u64,
    #[serde(rename = "Red")]
    pub red: u64,
}

impl RagCounts {
    pub fn get(&self, status: RagStatus) -> u64 {
        match status {
            RagStatus::Green => self.green,
            RagStatus::Amber => self.amber,
            RagStatus::Red => self.red,
        }
    }

    pub fn increment(&mut self, status: RagStatus) {
        match status {
            RagStatus::Green => self.green += 1,
            RagStatus::Amber => self.amber += 1,
            RagStatus::Red => self.red += 1,
        }
    }

    pub fn sum(&self) -> u64 {
        self.green + self.amber + self.red
    }
}

/// RAG counts for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CategoryBreakdown {
    pub category: String,
    pub green: u64,
    pub amber: u64,
    pub red: u64,
    pub total: u64,
}

impl CategoryBreakdown {
    pub fn new(category: impl Into<String>, counts: RagCounts) -> Self {
        Self {
            category: category.into(),
            green: counts.green,
            amber: counts.amber,
            red: counts.red,
            total: counts.sum(),
        }
    }
}

/// Result of aggregating a set of compliance records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RagSummary {
    /// Number of records counted.
    pub total: u64,
    pub counts: RagCounts,
    /// One entry per category, ordered by category label.
    pub by_category: Vec<CategoryBreakdown>,
    /// Records left out because of an unrecognized RAG status, or because
    /// they could not be read as a record at all.
    pub skipped: u64,
}

/// Request body for aggregating client-supplied records.
///
/// Records stay raw JSON so one malformed entry cannot reject the batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RagSummaryRequest {
    #[serde(default)]
    pub records: Vec<JsonValue>,
}

/// RAG summary as returned by the dashboard endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RagSummaryResponse {
    #[serde(flatten)]
    pub summary: RagSummary,
    pub generated_at: DateTime<Utc>,
}

impl RagSummaryResponse {
    pub fn new(summary: RagSummary) -> Self {
        Self {
            summary,
            generated_at: Utc::now(),
        }
    }
}
