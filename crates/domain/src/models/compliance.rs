//! Compliance instance domain models.
//!
//! A compliance instance is one occurrence of a recurring regulatory
//! obligation for a specific entity and period.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use shared::validation::{parse_filter_value, validate_date_range, validate_not_blank};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

/// Error returned when a label does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseLabelError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Lowercases, maps `_`/`-` to spaces and collapses whitespace.
fn normalize_label(s: &str) -> String {
    s.replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Three-level risk indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RagStatus {
    /// On track.
    Green,
    /// At risk.
    Amber,
    /// Overdue or critical.
    Red,
}

impl RagStatus {
    pub const ALL: [RagStatus; 3] = [RagStatus::Green, RagStatus::Amber, RagStatus::Red];

    pub fn as_str(&self) -> &'static str {
        match self {
            RagStatus::Green => "Green",
            RagStatus::Amber => "Amber",
            RagStatus::Red => "Red",
        }
    }
}

impl FromStr for RagStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "green" => Ok(RagStatus::Green),
            "amber" => Ok(RagStatus::Amber),
            "red" => Ok(RagStatus::Red),
            _ => Err(ParseLabelError::new("RAG status", s)),
        }
    }
}

impl std::fmt::Display for RagStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Regulatory category of an obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplianceCategory {
    #[serde(rename = "GST")]
    Gst,
    #[serde(rename = "Direct Tax")]
    DirectTax,
    #[serde(rename = "Payroll")]
    Payroll,
    #[serde(rename = "MCA")]
    Mca,
    #[serde(rename = "FEMA")]
    Fema,
    #[serde(rename = "FP&A")]
    Fpa,
}

impl ComplianceCategory {
    pub const ALL: [ComplianceCategory; 6] = [
        ComplianceCategory::Gst,
        ComplianceCategory::DirectTax,
        ComplianceCategory::Payroll,
        ComplianceCategory::Mca,
        ComplianceCategory::Fema,
        ComplianceCategory::Fpa,
    ];

    /// Canonical display label.
    pub fn label(&self) -> &'static str {
        match self {
            ComplianceCategory::Gst => "GST",
            ComplianceCategory::DirectTax => "Direct Tax",
            ComplianceCategory::Payroll => "Payroll",
            ComplianceCategory::Mca => "MCA",
            ComplianceCategory::Fema => "FEMA",
            ComplianceCategory::Fpa => "FP&A",
        }
    }
}

impl FromStr for ComplianceCategory {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "gst" => Ok(ComplianceCategory::Gst),
            "direct tax" | "directtax" => Ok(ComplianceCategory::DirectTax),
            "payroll" => Ok(ComplianceCategory::Payroll),
            "mca" => Ok(ComplianceCategory::Mca),
            "fema" => Ok(ComplianceCategory::Fema),
            "fp&a" | "fpa" | "fp and a" => Ok(ComplianceCategory::Fpa),
            _ => Err(ParseLabelError::new("category", s)),
        }
    }
}

impl std::fmt::Display for ComplianceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Workflow status of a compliance instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Pending Review")]
    PendingReview,
    #[serde(rename = "Pending Approval")]
    PendingApproval,
    Filed,
    Completed,
    Rejected,
    Overdue,
}

impl WorkflowStatus {
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowStatus::NotStarted => "Not Started",
            WorkflowStatus::InProgress => "In Progress",
            WorkflowStatus::PendingReview => "Pending Review",
            WorkflowStatus::PendingApproval => "Pending Approval",
            WorkflowStatus::Filed => "Filed",
            WorkflowStatus::Completed => "Completed",
            WorkflowStatus::Rejected => "Rejected",
            WorkflowStatus::Overdue => "Overdue",
        }
    }
}

impl FromStr for WorkflowStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "not started" => Ok(WorkflowStatus::NotStarted),
            "in progress" => Ok(WorkflowStatus::InProgress),
            "pending review" => Ok(WorkflowStatus::PendingReview),
            "pending approval" => Ok(WorkflowStatus::PendingApproval),
            "filed" => Ok(WorkflowStatus::Filed),
            "completed" => Ok(WorkflowStatus::Completed),
            "rejected" => Ok(WorkflowStatus::Rejected),
            "overdue" => Ok(WorkflowStatus::Overdue),
            _ => Err(ParseLabelError::new("workflow status", s)),
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Reads a scalar as a string; `null` becomes the empty string.
///
/// Identifiers are opaque and labels are interpreted later, so neither is
/// rejected here.
fn deserialize_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::Null => Ok(String::new()),
        JsonValue::String(s) => Ok(s),
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::Bool(b) => Ok(b.to_string()),
        other => Err(de::Error::invalid_type(
            de::Unexpected::Other(json_type_name(&other)),
            &"a string, number or null",
        )),
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
        _ => "scalar",
    }
}

/// A compliance instance as fetched from storage or posted by a client.
///
/// Category, workflow status and RAG status are kept as the strings that
/// were received; use the typed accessors to interpret them. Storage
/// bookkeeping fields are never read from client input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ComplianceRecord {
    #[serde(deserialize_with = "deserialize_scalar")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none", skip_deserializing)]
    pub organization_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub category: String,
    #[serde(alias = "dueDate")]
    pub due_date: NaiveDate,
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub status: String,
    #[serde(default, alias = "ragStatus", deserialize_with = "deserialize_scalar")]
    pub rag_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "entityName")]
    pub entity_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", skip_deserializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", skip_deserializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ComplianceRecord {
    /// Create a record with the required fields only.
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        due_date: NaiveDate,
        status: impl Into<String>,
        rag_status: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            organization_id: None,
            title: String::new(),
            category: category.into(),
            due_date,
            status: status.into(),
            rag_status: rag_status.into(),
            entity_name: None,
            period: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn rag(&self) -> Result<RagStatus, ParseLabelError> {
        self.rag_status.parse()
    }

    pub fn category_kind(&self) -> Result<ComplianceCategory, ParseLabelError> {
        self.category.parse()
    }

    pub fn workflow_status(&self) -> Result<WorkflowStatus, ParseLabelError> {
        self.status.parse()
    }
}

/// Query parameters for listing compliance instances.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ComplianceInstanceQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub rag_status: Option<String>,
    pub due_from: Option<NaiveDate>,
    pub due_to: Option<NaiveDate>,
}

impl ComplianceInstanceQuery {
    /// Parse the filter parameters into typed filters.
    pub fn filters(&self) -> Result<ComplianceFilters, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut filters = ComplianceFilters {
            due_from: self.due_from,
            due_to: self.due_to,
            ..Default::default()
        };

        if let Some(ref category) = self.category {
            match parse_filter_value::<ComplianceCategory>(category, "category") {
                Ok(category) => filters.category = Some(category),
                Err(e) => errors.add("category", e),
            }
        }
        if let Some(ref status) = self.status {
            match parse_filter_value::<WorkflowStatus>(status, "status") {
                Ok(status) => filters.status = Some(status),
                Err(e) => errors.add("status", e),
            }
        }
        if let Some(ref rag_status) = self.rag_status {
            match parse_filter_value::<RagStatus>(rag_status, "rag_status") {
                Ok(rag) => filters.rag_status = Some(rag),
                Err(e) => errors.add("rag_status", e),
            }
        }
        if let Err(e) = validate_date_range(self.due_from, self.due_to) {
            errors.add("due_from", e);
        }

        if errors.is_empty() {
            Ok(filters)
        } else {
            Err(errors)
        }
    }
}

/// Typed filters for compliance instance queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplianceFilters {
    pub category: Option<ComplianceCategory>,
    pub status: Option<WorkflowStatus>,
    pub rag_status: Option<RagStatus>,
    pub due_from: Option<NaiveDate>,
    pub due_to: Option<NaiveDate>,
}

/// Request body for editing a compliance instance.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateComplianceInstanceRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    pub status: Option<String>,
    #[serde(alias = "ragStatus")]
    pub rag_status: Option<String>,
    #[serde(alias = "dueDate")]
    pub due_date: Option<NaiveDate>,
    #[validate(length(max = 200, message = "Entity name must be at most 200 characters"))]
    #[serde(alias = "entityName")]
    pub entity_name: Option<String>,
    #[validate(length(max = 50, message = "Period must be at most 50 characters"))]
    pub period: Option<String>,
}

impl UpdateComplianceInstanceRequest {
    /// Validate the request and parse it into typed changes.
    pub fn changes(&self) -> Result<ComplianceInstanceChanges, ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        let mut changes = ComplianceInstanceChanges {
            title: self.title.clone(),
            due_date: self.due_date,
            entity_name: self.entity_name.clone(),
            period: self.period.clone(),
            ..Default::default()
        };

        if let Some(ref title) = self.title {
            if let Err(e) = validate_not_blank(title) {
                errors.add("title", e);
            }
        }
        if let Some(ref status) = self.status {
            match parse_filter_value::<WorkflowStatus>(status, "status") {
                Ok(status) => changes.status = Some(status),
                Err(e) => errors.add("status", e),
            }
        }
        if let Some(ref rag_status) = self.rag_status {
            match parse_filter_value::<RagStatus>(rag_status, "rag_status") {
                Ok(rag) => changes.rag_status = Some(rag),
                Err(e) => errors.add("rag_status", e),
            }
        }
        if errors.is_empty() && changes.is_empty() {
            let mut err = validator::ValidationError::new("empty_update");
            err.message = Some("No fields to update".into());
            errors.add("body", err);
        }

        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(errors)
        }
    }
}

/// Typed, validated edits to a compliance instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplianceInstanceChanges {
    pub title: Option<String>,
    pub status: Option<WorkflowStatus>,
    pub rag_status: Option<RagStatus>,
    pub due_date: Option<NaiveDate>,
    pub entity_name: Option<String>,
    pub period: Option<String>,
}

impl ComplianceInstanceChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.status.is_none()
            && self.rag_status.is_none()
            && self.due_date.is_none()
            && self.entity_name.is_none()
            && self.period.is_none()
    }
}
