//! Compliance instance entity.

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::ComplianceRecord;
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for compliance instances.
#[derive(Debug, Clone, FromRow)]
pub struct ComplianceInstanceEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    /// Category label (GST, Direct Tax, ...).
    pub category: String,
    pub due_date: NaiveDate,
    /// Workflow status label.
    pub status: String,
    /// RAG status label as last computed.
    pub rag_status: String,
    pub entity_name: Option<String>,
    pub period: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ComplianceInstanceEntity> for ComplianceRecord {
    fn from(entity: ComplianceInstanceEntity) -> Self {
        ComplianceRecord {
            id: entity.id.to_string(),
            organization_id: Some(entity.organization_id),
            title: entity.title,
            category: entity.category,
            due_date: entity.due_date,
            status: entity.status,
            rag_status: entity.rag_status,
            entity_name: entity.entity_name,
            period: entity.period,
            created_at: Some(entity.created_at),
            updated_at: Some(entity.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_to_record() {
        let now = Utc::now();
        let org_id = Uuid::new_v4();
        let entity = ComplianceInstanceEntity {
            id: Uuid::new_v4(),
            organization_id: org_id,
            title: "TDS return Q1".to_string(),
            category: "Direct Tax".to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 7, 31).unwrap(),
            status: "Pending Review".to_string(),
            rag_status: "Amber".to_string(),
            entity_name: Some("Acme India Pvt Ltd".to_string()),
            period: Some("Q1 FY25".to_string()),
            created_at: now,
            updated_at: now,
        };

        let record = ComplianceRecord::from(entity);
        assert_eq!(record.organization_id, Some(org_id));
        assert_eq!(record.category, "Direct Tax");
        assert_eq!(record.created_at, Some(now));
        assert!(record.rag().is_ok());
    }
}
