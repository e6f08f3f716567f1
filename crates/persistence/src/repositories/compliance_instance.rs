//! Compliance instance repository for database operations.

use domain::models::{ComplianceFilters, ComplianceInstanceChanges, ComplianceRecord};
use shared::pagination::PageRequest;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ComplianceInstanceEntity;
use crate::metrics::QueryTimer;

const SELECT_COLUMNS: &str = "id, organization_id, title, category, due_date, status, \
     rag_status, entity_name, period, created_at, updated_at";

/// Builds the WHERE clause for compliance instance filters.
///
/// `$1` is always the organization id; optional filters take the following
/// positions in declaration order.
struct ComplianceFilterBuilder {
    conditions: Vec<String>,
    param_count: i32,
}

impl ComplianceFilterBuilder {
    fn build(filters: &ComplianceFilters) -> Self {
        let mut conditions = vec!["organization_id = $1".to_string()];
        let mut param_count = 1;

        if filters.category.is_some() {
            param_count += 1;
            conditions.push(format!("category = ${}", param_count));
        }

        if filters.status.is_some() {
            param_count += 1;
            conditions.push(format!("status = ${}", param_count));
        }

        if filters.rag_status.is_some() {
            param_count += 1;
            conditions.push(format!("rag_status = ${}", param_count));
        }

        if filters.due_from.is_some() {
            param_count += 1;
            conditions.push(format!("due_date >= ${}", param_count));
        }

        if filters.due_to.is_some() {
            param_count += 1;
            conditions.push(format!("due_date <= ${}", param_count));
        }

        Self {
            conditions,
            param_count,
        }
    }

    fn where_clause(&self) -> String {
        self.conditions.join(" AND ")
    }

    fn param_count(&self) -> i32 {
        self.param_count
    }
}

/// Binds the optional filters in the same order `ComplianceFilterBuilder`
/// numbers them.
macro_rules! bind_compliance_filters {
    ($builder:expr, $filters:expr) => {{
        let mut b = $builder;
        if let Some(category) = $filters.category {
            b = b.bind(category.label());
        }
        if let Some(status) = $filters.status {
            b = b.bind(status.label());
        }
        if let Some(rag_status) = $filters.rag_status {
            b = b.bind(rag_status.as_str());
        }
        if let Some(due_from) = $filters.due_from {
            b = b.bind(due_from);
        }
        if let Some(due_to) = $filters.due_to {
            b = b.bind(due_to);
        }
        b
    }};
}

/// State of a compliance instance on both sides of an update.
#[derive(Debug, Clone)]
pub struct ComplianceInstanceUpdate {
    pub before: ComplianceRecord,
    pub after: ComplianceRecord,
}

/// Repository for compliance instance database operations.
#[derive(Clone)]
pub struct ComplianceInstanceRepository {
    pool: PgPool,
}

impl ComplianceInstanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List compliance instances with filtering and pagination.
    ///
    /// Ordered by due date, then id, so pages are stable.
    pub async fn list(
        &self,
        org_id: Uuid,
        filters: &ComplianceFilters,
        page: PageRequest,
    ) -> Result<(Vec<ComplianceRecord>, i64), sqlx::Error> {
        let timer = QueryTimer::new("list_compliance_instances");
        let filter = ComplianceFilterBuilder::build(filters);
        let where_clause = filter.where_clause();
        let param_count = filter.param_count();

        let count_query = format!(
            "SELECT COUNT(*) FROM compliance_instances WHERE {}",
            where_clause
        );
        let count_builder = sqlx::query_scalar::<_, i64>(&count_query).bind(org_id);
        let count_builder = bind_compliance_filters!(count_builder, filters);
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        let list_query = format!(
            r#"
            SELECT {}
            FROM compliance_instances
            WHERE {}
            ORDER BY due_date ASC, id ASC
            LIMIT ${} OFFSET ${}
            "#,
            SELECT_COLUMNS,
            where_clause,
            param_count + 1,
            param_count + 2
        );
        let list_builder = sqlx::query_as::<_, ComplianceInstanceEntity>(&list_query).bind(org_id);
        let list_builder = bind_compliance_filters!(list_builder, filters);
        let entities = list_builder
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        timer.record();

        Ok((entities.into_iter().map(ComplianceRecord::from).collect(), total))
    }

    /// Fetch up to `max_records` matching instances for aggregation.
    pub async fn list_all(
        &self,
        org_id: Uuid,
        filters: &ComplianceFilters,
        max_records: i64,
    ) -> Result<Vec<ComplianceRecord>, sqlx::Error> {
        let timer = QueryTimer::new("list_all_compliance_instances");
        let filter = ComplianceFilterBuilder::build(filters);

        let list_query = format!(
            r#"
            SELECT {}
            FROM compliance_instances
            WHERE {}
            ORDER BY due_date ASC, id ASC
            LIMIT ${}
            "#,
            SELECT_COLUMNS,
            filter.where_clause(),
            filter.param_count() + 1
        );
        let list_builder = sqlx::query_as::<_, ComplianceInstanceEntity>(&list_query).bind(org_id);
        let list_builder = bind_compliance_filters!(list_builder, filters);
        let entities = list_builder.bind(max_records).fetch_all(&self.pool).await?;
        timer.record();

        Ok(entities.into_iter().map(ComplianceRecord::from).collect())
    }

    /// Find a compliance instance by ID within an organization.
    pub async fn find_by_id(
        &self,
        org_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ComplianceRecord>, sqlx::Error> {
        let timer = QueryTimer::new("find_compliance_instance");
        let query = format!(
            "SELECT {} FROM compliance_instances WHERE id = $1 AND organization_id = $2",
            SELECT_COLUMNS
        );
        let entity = sqlx::query_as::<_, ComplianceInstanceEntity>(&query)
            .bind(id)
            .bind(org_id)
            .fetch_optional(&self.pool)
            .await?;
        timer.record();

        Ok(entity.map(ComplianceRecord::from))
    }

    /// Apply a partial update. Fields left as `None` keep their stored value.
    ///
    /// The current row is locked before it is read, so the returned `before`
    /// is exactly the state this update replaced even under concurrent edits.
    pub async fn update(
        &self,
        org_id: Uuid,
        id: Uuid,
        changes: &ComplianceInstanceChanges,
    ) -> Result<Option<ComplianceInstanceUpdate>, sqlx::Error> {
        let timer = QueryTimer::new("update_compliance_instance");
        let mut tx = self.pool.begin().await?;

        let select = format!(
            "SELECT {} FROM compliance_instances WHERE id = $1 AND organization_id = $2 FOR UPDATE",
            SELECT_COLUMNS
        );
        let before = sqlx::query_as::<_, ComplianceInstanceEntity>(&select)
            .bind(id)
            .bind(org_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(before) = before else {
            tx.rollback().await?;
            timer.record();
            return Ok(None);
        };

        let update = format!(
            r#"
            UPDATE compliance_instances
            SET title = COALESCE($3, title),
                status = COALESCE($4, status),
                rag_status = COALESCE($5, rag_status),
                due_date = COALESCE($6, due_date),
                entity_name = COALESCE($7, entity_name),
                period = COALESCE($8, period),
                updated_at = NOW()
            WHERE id = $1 AND organization_id = $2
            RETURNING {}
            "#,
            SELECT_COLUMNS
        );
        let after = sqlx::query_as::<_, ComplianceInstanceEntity>(&update)
            .bind(id)
            .bind(org_id)
            .bind(&changes.title)
            .bind(changes.status.map(|s| s.label()))
            .bind(changes.rag_status.map(|r| r.as_str()))
            .bind(changes.due_date)
            .bind(&changes.entity_name)
            .bind(&changes.period)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();

        Ok(Some(ComplianceInstanceUpdate {
            before: before.into(),
            after: after.into(),
        }))
    }
}
