//! Contact submission and reply repository.
//!
//! List queries are assembled with `QueryBuilder` because the filter set is
//! dynamic. Sort column and direction come from closed enums, never from
//! client strings, so only filter values are ever bound as parameters.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use meridian_core::{AdminUserId, Email, ReplyId, SubmissionId, SubmissionStatus};

use super::RepositoryError;
use crate::models::{
    ContactSubmission, NewSubmission, Reply, ReplyAdmin, ReplyWithAdmin, SortField, SortOrder,
    SubmissionFilter,
};

const SUBMISSION_COLUMNS: &str = "id, name, company_name, email, phone, service_interest, \
     message, is_read, status, created_at, updated_at";

/// Partial update for a submission. `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionPatch {
    pub is_read: Option<bool>,
    pub status: Option<SubmissionStatus>,
}

impl SubmissionPatch {
    /// Whether the patch changes anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.is_read.is_none() && self.status.is_none()
    }
}

/// Internal row type for reply list queries (LEFT JOIN on `admin_users`).
#[derive(Debug, sqlx::FromRow)]
struct ReplyWithAdminRow {
    id: Uuid,
    submission_id: Uuid,
    message: String,
    sent_at: DateTime<Utc>,
    admin_id: Option<Uuid>,
    admin_email: Option<String>,
    admin_name: Option<String>,
}

impl TryFrom<ReplyWithAdminRow> for ReplyWithAdmin {
    type Error = RepositoryError;

    fn try_from(row: ReplyWithAdminRow) -> Result<Self, Self::Error> {
        let admin_user = match (row.admin_id, row.admin_email) {
            (Some(id), Some(email)) => Some(ReplyAdmin {
                id: AdminUserId::new(id),
                email: Email::parse(&email).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
                })?,
                name: row.admin_name,
            }),
            _ => None,
        };

        Ok(Self {
            id: ReplyId::new(row.id),
            submission_id: SubmissionId::new(row.submission_id),
            message: row.message,
            sent_at: row.sent_at,
            admin_user,
        })
    }
}

/// Repository for contact submission database operations.
pub struct SubmissionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SubmissionRepository<'a> {
    /// Create a new submission repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new submission with default triage state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert(
        &self,
        submission: &NewSubmission,
    ) -> Result<ContactSubmission, RepositoryError> {
        let row: ContactSubmission = sqlx::query_as(&format!(
            "INSERT INTO contact_submissions
                 (name, company_name, email, phone, service_interest, message)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(&submission.name)
        .bind(&submission.company_name)
        .bind(&submission.email)
        .bind(&submission.phone)
        .bind(&submission.service_interest)
        .bind(&submission.message)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Get a submission by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: SubmissionId) -> Result<Option<ContactSubmission>, RepositoryError> {
        let row: Option<ContactSubmission> = sqlx::query_as(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM contact_submissions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Count submissions matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, filter: &SubmissionFilter) -> Result<u64, RepositoryError> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM contact_submissions");
        push_filters(&mut query, filter);

        let count: i64 = query.build_query_scalar().fetch_one(self.pool).await?;
        Ok(count.try_into().unwrap_or(0))
    }

    /// List one page of submissions matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &SubmissionFilter,
        sort: SortField,
        order: SortOrder,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ContactSubmission>, RepositoryError> {
        let mut query = QueryBuilder::new(format!(
            "SELECT {SUBMISSION_COLUMNS} FROM contact_submissions"
        ));
        push_filters(&mut query, filter);
        push_order(&mut query, sort, order);
        query.push(" LIMIT ");
        query.push_bind(i64::from(limit));
        query.push(" OFFSET ");
        query.push_bind(i64::from(offset));

        let rows = query.build_query_as().fetch_all(self.pool).await?;
        Ok(rows)
    }

    /// List all submissions matching a filter, without pagination (CSV export).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(
        &self,
        filter: &SubmissionFilter,
        sort: SortField,
        order: SortOrder,
    ) -> Result<Vec<ContactSubmission>, RepositoryError> {
        let mut query = QueryBuilder::new(format!(
            "SELECT {SUBMISSION_COLUMNS} FROM contact_submissions"
        ));
        push_filters(&mut query, filter);
        push_order(&mut query, sort, order);

        let rows = query.build_query_as().fetch_all(self.pool).await?;
        Ok(rows)
    }

    /// Apply a partial update and return the updated submission.
    ///
    /// An empty patch is a read: the row is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such submission exists.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: SubmissionId,
        patch: SubmissionPatch,
    ) -> Result<ContactSubmission, RepositoryError> {
        if patch.is_empty() {
            return self.get(id).await?.ok_or(RepositoryError::NotFound);
        }

        let mut query = QueryBuilder::new("UPDATE contact_submissions SET ");
        let mut fields = query.separated(", ");
        if let Some(is_read) = patch.is_read {
            fields.push("is_read = ");
            fields.push_bind_unseparated(is_read);
        }
        if let Some(status) = patch.status {
            fields.push("status = ");
            fields.push_bind_unseparated(status);
        }
        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(format!(" RETURNING {SUBMISSION_COLUMNS}"));

        let row: Option<ContactSubmission> =
            query.build_query_as().fetch_optional(self.pool).await?;
        row.ok_or(RepositoryError::NotFound)
    }

    /// Delete a submission (replies cascade).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such submission exists.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: SubmissionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM contact_submissions WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Record a reply to a submission.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, including
    /// when the submission ID violates the foreign key.
    pub async fn insert_reply(
        &self,
        submission_id: SubmissionId,
        admin_user_id: Option<AdminUserId>,
        message: &str,
    ) -> Result<Reply, RepositoryError> {
        let row: Reply = sqlx::query_as(
            "INSERT INTO replies (submission_id, admin_user_id, message)
             VALUES ($1, $2, $3)
             RETURNING id, submission_id, admin_user_id, message, sent_at",
        )
        .bind(submission_id)
        .bind(admin_user_id)
        .bind(message)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// List replies to a submission, oldest first, with sender identity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if joined data is invalid.
    pub async fn list_replies(
        &self,
        submission_id: SubmissionId,
    ) -> Result<Vec<ReplyWithAdmin>, RepositoryError> {
        let rows: Vec<ReplyWithAdminRow> = sqlx::query_as(
            "SELECT r.id, r.submission_id, r.message, r.sent_at,
                    a.id AS admin_id, a.email AS admin_email, a.name AS admin_name
             FROM replies r
             LEFT JOIN admin_users a ON a.id = r.admin_user_id
             WHERE r.submission_id = $1
             ORDER BY r.sent_at ASC",
        )
        .bind(submission_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

/// Append WHERE clauses for the active filters.
fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &SubmissionFilter) {
    let mut prefix = " WHERE ";
    let mut sep = |query: &mut QueryBuilder<'_, Postgres>| {
        query.push(prefix);
        prefix = " AND ";
    };

    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        sep(query);
        query.push("(name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR email ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR company_name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR message ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }
    if let Some(service) = &filter.service_interest {
        sep(query);
        query.push("service_interest = ");
        query.push_bind(service.clone());
    }
    if let Some(status) = filter.status {
        sep(query);
        query.push("status = ");
        query.push_bind(status);
    }
    if let Some(is_read) = filter.is_read {
        sep(query);
        query.push("is_read = ");
        query.push_bind(is_read);
    }
    if let Some(start) = filter.start_date {
        sep(query);
        query.push("created_at >= ");
        query.push_bind(start);
    }
    if let Some(end) = filter.end_date {
        sep(query);
        query.push("created_at <= ");
        query.push_bind(end);
    }
}

/// Append the ORDER BY clause from the closed sort enums.
fn push_order(query: &mut QueryBuilder<'_, Postgres>, sort: SortField, order: SortOrder) {
    query.push(" ORDER BY ");
    query.push(sort.column());
    query.push(" ");
    query.push(order.keyword());
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_push_filters_no_filters_adds_no_where() {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM contact_submissions");
        push_filters(&mut query, &SubmissionFilter::default());
        assert_eq!(query.sql(), "SELECT COUNT(*) FROM contact_submissions");
    }

    #[test]
    fn test_push_filters_combines_with_and() {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM contact_submissions");
        let filter = SubmissionFilter {
            status: Some(SubmissionStatus::New),
            is_read: Some(false),
            ..Default::default()
        };
        push_filters(&mut query, &filter);

        let sql = query.sql();
        assert!(sql.contains(" WHERE status = "));
        assert!(sql.contains(" AND is_read = "));
    }

    #[test]
    fn test_search_filter_binds_pattern() {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM contact_submissions");
        let filter = SubmissionFilter {
            search: Some("acme".to_string()),
            ..Default::default()
        };
        push_filters(&mut query, &filter);

        let sql = query.sql();
        // The search term itself must be bound, never interpolated.
        assert!(!sql.contains("acme"));
        assert!(sql.contains("name ILIKE "));
        assert!(sql.contains("OR message ILIKE "));
    }

    #[test]
    fn test_push_order_uses_enum_columns() {
        let mut query = QueryBuilder::new("SELECT 1");
        push_order(&mut query, SortField::Email, SortOrder::Asc);
        assert_eq!(query.sql(), "SELECT 1 ORDER BY email ASC");
    }
}
