//! Contact submission and reply models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use meridian_core::{AdminUserId, Email, ReplyId, ServiceInterest, SubmissionId, SubmissionStatus};

/// A contact form submission.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: SubmissionId,
    pub name: String,
    pub company_name: Option<String>,
    pub email: Email,
    pub phone: String,
    pub service_interest: ServiceInterest,
    pub message: String,
    pub is_read: bool,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new contact submission.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub name: String,
    pub company_name: Option<String>,
    pub email: Email,
    pub phone: String,
    pub service_interest: ServiceInterest,
    pub message: String,
}

/// A reply sent by an admin to a submission.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: ReplyId,
    pub submission_id: SubmissionId,
    /// NULL when the sending admin account was later deleted.
    pub admin_user_id: Option<AdminUserId>,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

/// Identity of the admin who sent a reply, joined for list responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyAdmin {
    pub id: AdminUserId,
    pub email: Email,
    pub name: Option<String>,
}

/// A reply together with its sending admin, if that account still exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyWithAdmin {
    pub id: ReplyId,
    pub submission_id: SubmissionId,
    pub message: String,
    pub sent_at: DateTime<Utc>,
    pub admin_user: Option<ReplyAdmin>,
}

/// Filters for the submission list and CSV export.
#[derive(Debug, Clone, Default)]
pub struct SubmissionFilter {
    /// Case-insensitive substring match over name, email, company, and message.
    pub search: Option<String>,
    pub service_interest: Option<ServiceInterest>,
    pub status: Option<SubmissionStatus>,
    pub is_read: Option<bool>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Sortable columns for the submission list.
///
/// A closed enum so client input can never reach the SQL as a raw column
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Name,
    Email,
    Status,
}

impl SortField {
    /// Column name used in ORDER BY.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Name => "name",
            Self::Email => "email",
            Self::Status => "status",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// SQL keyword for the direction.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Pagination metadata returned alongside submission pages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    /// Compute pagination metadata for a total row count.
    #[must_use]
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX)
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_rounds_up() {
        let p = Pagination::new(1, 10, 21);
        assert_eq!(p.total_pages, 3);

        let p = Pagination::new(1, 10, 20);
        assert_eq!(p.total_pages, 2);

        let p = Pagination::new(1, 10, 0);
        assert_eq!(p.total_pages, 0);
    }

    #[test]
    fn test_sort_field_columns() {
        assert_eq!(SortField::CreatedAt.column(), "created_at");
        assert_eq!(SortField::Email.column(), "email");
        assert_eq!(SortOrder::Asc.keyword(), "ASC");
        assert_eq!(SortOrder::default().keyword(), "DESC");
    }

    #[test]
    fn test_sort_field_parses_camel_case_params() {
        let field: SortField = serde_json::from_str("\"createdAt\"").unwrap();
        assert_eq!(field, SortField::CreatedAt);
        assert!(serde_json::from_str::<SortField>("\"password_hash\"").is_err());
    }

    #[test]
    fn test_submission_serializes_camel_case() {
        let submission = ContactSubmission {
            id: SubmissionId::generate(),
            name: "Dana".to_string(),
            company_name: Some("Acme".to_string()),
            email: Email::parse("dana@acme.example.com").unwrap(),
            phone: "+1 555 0100".to_string(),
            service_interest: ServiceInterest::new("cloudComputing"),
            message: "Hello".to_string(),
            is_read: false,
            status: SubmissionStatus::New,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&submission).unwrap();
        assert!(json.contains("\"companyName\":\"Acme\""));
        assert!(json.contains("\"serviceInterest\":\"cloudComputing\""));
        assert!(json.contains("\"isRead\":false"));
        assert!(json.contains("\"status\":\"new\""));
    }
}
