//! Submission inbox routes (behind the admission gate).

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use meridian_core::{ServiceInterest, SubmissionId, SubmissionStatus};

use crate::db::{AdminUserRepository, SubmissionRepository, submissions::SubmissionPatch};
use crate::error::{AppError, Result};
use crate::models::{
    ContactSubmission, Pagination, SessionRecord, SortField, SortOrder, SubmissionFilter,
};
use crate::state::AppState;

/// Default page size for the submission list.
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Maximum page size for the submission list.
const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters for the submission list and CSV export.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub service_interest: Option<String>,
    pub status: Option<SubmissionStatus>,
    pub is_read: Option<bool>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

impl ListQuery {
    /// Build the repository filter, parsing the date bounds.
    fn filter(&self) -> Result<SubmissionFilter> {
        let start_date = self
            .start_date
            .as_deref()
            .map(|value| parse_date(value, false))
            .transpose()?;
        let end_date = self
            .end_date
            .as_deref()
            .map(|value| parse_date(value, true))
            .transpose()?;

        Ok(SubmissionFilter {
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string),
            service_interest: self.service_interest.clone().map(ServiceInterest::new),
            status: self.status,
            is_read: self.is_read,
            start_date,
            end_date,
        })
    }
}

/// List submissions with filtering, sorting, and pagination.
///
/// GET /api/admin/submissions
#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>> {
    let filter = query.filter()?;
    let sort = query.sort_by.unwrap_or_default();
    let order = query.sort_order.unwrap_or_default();
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1) * limit;

    let repo = SubmissionRepository::new(state.pool());
    let total = repo.count(&filter).await?;
    let submissions = repo.list(&filter, sort, order, limit, offset).await?;

    Ok(Json(json!({
        "submissions": submissions,
        "pagination": Pagination::new(page, limit, total),
    })))
}

/// Fetch one submission.
///
/// GET /api/admin/submissions/{id}
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<SubmissionId>,
) -> Result<Json<ContactSubmission>> {
    let submission = SubmissionRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission".to_string()))?;

    Ok(Json(submission))
}

/// Partial-update request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub is_read: Option<bool>,
    pub status: Option<SubmissionStatus>,
}

/// Update a submission's triage state.
///
/// PATCH /api/admin/submissions/{id}
#[instrument(skip_all, fields(submission_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<SubmissionId>,
    Json(body): Json<UpdateRequest>,
) -> Result<Json<ContactSubmission>> {
    let submission = SubmissionRepository::new(state.pool())
        .update(
            id,
            SubmissionPatch {
                is_read: body.is_read,
                status: body.status,
            },
        )
        .await?;

    Ok(Json(submission))
}

/// Delete a submission and its replies.
///
/// DELETE /api/admin/submissions/{id}
#[instrument(skip_all, fields(submission_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<SubmissionId>,
) -> Result<Json<Value>> {
    SubmissionRepository::new(state.pool()).delete(id).await?;
    tracing::info!("Submission deleted");

    Ok(Json(json!({ "success": true })))
}

/// List replies to a submission, oldest first.
///
/// GET /api/admin/submissions/{id}/replies
pub async fn list_replies(
    State(state): State<AppState>,
    Path(id): Path<SubmissionId>,
) -> Result<Json<Value>> {
    let repo = SubmissionRepository::new(state.pool());
    if repo.get(id).await?.is_none() {
        return Err(AppError::NotFound("Submission".to_string()));
    }

    let replies = repo.list_replies(id).await?;
    Ok(Json(json!({ "replies": replies })))
}

/// Reply request body.
#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub message: String,
}

/// Reply to a submission.
///
/// POST /api/admin/submissions/{id}/replies
///
/// The reply row is written first and marks the submission read. Email
/// delivery happens after and is best-effort: when it fails, the response
/// still succeeds but carries a `warning` field.
#[instrument(skip_all, fields(submission_id = %id))]
pub async fn create_reply(
    State(state): State<AppState>,
    Path(id): Path<SubmissionId>,
    Extension(session): Extension<SessionRecord>,
    Json(body): Json<ReplyRequest>,
) -> Result<Json<Value>> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("Message is required".to_string()));
    }

    let repo = SubmissionRepository::new(state.pool());
    let submission = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission".to_string()))?;

    // Resolve the acting admin. The session may outlive the account, in
    // which case the reply is recorded without an author.
    let admin = match session.admin_user_id {
        Some(admin_id) => AdminUserRepository::new(state.pool()).get_by_id(admin_id).await?,
        None => None,
    };

    let reply = repo
        .insert_reply(id, admin.as_ref().map(|a| a.id), message)
        .await?;

    // A reply implies the submission has been handled.
    repo.update(
        id,
        SubmissionPatch {
            is_read: Some(true),
            status: Some(SubmissionStatus::Read),
        },
    )
    .await?;

    let warning = match state.email() {
        Some(email) => {
            let admin_name = admin.as_ref().and_then(|a| a.name.as_deref());
            match email.send_reply(&submission, message, admin_name).await {
                Ok(()) => None,
                Err(e) => {
                    tracing::warn!(error = %e, "Reply saved but email failed to send");
                    Some("Reply saved but email failed to send")
                }
            }
        }
        None => Some("Reply saved but email delivery is not configured"),
    };

    tracing::info!(reply_id = %reply.id, "Reply recorded");

    let mut response = json!({ "success": true, "reply": reply });
    if let (Some(warning), Some(object)) = (warning, response.as_object_mut()) {
        object.insert("warning".to_string(), Value::String(warning.to_string()));
    }

    Ok(Json(response))
}

/// Export filtered submissions as CSV.
///
/// GET /api/admin/submissions/export
///
/// Accepts the same filter parameters as the list endpoint; pagination is
/// ignored and every matching row is exported.
#[instrument(skip_all)]
pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let filter = query.filter()?;
    let sort = query.sort_by.unwrap_or_default();
    let order = query.sort_order.unwrap_or_default();

    let submissions = SubmissionRepository::new(state.pool())
        .list_all(&filter, sort, order)
        .await?;

    let data = write_csv(&submissions)?;
    let filename = format!("submissions-{}.csv", Utc::now().format("%Y-%m-%d"));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        data,
    )
        .into_response())
}

/// Serialize submissions to CSV bytes.
fn write_csv(submissions: &[ContactSubmission]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record([
            "ID",
            "Name",
            "Company Name",
            "Email",
            "Phone",
            "Service Interest",
            "Message",
            "Is Read",
            "Status",
            "Created At",
            "Updated At",
        ])
        .map_err(csv_error)?;

    for submission in submissions {
        writer
            .write_record([
                submission.id.to_string(),
                submission.name.clone(),
                submission.company_name.clone().unwrap_or_default(),
                submission.email.to_string(),
                submission.phone.clone(),
                submission.service_interest.display_name().to_string(),
                submission.message.clone(),
                if submission.is_read { "Yes" } else { "No" }.to_string(),
                submission.status.to_string(),
                submission.created_at.to_rfc3339(),
                submission.updated_at.to_rfc3339(),
            ])
            .map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV write failed: {e}")))
}

fn csv_error(e: csv::Error) -> AppError {
    AppError::Internal(format!("CSV write failed: {e}"))
}

/// Parse a date bound as RFC 3339 or a plain `YYYY-MM-DD` date.
///
/// Plain dates expand to the start of the day for lower bounds and the end
/// of the day for upper bounds, so `endDate=2026-08-23` includes the whole
/// day.
fn parse_date(value: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date: {value}")))?;

    let datetime = if end_of_day {
        date.and_hms_milli_opt(23, 59, 59, 999)
    } else {
        date.and_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| AppError::Validation(format!("Invalid date: {value}")))?;

    Ok(datetime.and_utc())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use meridian_core::Email;

    #[test]
    fn test_parse_date_rfc3339() {
        let parsed = parse_date("2026-08-23T10:30:00Z", false).unwrap();
        assert_eq!(parsed.hour(), 10);
    }

    #[test]
    fn test_parse_date_plain_bounds() {
        let start = parse_date("2026-08-23", false).unwrap();
        let end = parse_date("2026-08-23", true).unwrap();
        assert_eq!(start.hour(), 0);
        assert_eq!(end.hour(), 23);
        assert!(start < end);
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("23/08/2026", false).is_err());
        assert!(parse_date("tomorrow", false).is_err());
    }

    #[test]
    fn test_filter_drops_blank_search() {
        let query = ListQuery {
            search: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.filter().unwrap().search, None);
    }

    #[test]
    fn test_write_csv_header_and_rows() {
        let submissions = vec![ContactSubmission {
            id: SubmissionId::generate(),
            name: "Dana, Reyes".to_string(),
            company_name: None,
            email: Email::parse("dana@example.com").unwrap(),
            phone: "+1 555 0100".to_string(),
            service_interest: ServiceInterest::new("dataGovernance"),
            message: "multi\nline".to_string(),
            is_read: true,
            status: SubmissionStatus::Read,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }];

        let data = write_csv(&submissions).unwrap();
        let text = String::from_utf8(data).unwrap();

        assert!(text.starts_with("ID,Name,Company Name,Email,Phone,Service Interest,"));
        // Comma-containing field is quoted.
        assert!(text.contains("\"Dana, Reyes\""));
        assert!(text.contains("Data Governance"));
        assert!(text.contains("Yes"));
        assert!(text.contains("read"));
    }
}
