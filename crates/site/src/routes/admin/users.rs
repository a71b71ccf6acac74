//! Admin account management (behind the admission gate).

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use meridian_core::AdminUserId;

use crate::error::{AppError, Result};
use crate::models::AdminUserSummary;
use crate::services::AuthService;
use crate::state::AppState;

/// Create-user request body.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Delete-user query parameters.
#[derive(Debug, Deserialize)]
pub struct DeleteUserQuery {
    #[serde(default)]
    pub id: Option<String>,
}

/// List all admin accounts.
///
/// GET /api/admin/users
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>> {
    let users: Vec<AdminUserSummary> = AuthService::new(state.pool())
        .list_admins()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(json!({ "users": users })))
}

/// Create an additional admin account.
///
/// POST /api/admin/users
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let user = AuthService::new(state.pool())
        .create_admin(&body.email, &body.password, body.name.as_deref())
        .await?;

    tracing::info!(admin_user_id = %user.id, "Admin account created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "user": AdminUserSummary::from(user),
        })),
    ))
}

/// Delete an admin account by ID (`?id=...`).
///
/// DELETE /api/admin/users
///
/// Refuses to delete the last remaining account.
#[instrument(skip_all)]
pub async fn remove(
    State(state): State<AppState>,
    Query(query): Query<DeleteUserQuery>,
) -> Result<Json<Value>> {
    let id = query
        .id
        .as_deref()
        .ok_or_else(|| AppError::Validation("User ID is required".to_string()))?
        .parse::<AdminUserId>()
        .map_err(|_| AppError::Validation("Invalid user ID".to_string()))?;

    AuthService::new(state.pool()).delete_admin(id).await?;

    tracing::info!(admin_user_id = %id, "Admin account deleted");

    Ok(Json(json!({ "success": true })))
}
