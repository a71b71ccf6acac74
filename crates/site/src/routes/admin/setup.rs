//! First-admin bootstrap.
//!
//! Open only while the `admin_users` table is empty. The moment one
//! account exists, this surface returns 400 forever.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::Result;
use crate::models::AdminUserSummary;
use crate::services::AuthService;
use crate::state::AppState;

/// Setup request body.
#[derive(Debug, Deserialize)]
pub struct SetupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Report whether first-admin setup is still available.
///
/// GET /api/admin/setup
pub async fn status(State(state): State<AppState>) -> Result<Json<Value>> {
    let exists = AuthService::new(state.pool()).any_admin_exists().await?;
    Ok(Json(json!({ "needsSetup": !exists })))
}

/// Create the first admin account.
///
/// POST /api/admin/setup
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<SetupRequest>,
) -> Result<Json<Value>> {
    let user = AuthService::new(state.pool())
        .setup_first_admin(&body.email, &body.password, body.name.as_deref())
        .await?;

    tracing::info!(admin_user_id = %user.id, "First admin account created");

    Ok(Json(json!({
        "success": true,
        "user": AdminUserSummary::from(user),
    })))
}
