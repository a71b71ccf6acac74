//! HTTP route handlers.

pub mod admin;
pub mod contact;

use axum::{Router, routing::post};

use crate::state::AppState;

/// Build the full application router (health endpoints are added in main).
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/contact", post(contact::submit))
        .merge(admin::routes(state))
}
