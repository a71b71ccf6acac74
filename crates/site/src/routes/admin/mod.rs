//! Admin API routes.
//!
//! Everything except login, logout, session status, and first-admin setup
//! sits behind the admission gate.

pub mod auth;
pub mod setup;
pub mod submissions;
pub mod users;

use axum::{Router, middleware, routing::get};

use crate::middleware::require_admin;
use crate::state::AppState;

/// Build the admin API router.
pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route(
            "/api/admin/submissions",
            get(submissions::list),
        )
        .route("/api/admin/submissions/export", get(submissions::export))
        .route(
            "/api/admin/submissions/{id}",
            get(submissions::get_one)
                .patch(submissions::update)
                .delete(submissions::remove),
        )
        .route(
            "/api/admin/submissions/{id}/replies",
            get(submissions::list_replies).post(submissions::create_reply),
        )
        .route(
            "/api/admin/users",
            get(users::list).post(users::create).delete(users::remove),
        )
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    Router::new()
        .route(
            "/api/admin/auth",
            get(auth::status).post(auth::login).delete(auth::logout),
        )
        .route("/api/admin/setup", get(setup::status).post(setup::create))
        .merge(protected)
}
