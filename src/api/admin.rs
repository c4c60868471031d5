//! Admin API endpoints
//!
//! User management, dashboard statistics and catalog seeding. Everything
//! except `make-admin` sits behind `require_admin`.

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};

use crate::api::common::MessageResponse;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::User;
use crate::services::{dashboard, seed_catalog, DashboardStats};

/// Admin-only routes, nested under `/admin`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", delete(delete_user))
        .route("/users/{id}/promote", post(promote_user))
        .route("/stats", get(stats))
        .route("/seed", post(seed))
}

/// Routes open to any signed-in user, nested under `/admin`
pub fn user_router() -> Router<AppState> {
    Router::new().route("/make-admin", post(make_admin))
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.user_service.list_users().await?))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.user_service.delete_user(&id).await?;
    Ok(Json(MessageResponse::new("Utilizatorul a fost șters")))
}

async fn promote_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.user_service.promote(&id).await?))
}

/// POST /api/admin/make-admin
///
/// Self-promotion, only when enabled in configuration.
async fn make_admin(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.allow_self_promotion {
        return Err(ApiError::forbidden("Self-promotion is disabled"));
    }
    state.user_service.promote(&user.id).await?;
    tracing::warn!("User {} promoted themselves to admin", user.id);
    Ok(Json(MessageResponse::new("User is now admin")))
}

async fn stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, ApiError> {
    let stats = dashboard(
        &state.car_service,
        &state.booking_service,
        &state.user_service,
        &state.partner_service,
    )
    .await?;
    Ok(Json(stats))
}

async fn seed(State(state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    let outcome = seed_catalog(&state.car_repo, &state.cache).await?;
    Ok(Json(MessageResponse::new(outcome.message())))
}
