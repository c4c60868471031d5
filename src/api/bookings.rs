//! Booking endpoints

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, put},
    Json, Router,
};

use crate::api::common::{MessageResponse, StatusQuery, StatusUpdateRequest};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{Booking, CreateBookingInput};

/// Customer routes behind `require_auth`
pub fn user_router() -> Router<AppState> {
    Router::new().route("/bookings", get(list_my_bookings).post(create_booking))
}

/// Admin routes, nested under `/admin`
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_all_bookings))
        .route("/bookings/{id}/status", put(update_status))
        .route("/bookings/{id}", delete(delete_booking))
}

async fn create_booking(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(body): Json<CreateBookingInput>,
) -> Result<Json<Booking>, ApiError> {
    Ok(Json(state.booking_service.create_booking(&user, body).await?))
}

async fn list_my_bookings(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Booking>>, ApiError> {
    Ok(Json(state.booking_service.list_for_user(&user).await?))
}

async fn list_all_bookings(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<Booking>>, ApiError> {
    Ok(Json(state.booking_service.list_all(query.status()).await?))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdateRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.booking_service.update_status(&id, &body.status).await?;
    Ok(Json(MessageResponse::new("Status updated successfully")))
}

async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.booking_service.delete(&id).await?;
    Ok(Json(MessageResponse::new("Booking deleted successfully")))
}
