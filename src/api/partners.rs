//! Partner request endpoints

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;

use crate::api::common::{MessageResponse, StatusQuery, StatusUpdateRequest};
use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreatePartnerRequestInput, PartnerRequest};

#[derive(Debug, Serialize)]
pub struct SubmittedResponse {
    pub message: String,
    pub request_id: String,
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/partner-request", post(submit))
}

/// Admin routes, nested under `/admin`
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/partner-requests", get(list))
        .route("/partner-requests/{id}/status", put(update_status))
}

async fn submit(
    State(state): State<AppState>,
    Json(body): Json<CreatePartnerRequestInput>,
) -> Result<Json<SubmittedResponse>, ApiError> {
    let request = state.partner_service.submit(body).await?;
    Ok(Json(SubmittedResponse {
        message: "Cererea a fost trimisă cu succes!".to_string(),
        request_id: request.id,
    }))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<PartnerRequest>>, ApiError> {
    Ok(Json(state.partner_service.list(query.status()).await?))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdateRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.partner_service.update_status(&id, &body.status).await?;
    Ok(Json(MessageResponse::new("Status updated successfully")))
}
