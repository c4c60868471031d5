//! Site content endpoints: FAQs, banners, legal texts and contacts

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::{default_true, MessageResponse};
use crate::api::middleware::{ApiError, AppState};
use crate::models::{
    Banner, BannerInput, ContactInfo, Faq, FaqInput, LegalContent, LegalInput, UpdateBannerInput,
    UpdateContactInput, UpdateFaqInput,
};

#[derive(Debug, Deserialize)]
pub struct FaqQuery {
    #[serde(default = "default_true")]
    pub active_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct BannerQuery {
    #[serde(default)]
    pub active_only: bool,
}

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/faqs", get(list_faqs))
        .route("/banners", get(list_banners))
        .route("/legal/{kind}", get(get_legal))
        .route("/contacts", get(get_contacts))
}

/// Admin routes, nested under `/admin`
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/faqs", post(create_faq))
        .route("/faqs/{id}", put(update_faq).delete(delete_faq))
        .route("/banners", post(create_banner))
        .route("/banners/{id}", put(update_banner).delete(delete_banner))
        .route("/legal/{kind}", put(save_legal))
        .route("/contacts", put(update_contacts))
}

async fn list_faqs(
    State(state): State<AppState>,
    Query(query): Query<FaqQuery>,
) -> Result<Json<Vec<Faq>>, ApiError> {
    Ok(Json(state.content_service.list_faqs(query.active_only).await?))
}

async fn create_faq(
    State(state): State<AppState>,
    Json(body): Json<FaqInput>,
) -> Result<Json<Faq>, ApiError> {
    Ok(Json(state.content_service.create_faq(body).await?))
}

async fn update_faq(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateFaqInput>,
) -> Result<Json<Faq>, ApiError> {
    Ok(Json(state.content_service.update_faq(&id, body).await?))
}

async fn delete_faq(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.content_service.delete_faq(&id).await?;
    Ok(Json(MessageResponse::new("FAQ deleted successfully")))
}

async fn list_banners(
    State(state): State<AppState>,
    Query(query): Query<BannerQuery>,
) -> Result<Json<Vec<Banner>>, ApiError> {
    Ok(Json(state.content_service.list_banners(query.active_only).await?))
}

async fn create_banner(
    State(state): State<AppState>,
    Json(body): Json<BannerInput>,
) -> Result<Json<Banner>, ApiError> {
    Ok(Json(state.content_service.create_banner(body).await?))
}

async fn update_banner(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateBannerInput>,
) -> Result<Json<Banner>, ApiError> {
    Ok(Json(state.content_service.update_banner(&id, body).await?))
}

async fn delete_banner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.content_service.delete_banner(&id).await?;
    Ok(Json(MessageResponse::new("Banner deleted successfully")))
}

async fn get_legal(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<LegalContent>, ApiError> {
    Ok(Json(state.content_service.get_legal(&kind).await?))
}

async fn save_legal(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(body): Json<LegalInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.content_service.save_legal(&kind, body).await?;
    Ok(Json(MessageResponse::new("Legal content updated successfully")))
}

async fn get_contacts(State(state): State<AppState>) -> Result<Json<ContactInfo>, ApiError> {
    Ok(Json(state.content_service.get_contacts().await?))
}

async fn update_contacts(
    State(state): State<AppState>,
    Json(body): Json<UpdateContactInput>,
) -> Result<Json<ContactInfo>, ApiError> {
    Ok(Json(state.content_service.update_contacts(body).await?))
}
