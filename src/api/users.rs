//! Profile and favorites endpoints. All routes require a session.

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::common::MessageResponse;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::Car;

#[derive(Debug, Deserialize)]
pub struct PictureRequest {
    pub picture: String,
}

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub message: String,
    pub favorites: Vec<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile-picture", put(update_picture))
        .route("/name", put(update_name))
        .route("/language", put(update_language))
        .route("/favorites", get(list_favorites))
        .route("/favorites/{car_id}", post(add_favorite).delete(remove_favorite))
}

async fn update_picture(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(body): Json<PictureRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.user_service.update_picture(&user, body.picture).await?;
    Ok(Json(MessageResponse::new("Poza de profil a fost actualizată")))
}

async fn update_name(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(body): Json<NameRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.user_service.update_name(&user, &body.name).await?;
    Ok(Json(MessageResponse::new("Numele a fost actualizat")))
}

async fn update_language(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(body): Json<LanguageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.user_service.update_language(&user, &body.language).await?;
    Ok(Json(MessageResponse::new("Limba a fost actualizată")))
}

async fn add_favorite(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(car_id): Path<String>,
) -> Result<Json<FavoritesResponse>, ApiError> {
    let favorites = state.user_service.add_favorite(&user, &car_id).await?;
    Ok(Json(FavoritesResponse {
        message: "Mașina a fost adăugată la favorite".to_string(),
        favorites,
    }))
}

async fn remove_favorite(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(car_id): Path<String>,
) -> Result<Json<FavoritesResponse>, ApiError> {
    let favorites = state.user_service.remove_favorite(&user, &car_id).await?;
    Ok(Json(FavoritesResponse {
        message: "Mașina a fost ștearsă din favorite".to_string(),
        favorites,
    }))
}

async fn list_favorites(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Car>>, ApiError> {
    Ok(Json(state.user_service.favorite_cars(&user).await?))
}
