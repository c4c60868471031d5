//! Car catalog and price quote endpoints

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::str::FromStr;

use crate::api::common::{default_true, MessageResponse};
use crate::api::middleware::{ApiError, AppState};
use crate::models::{Car, CarFilter, CarInput, UpdateCarInput};
use crate::services::{CarQuote, QuoteRequest};

/// Query parameters of `GET /api/cars`
#[derive(Debug, Deserialize)]
pub struct CarListQuery {
    pub brand: Option<String>,
    pub transmission: Option<String>,
    pub fuel: Option<String>,
    pub body_type: Option<String>,
    pub min_seats: Option<i32>,
    #[serde(default = "default_true")]
    pub available_only: bool,
}

fn parse_opt<T>(value: Option<String>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = anyhow::Error>,
{
    value
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<T>().map_err(|e| ApiError::validation_error(e.to_string())))
        .transpose()
}

impl TryFrom<CarListQuery> for CarFilter {
    type Error = ApiError;

    fn try_from(query: CarListQuery) -> Result<Self, Self::Error> {
        Ok(CarFilter {
            brand: query.brand.filter(|b| !b.trim().is_empty()),
            transmission: parse_opt(query.transmission)?,
            fuel: parse_opt(query.fuel)?,
            body_type: parse_opt(query.body_type)?,
            min_seats: query.min_seats,
            available_only: query.available_only,
        })
    }
}

/// Public catalog routes
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/cars", get(list_cars))
        .route("/cars/{id}", get(get_car))
        .route("/calculate-price", post(calculate_price))
}

/// Admin catalog routes, nested under `/admin`
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/cars", post(create_car))
        .route("/cars/{id}", put(update_car).delete(delete_car))
}

async fn list_cars(
    State(state): State<AppState>,
    Query(query): Query<CarListQuery>,
) -> Result<Json<Vec<Car>>, ApiError> {
    let filter = CarFilter::try_from(query)?;
    Ok(Json(state.car_service.list(&filter).await?))
}

async fn get_car(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Car>, ApiError> {
    Ok(Json(state.car_service.get(&id).await?))
}

async fn calculate_price(
    State(state): State<AppState>,
    Json(body): Json<QuoteRequest>,
) -> Result<Json<CarQuote>, ApiError> {
    Ok(Json(state.car_service.quote(&body).await?))
}

async fn create_car(
    State(state): State<AppState>,
    Json(body): Json<CarInput>,
) -> Result<Json<Car>, ApiError> {
    Ok(Json(state.car_service.create(body).await?))
}

async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCarInput>,
) -> Result<Json<Car>, ApiError> {
    Ok(Json(state.car_service.update(&id, body).await?))
}

async fn delete_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.car_service.delete(&id).await?;
    Ok(Json(MessageResponse::new("Car deleted successfully")))
}
