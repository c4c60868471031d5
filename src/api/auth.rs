//! Authentication API endpoints
//!
//! - POST /api/auth/register - phone registration
//! - POST /api/auth/login - phone and password login
//! - POST /api/auth/session - external session exchange
//! - GET /api/auth/me - current user
//! - POST /api/auth/logout - end the presented session
//! - DELETE /api/auth/delete-account - remove own account

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::common::MessageResponse;
use crate::api::middleware::{
    clear_session_cookie, extract_session_token, session_cookie, ApiError, AppState,
    AuthenticatedUser,
};
use crate::models::User;
use crate::services::{AuthSession, LoginInput, RegisterInput};

/// Response for successful authentication
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub session_token: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionExchangeRequest {
    #[serde(default)]
    pub session_id: String,
}

/// Public auth routes
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/session", post(exchange_session))
        .route("/logout", post(logout))
}

/// Auth routes behind `require_auth`
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/delete-account", delete(delete_account))
}

fn signed_in(state: &AppState, auth: AuthSession) -> Result<impl IntoResponse, ApiError> {
    let max_age = state.user_service.session_days() * 86_400;
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        session_cookie(&auth.token, max_age, state.cookie_secure)?,
    );
    Ok((
        headers,
        Json(AuthResponse {
            user: auth.user,
            session_token: auth.token,
        }),
    ))
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterInput>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = state.user_service.register(body).await?;
    signed_in(&state, auth)
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = state.user_service.login(body).await?;
    signed_in(&state, auth)
}

/// POST /api/auth/session
async fn exchange_session(
    State(state): State<AppState>,
    Json(body): Json<SessionExchangeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = state.user_service.exchange_session(&body.session_id).await?;
    signed_in(&state, auth)
}

/// GET /api/auth/me
async fn me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}

/// POST /api/auth/logout
///
/// Succeeds with or without a session.
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = extract_session_token(&headers) {
        state.user_service.logout(&token).await?;
    }

    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::SET_COOKIE, clear_session_cookie(state.cookie_secure));
    Ok((response_headers, Json(MessageResponse::new("Logged out successfully"))))
}

/// DELETE /api/auth/delete-account
async fn delete_account(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    state.user_service.delete_user(&user.id).await?;

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, clear_session_cookie(state.cookie_secure));
    Ok((headers, Json(MessageResponse::new("Contul a fost șters cu succes"))))
}
