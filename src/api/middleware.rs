//! API middleware
//!
//! Contains:
//! - `AppState`, the services shared by every handler
//! - `ApiError` and the mapping from service errors
//! - the authorization gate (`require_auth`, `require_admin`)
//! - session cookie helpers

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::cache::SharedCache;
use crate::config::AuthConfig;
use crate::db::repositories::{
    CarRepository, SqlxBannerRepository, SqlxBookingRepository, SqlxCarRepository,
    SqlxContactRepository, SqlxFaqRepository, SqlxLegalRepository, SqlxPartnerRequestRepository,
    SqlxSessionRepository, SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::models::User;
use crate::services::{
    BookingService, BookingServiceError, CarService, CarServiceError, ContentRepositories,
    ContentService, ContentServiceError, IdentityProvider, PartnerRequestService,
    PartnerRequestServiceError, UserService, UserServiceError,
};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session_token";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub cache: SharedCache,
    pub car_repo: Arc<dyn CarRepository>,
    pub user_service: Arc<UserService>,
    pub car_service: Arc<CarService>,
    pub booking_service: Arc<BookingService>,
    pub partner_service: Arc<PartnerRequestService>,
    pub content_service: Arc<ContentService>,
    pub allow_self_promotion: bool,
    pub cookie_secure: bool,
}

impl AppState {
    /// Wire repositories and services over `pool`
    pub fn new(
        pool: DynDatabasePool,
        cache: SharedCache,
        identity: Arc<dyn IdentityProvider>,
        auth: &AuthConfig,
    ) -> Self {
        let car_repo = SqlxCarRepository::boxed(pool.clone());

        let user_service = UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            car_repo.clone(),
            identity,
        )
        .with_session_days(auth.session_days);

        let content_service = ContentService::new(
            ContentRepositories {
                faqs: SqlxFaqRepository::boxed(pool.clone()),
                banners: SqlxBannerRepository::boxed(pool.clone()),
                legal: SqlxLegalRepository::boxed(pool.clone()),
                contacts: SqlxContactRepository::boxed(pool.clone()),
            },
            cache.clone(),
        );

        Self {
            car_service: Arc::new(CarService::new(car_repo.clone(), cache.clone())),
            booking_service: Arc::new(BookingService::new(
                SqlxBookingRepository::boxed(pool.clone()),
                car_repo.clone(),
            )),
            partner_service: Arc::new(PartnerRequestService::new(
                SqlxPartnerRequestRepository::boxed(pool.clone()),
            )),
            content_service: Arc::new(content_service),
            user_service: Arc::new(user_service),
            car_repo,
            pool,
            cache,
            allow_self_promotion: auth.allow_self_promotion,
            cookie_secure: auth.cookie_secure,
        }
    }
}

/// Authenticated user extracted from request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn external_auth_required() -> Self {
        Self::new(
            "EXTERNAL_AUTH_REQUIRED",
            "This account was created with external login. Please sign in that way.",
        )
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn invalid_range() -> Self {
        Self::new("INVALID_RANGE", "Invalid date range")
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Log `err` and return a generic 500 that does not echo it
    pub fn internal_error(err: impl std::fmt::Display) -> Self {
        tracing::error!("Internal error: {}", err);
        Self::new("INTERNAL_ERROR", "Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "UNAUTHORIZED" | "EXTERNAL_AUTH_REQUIRED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "CONFLICT" => StatusCode::CONFLICT,
            "INVALID_RANGE" | "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::AuthenticationError(msg) => Self::unauthorized(msg),
            UserServiceError::ExternalAuthRequired => Self::external_auth_required(),
            UserServiceError::Forbidden(msg) => Self::forbidden(msg),
            UserServiceError::NotFound(msg) => Self::not_found(msg),
            UserServiceError::ValidationError(msg) => Self::validation_error(msg),
            UserServiceError::UserExists(msg) => Self::conflict(msg),
            UserServiceError::IdentityUnavailable(_) => {
                Self::new("INTERNAL_ERROR", "Authentication failed")
            }
            UserServiceError::InternalError(e) => Self::internal_error(e),
        }
    }
}

impl From<CarServiceError> for ApiError {
    fn from(err: CarServiceError) -> Self {
        match err {
            CarServiceError::NotFound(_) => Self::not_found("Car not found"),
            CarServiceError::ValidationError(msg) => Self::validation_error(msg),
            CarServiceError::InvalidRange => Self::invalid_range(),
            CarServiceError::InternalError(e) => Self::internal_error(e),
        }
    }
}

impl From<BookingServiceError> for ApiError {
    fn from(err: BookingServiceError) -> Self {
        match err {
            BookingServiceError::NotFound(msg) => Self::not_found(msg),
            BookingServiceError::ValidationError(msg) => Self::validation_error(msg),
            BookingServiceError::InvalidRange => Self::invalid_range(),
            BookingServiceError::InternalError(e) => Self::internal_error(e),
        }
    }
}

impl From<PartnerRequestServiceError> for ApiError {
    fn from(err: PartnerRequestServiceError) -> Self {
        match err {
            PartnerRequestServiceError::NotFound(_) => Self::not_found("Request not found"),
            PartnerRequestServiceError::ValidationError(msg) => Self::validation_error(msg),
            PartnerRequestServiceError::InternalError(e) => Self::internal_error(e),
        }
    }
}

impl From<ContentServiceError> for ApiError {
    fn from(err: ContentServiceError) -> Self {
        match err {
            ContentServiceError::NotFound(msg) => Self::not_found(msg),
            ContentServiceError::ValidationError(msg) => Self::validation_error(msg),
            ContentServiceError::InternalError(e) => Self::internal_error(e),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal_error(err)
    }
}

/// Session token from the `session_token` cookie, else from a bearer header
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty());

    if let Some(token) = from_cookie {
        return Some(token.to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Resolve the request's session to a user, if any
pub async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<Option<User>, ApiError> {
    match extract_session_token(headers) {
        Some(token) => Ok(state.user_service.validate_session(&token).await?),
        None => Ok(None),
    }
}

/// Authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = resolve_user(&state, request.headers())
        .await?
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Admin authorization middleware. Runs inside `require_auth`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    if !user.0.is_admin() {
        return Err(ApiError::forbidden("Admin access required"));
    }

    Ok(next.run(request).await)
}

/// `Set-Cookie` value carrying a fresh session token
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> Result<HeaderValue, ApiError> {
    let attributes = if secure {
        "Secure; SameSite=None"
    } else {
        "SameSite=Lax"
    };
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; {}; Max-Age={}",
        SESSION_COOKIE, token, attributes, max_age_secs
    );
    HeaderValue::from_str(&cookie).map_err(|e| ApiError::internal_error(format!("Bad cookie value: {}", e)))
}

/// `Set-Cookie` value removing the session cookie
pub fn clear_session_cookie(secure: bool) -> HeaderValue {
    if secure {
        HeaderValue::from_static("session_token=; Path=/; HttpOnly; Secure; SameSite=None; Max-Age=0")
    } else {
        HeaderValue::from_static("session_token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_extract_session_token_from_cookie() {
        let map = headers(&[(header::COOKIE, "theme=dark; session_token=sess_abc")]);
        assert_eq!(extract_session_token(&map), Some("sess_abc".to_string()));
    }

    #[test]
    fn test_extract_session_token_from_bearer() {
        let map = headers(&[(header::AUTHORIZATION, "Bearer sess_xyz")]);
        assert_eq!(extract_session_token(&map), Some("sess_xyz".to_string()));
    }

    #[test]
    fn test_cookie_takes_priority_over_bearer() {
        let map = headers(&[
            (header::AUTHORIZATION, "Bearer from_header"),
            (header::COOKIE, "session_token=from_cookie"),
        ]);
        assert_eq!(extract_session_token(&map), Some("from_cookie".to_string()));
    }

    #[test]
    fn test_extract_session_token_none() {
        assert!(extract_session_token(&HeaderMap::new()).is_none());
        let basic = headers(&[(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")]);
        assert!(extract_session_token(&basic).is_none());
        let other_cookie = headers(&[(header::COOKIE, "session=legacy")]);
        assert!(extract_session_token(&other_cookie).is_none());
    }

    #[test]
    fn test_empty_cookie_falls_back_to_bearer() {
        let map = headers(&[
            (header::COOKIE, "session_token="),
            (header::AUTHORIZATION, "Bearer sess_b"),
        ]);
        assert_eq!(extract_session_token(&map), Some("sess_b".to_string()));
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(ApiError::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::external_auth_required().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::invalid_range().status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::validation_error("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::internal_error("boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_error_hides_message() {
        let err: ApiError = UserServiceError::InternalError(anyhow::anyhow!("db locked")).into();
        assert_eq!(err.error.code, "INTERNAL_ERROR");
        assert!(!err.error.message.contains("db locked"));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let secure = session_cookie("sess_1", 604_800, true).unwrap();
        let secure = secure.to_str().unwrap();
        assert!(secure.starts_with("session_token=sess_1;"));
        assert!(secure.contains("HttpOnly"));
        assert!(secure.contains("Secure"));
        assert!(secure.contains("SameSite=None"));
        assert!(secure.contains("Max-Age=604800"));
        assert!(secure.contains("Path=/"));

        let local = session_cookie("sess_1", 60, false).unwrap();
        assert!(!local.to_str().unwrap().contains("Secure"));
        assert!(session_cookie("bad\ntoken", 60, true).is_err());
        assert!(clear_session_cookie(true).to_str().unwrap().contains("Max-Age=0"));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(50))]

            #[test]
            fn cookie_token_always_wins(cookie in "[A-Za-z0-9_]{1,40}", bearer in "[A-Za-z0-9_]{1,40}") {
                let auth = format!("Bearer {}", bearer);
                let cookies = format!("a=1; session_token={}; b=2", cookie);
                let map = headers(&[
                    (header::AUTHORIZATION, auth.as_str()),
                    (header::COOKIE, cookies.as_str()),
                ]);
                prop_assert_eq!(extract_session_token(&map), Some(cookie));
            }

            #[test]
            fn bearer_used_without_cookie(bearer in "[A-Za-z0-9_]{1,40}") {
                let auth = format!("Bearer {}", bearer);
                let map = headers(&[(header::AUTHORIZATION, auth.as_str())]);
                prop_assert_eq!(extract_session_token(&map), Some(bearer));
            }
        }
    }
}
