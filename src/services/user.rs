//! User service
//!
//! Accounts, sessions and the authorization gate:
//! - registration and password login issue a session
//! - external session exchange finds or creates a password-less account
//! - `validate_session` resolves a token to a user, treating expired or
//!   dangling sessions as absent
//! - admin accounts can never be deleted

use crate::config::BootstrapAdmin;
use crate::db::repositories::{CarRepository, SessionRepository, UserField, UserRepository};
use crate::models::{Car, Language, User, UserRole};
use crate::services::identity::{IdentityError, IdentityProvider};
use crate::services::password::{hash_password, verify_password, MIN_PASSWORD_LENGTH};
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

const DEFAULT_SESSION_DAYS: i64 = 7;

const INVALID_CREDENTIALS: &str = "Invalid phone or password";

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Missing, invalid or expired credentials
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// The account has no password and must use external login
    #[error("This account uses external login")]
    ExternalAuthRequired,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Phone or email already registered
    #[error("User already exists: {0}")]
    UserExists(String),

    /// The identity provider could not complete the exchange
    #[error("Identity provider error: {0}")]
    IdentityUnavailable(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Registration input
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisterInput {
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
    pub name: String,
}

/// Password login input
#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoginInput {
    pub phone: String,
    pub password: String,
}

/// A freshly issued session and its owner
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// User service for accounts and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    car_repo: Arc<dyn CarRepository>,
    identity: Arc<dyn IdentityProvider>,
    session_days: i64,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        car_repo: Arc<dyn CarRepository>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            car_repo,
            identity,
            session_days: DEFAULT_SESSION_DAYS,
        }
    }

    /// Override the session validity window
    pub fn with_session_days(mut self, days: i64) -> Self {
        self.session_days = days;
        self
    }

    pub fn session_days(&self) -> i64 {
        self.session_days
    }

    /// Register a phone account and sign it in
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, UserServiceError> {
        let phone = input.phone.trim().to_string();
        let name = input.name.trim().to_string();
        let email = input
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());

        if phone.is_empty() {
            return Err(UserServiceError::ValidationError("Phone is required".to_string()));
        }
        if name.is_empty() {
            return Err(UserServiceError::ValidationError("Name cannot be empty".to_string()));
        }
        if input.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(UserServiceError::ValidationError(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        if self
            .user_repo
            .get_by_phone(&phone)
            .await
            .context("Failed to check phone")?
            .is_some()
        {
            return Err(UserServiceError::UserExists("Phone already registered".to_string()));
        }
        if let Some(email) = &email {
            if self
                .user_repo
                .get_by_email(email)
                .await
                .context("Failed to check email")?
                .is_some()
            {
                return Err(UserServiceError::UserExists("Email already registered".to_string()));
            }
        }

        let password_hash = hash_password(&input.password)?;
        let user = User::new_phone_user(phone, email, name, password_hash);
        let user = self.user_repo.create(&user).await.context("Failed to create user")?;
        tracing::info!("Registered user {}", user.id);

        self.issue_session(user, new_session_token()).await
    }

    /// Password login by phone
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, UserServiceError> {
        let user = self
            .user_repo
            .get_by_phone(input.phone.trim())
            .await
            .context("Failed to look up user")?
            .ok_or_else(|| UserServiceError::AuthenticationError(INVALID_CREDENTIALS.to_string()))?;

        let Some(hash) = user.password_hash.as_deref().filter(|h| !h.is_empty()) else {
            return Err(UserServiceError::ExternalAuthRequired);
        };

        if !verify_password(&input.password, hash)? {
            return Err(UserServiceError::AuthenticationError(INVALID_CREDENTIALS.to_string()));
        }

        self.issue_session(user, new_session_token()).await
    }

    /// Exchange an external session id for a local session
    pub async fn exchange_session(&self, session_id: &str) -> Result<AuthSession, UserServiceError> {
        if session_id.trim().is_empty() {
            return Err(UserServiceError::ValidationError("session_id required".to_string()));
        }

        let identity = self.identity.exchange(session_id).await.map_err(|e| match e {
            IdentityError::Rejected => {
                UserServiceError::AuthenticationError("Invalid session_id".to_string())
            }
            IdentityError::Unavailable(message) => {
                tracing::error!("Identity exchange failed: {}", message);
                UserServiceError::IdentityUnavailable(message)
            }
        })?;

        let user = match self
            .user_repo
            .get_by_email(&identity.email)
            .await
            .context("Failed to look up user by email")?
        {
            Some(user) => user,
            None => {
                let user = User::new_external_user(identity.email, identity.name, identity.picture);
                let user = self.user_repo.create(&user).await.context("Failed to create user")?;
                tracing::info!("Created external user {}", user.id);
                user
            }
        };

        self.issue_session(user, identity.session_token).await
    }

    async fn issue_session(&self, user: User, token: String) -> Result<AuthSession, UserServiceError> {
        let expires_at = Utc::now() + Duration::days(self.session_days);
        self.session_repo
            .create(&user.id, &token, expires_at)
            .await
            .context("Failed to create session")?;
        Ok(AuthSession {
            user,
            token,
            expires_at,
        })
    }

    /// Resolve a session token to its user.
    ///
    /// Unknown tokens, expired sessions and sessions whose user is gone all
    /// resolve to `None`. Expired sessions are not deleted here.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let Some(session) = self
            .session_repo
            .get_by_token(token)
            .await
            .context("Failed to get session")?
        else {
            return Ok(None);
        };

        if session.is_expired_at(Utc::now()) {
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(&session.user_id)
            .await
            .context("Failed to get session user")?;
        Ok(user)
    }

    /// Delete every session carrying `token`
    pub async fn logout(&self, token: &str) -> Result<(), UserServiceError> {
        let removed = self
            .session_repo
            .delete_by_token(token)
            .await
            .context("Failed to delete session")?;
        tracing::debug!("Logout removed {} session(s)", removed);
        Ok(())
    }

    /// Remove sessions and then the user. Admin accounts are refused.
    pub async fn delete_user(&self, id: &str) -> Result<(), UserServiceError> {
        let user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or_else(|| UserServiceError::NotFound("User not found".to_string()))?;

        if user.is_admin() {
            return Err(UserServiceError::Forbidden("Cannot delete admin account".to_string()));
        }

        self.session_repo
            .delete_by_user(&user.id)
            .await
            .context("Failed to delete user sessions")?;
        self.user_repo.delete(&user.id).await.context("Failed to delete user")?;
        tracing::info!("Deleted user {}", user.id);
        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self.user_repo.get_by_id(id).await.context("Failed to get user")?)
    }

    /// All users, newest first
    pub async fn list_users(&self) -> Result<Vec<User>, UserServiceError> {
        Ok(self.user_repo.list().await.context("Failed to list users")?)
    }

    pub async fn count_customers(&self) -> Result<i64, UserServiceError> {
        Ok(self.user_repo.count_non_admin().await.context("Failed to count users")?)
    }

    async fn write_field(&self, id: &str, field: UserField) -> Result<User, UserServiceError> {
        self.user_repo
            .update_field(id, field)
            .await
            .context("Failed to update user")?
            .ok_or_else(|| UserServiceError::NotFound("User not found".to_string()))
    }

    pub async fn update_name(&self, user: &User, name: &str) -> Result<User, UserServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(UserServiceError::ValidationError("Name cannot be empty".to_string()));
        }
        self.write_field(&user.id, UserField::Name(name.to_string())).await
    }

    pub async fn update_language(&self, user: &User, language: &str) -> Result<User, UserServiceError> {
        let language: Language = language
            .parse()
            .map_err(|_| UserServiceError::ValidationError("Language must be 'ro' or 'ru'".to_string()))?;
        self.write_field(&user.id, UserField::Language(language)).await
    }

    pub async fn update_picture(&self, user: &User, picture: String) -> Result<User, UserServiceError> {
        self.write_field(&user.id, UserField::Picture(picture)).await
    }

    /// Set the role of `id` to admin
    pub async fn promote(&self, id: &str) -> Result<User, UserServiceError> {
        let user = self.write_field(id, UserField::Role(UserRole::Admin)).await?;
        tracing::info!("Promoted user {} to admin", user.id);
        Ok(user)
    }

    /// Add a car to the user's favorites. Returns the updated favorite ids.
    pub async fn add_favorite(&self, user: &User, car_id: &str) -> Result<Vec<String>, UserServiceError> {
        if self
            .car_repo
            .get_by_id(car_id)
            .await
            .context("Failed to get car")?
            .is_none()
        {
            return Err(UserServiceError::NotFound("Car not found".to_string()));
        }
        self.user_repo
            .add_favorite(&user.id, car_id)
            .await
            .context("Failed to add favorite")?;
        Ok(self.user_repo.list_favorites(&user.id).await.context("Failed to list favorites")?)
    }

    pub async fn remove_favorite(&self, user: &User, car_id: &str) -> Result<Vec<String>, UserServiceError> {
        self.user_repo
            .remove_favorite(&user.id, car_id)
            .await
            .context("Failed to remove favorite")?;
        Ok(self.user_repo.list_favorites(&user.id).await.context("Failed to list favorites")?)
    }

    /// Full records of the user's favorite cars that still exist
    pub async fn favorite_cars(&self, user: &User) -> Result<Vec<Car>, UserServiceError> {
        let ids = self
            .user_repo
            .list_favorites(&user.id)
            .await
            .context("Failed to list favorites")?;
        Ok(self.car_repo.get_many(&ids).await.context("Failed to load favorite cars")?)
    }

    /// Create the configured admin unless a user with that phone exists.
    /// Returns whether an account was created.
    pub async fn ensure_admin(&self, admin: &BootstrapAdmin) -> Result<bool, UserServiceError> {
        if self
            .user_repo
            .get_by_phone(&admin.phone)
            .await
            .context("Failed to check bootstrap admin")?
            .is_some()
        {
            return Ok(false);
        }

        let mut user = User::new_phone_user(
            admin.phone.clone(),
            admin.email.clone(),
            admin.name.clone(),
            hash_password(&admin.password)?,
        );
        user.role = UserRole::Admin;
        self.user_repo.create(&user).await.context("Failed to create admin")?;
        tracing::info!("Created bootstrap admin {}", user.id);
        Ok(true)
    }
}

fn new_session_token() -> String {
    format!("sess_{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::repositories::{SqlxCarRepository, SqlxSessionRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::services::identity::ExternalIdentity;
    use async_trait::async_trait;

    /// Identity provider returning a canned answer
    pub(crate) struct FakeIdentityProvider {
        pub answer: fn(&str) -> Result<ExternalIdentity, IdentityError>,
    }

    #[async_trait]
    impl IdentityProvider for FakeIdentityProvider {
        async fn exchange(&self, session_id: &str) -> Result<ExternalIdentity, IdentityError> {
            (self.answer)(session_id)
        }
    }

    pub(crate) fn accepting_provider() -> Arc<dyn IdentityProvider> {
        Arc::new(FakeIdentityProvider {
            answer: |sid| {
                Ok(ExternalIdentity {
                    id: format!("ext-{}", sid),
                    email: format!("{}@example.md", sid),
                    name: "External User".to_string(),
                    picture: Some("https://img.example/p.png".to_string()),
                    session_token: format!("ext_token_{}", sid),
                })
            },
        })
    }

    async fn setup_test_service_with(identity: Arc<dyn IdentityProvider>) -> (DynDatabasePool, UserService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");
        let service = UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            SqlxCarRepository::boxed(pool.clone()),
            identity,
        );
        (pool, service)
    }

    async fn setup_test_service() -> UserService {
        setup_test_service_with(accepting_provider()).await.1
    }

    fn register_input(phone: &str, email: Option<&str>) -> RegisterInput {
        RegisterInput {
            phone: phone.to_string(),
            email: email.map(str::to_string),
            password: "parola123".to_string(),
            name: "Ion Popescu".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_issues_session() {
        let service = setup_test_service().await;
        let auth = service.register(register_input("+37360000001", None)).await.unwrap();

        assert!(auth.token.starts_with("sess_"));
        assert_eq!(auth.token.len(), "sess_".len() + 32);
        assert_eq!(auth.user.role, UserRole::User);
        let days = (auth.expires_at - Utc::now()).num_hours();
        assert!((167..=168).contains(&days));

        let resolved = service.validate_session(&auth.token).await.unwrap().unwrap();
        assert_eq!(resolved.id, auth.user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_phone_conflicts() {
        let service = setup_test_service().await;
        service.register(register_input("+37360000001", None)).await.unwrap();
        let result = service.register(register_input("+37360000001", None)).await;
        assert!(matches!(result, Err(UserServiceError::UserExists(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let service = setup_test_service().await;
        service
            .register(register_input("+37360000001", Some("ion@example.md")))
            .await
            .unwrap();
        let result = service
            .register(register_input("+37360000002", Some("ion@example.md")))
            .await;
        assert!(matches!(result, Err(UserServiceError::UserExists(_))));
        // No partial write for the rejected phone
        let login = service
            .login(LoginInput { phone: "+37360000002".to_string(), password: "parola123".to_string() })
            .await;
        assert!(matches!(login, Err(UserServiceError::AuthenticationError(_))));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let service = setup_test_service().await;
        let mut short = register_input("+37360000001", None);
        short.password = "12345".to_string();
        assert!(matches!(service.register(short).await, Err(UserServiceError::ValidationError(_))));

        let mut nameless = register_input("+37360000001", None);
        nameless.name = "   ".to_string();
        assert!(matches!(service.register(nameless).await, Err(UserServiceError::ValidationError(_))));

        let phoneless = register_input("", None);
        assert!(matches!(service.register(phoneless).await, Err(UserServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_login_success_and_wrong_password() {
        let service = setup_test_service().await;
        service.register(register_input("+37360000001", None)).await.unwrap();

        let ok = service
            .login(LoginInput { phone: "+37360000001".to_string(), password: "parola123".to_string() })
            .await
            .unwrap();
        assert!(service.validate_session(&ok.token).await.unwrap().is_some());

        let wrong = service
            .login(LoginInput { phone: "+37360000001".to_string(), password: "nope".to_string() })
            .await;
        assert!(matches!(wrong, Err(UserServiceError::AuthenticationError(_))));

        let unknown = service
            .login(LoginInput { phone: "+000".to_string(), password: "parola123".to_string() })
            .await;
        assert!(matches!(unknown, Err(UserServiceError::AuthenticationError(_))));
    }

    #[tokio::test]
    async fn test_login_to_external_account_requires_external_auth() {
        let (pool, service) = setup_test_service_with(accepting_provider()).await;
        let user_repo = SqlxUserRepository::new(pool);
        let mut user = User::new_external_user("x@example.md".to_string(), "X".to_string(), None);
        user.phone = Some("+37360000009".to_string());
        user_repo.create(&user).await.unwrap();

        let result = service
            .login(LoginInput { phone: "+37360000009".to_string(), password: "whatever".to_string() })
            .await;
        assert!(matches!(result, Err(UserServiceError::ExternalAuthRequired)));
    }

    #[tokio::test]
    async fn test_exchange_creates_then_reuses_user() {
        let service = setup_test_service().await;
        let first = service.exchange_session("abc").await.unwrap();
        assert_eq!(first.token, "ext_token_abc");
        assert!(!first.user.has_password());
        assert_eq!(first.user.email.as_deref(), Some("abc@example.md"));

        let second = service.exchange_session("abc").await.unwrap();
        assert_eq!(second.user.id, first.user.id);
        assert!(service.validate_session("ext_token_abc").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_exchange_errors() {
        let rejecting: Arc<dyn IdentityProvider> =
            Arc::new(FakeIdentityProvider { answer: |_| Err(IdentityError::Rejected) });
        let (_pool, service) = setup_test_service_with(rejecting).await;
        assert!(matches!(
            service.exchange_session("sid").await,
            Err(UserServiceError::AuthenticationError(_))
        ));
        assert!(matches!(
            service.exchange_session("  ").await,
            Err(UserServiceError::ValidationError(_))
        ));

        let down: Arc<dyn IdentityProvider> = Arc::new(FakeIdentityProvider {
            answer: |_| Err(IdentityError::Unavailable("timeout".to_string())),
        });
        let (_pool, service) = setup_test_service_with(down).await;
        assert!(matches!(
            service.exchange_session("sid").await,
            Err(UserServiceError::IdentityUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_session_resolves_to_none_and_is_kept() {
        let (pool, service) = setup_test_service_with(accepting_provider()).await;
        let auth = service.register(register_input("+37360000001", None)).await.unwrap();
        let sessions = SqlxSessionRepository::new(pool.clone());
        sessions
            .create(&auth.user.id, "sess_old", Utc::now() - Duration::seconds(1))
            .await
            .unwrap();

        assert!(service.validate_session("sess_old").await.unwrap().is_none());
        assert!(sessions.get_by_token("sess_old").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_naive_expiry_in_past_is_expired() {
        let (pool, service) = setup_test_service_with(accepting_provider()).await;
        let auth = service.register(register_input("+37360000001", None)).await.unwrap();
        sqlx::query("INSERT INTO sessions (token, user_id, expires_at, created_at) VALUES ('sess_naive', ?, '2001-01-01 00:00:00', '2000-12-25 00:00:00')")
            .bind(&auth.user.id)
            .execute(pool.as_sqlite())
            .await
            .unwrap();
        assert!(service.validate_session("sess_naive").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_of_deleted_user_resolves_to_none() {
        let (pool, service) = setup_test_service_with(accepting_provider()).await;
        let auth = service.register(register_input("+37360000001", None)).await.unwrap();
        SqlxUserRepository::new(pool).delete(&auth.user.id).await.unwrap();
        assert!(service.validate_session(&auth.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_invalidates_token() {
        let service = setup_test_service().await;
        let auth = service.register(register_input("+37360000001", None)).await.unwrap();
        service.logout(&auth.token).await.unwrap();
        assert!(service.validate_session(&auth.token).await.unwrap().is_none());
        service.logout(&auth.token).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_user_removes_sessions_and_refuses_admin() {
        let service = setup_test_service().await;
        let auth = service.register(register_input("+37360000001", None)).await.unwrap();
        service.delete_user(&auth.user.id).await.unwrap();
        assert!(service.get_by_id(&auth.user.id).await.unwrap().is_none());
        assert!(service.validate_session(&auth.token).await.unwrap().is_none());

        let admin = service.register(register_input("+37360000002", None)).await.unwrap();
        service.promote(&admin.user.id).await.unwrap();
        assert!(matches!(
            service.delete_user(&admin.user.id).await,
            Err(UserServiceError::Forbidden(_))
        ));
        assert!(service.validate_session(&admin.token).await.unwrap().is_some());
        assert!(matches!(
            service.delete_user("user_missing").await,
            Err(UserServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_profile_updates() {
        let service = setup_test_service().await;
        let auth = service.register(register_input("+37360000001", None)).await.unwrap();

        let user = service.update_language(&auth.user, "ru").await.unwrap();
        assert_eq!(user.language, Language::Ru);
        assert!(matches!(
            service.update_language(&user, "en").await,
            Err(UserServiceError::ValidationError(_))
        ));

        let user = service.update_name(&user, "  Maria  ").await.unwrap();
        assert_eq!(user.name, "Maria");
        assert!(service.update_name(&user, "").await.is_err());

        let user = service.update_picture(&user, "data:image/png;base64,AA".to_string()).await.unwrap();
        let stored = service.get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.picture.as_deref(), Some("data:image/png;base64,AA"));
        assert_eq!(stored.language, Language::Ru);
    }

    #[tokio::test]
    async fn test_profile_update_keeps_promotion_made_after_resolution() {
        let service = setup_test_service().await;
        let auth = service.register(register_input("+37360000001", None)).await.unwrap();
        let resolved = service.validate_session(&auth.token).await.unwrap().unwrap();

        service.promote(&resolved.id).await.unwrap();
        let user = service.update_name(&resolved, "Nou").await.unwrap();
        assert_eq!(user.role, UserRole::Admin);
        let user = service.update_language(&resolved, "ru").await.unwrap();
        let user = service.update_picture(&resolved, "p.png".to_string()).await.unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(user.name, "Nou");
        assert_eq!(user.language, Language::Ru);
    }

    #[tokio::test]
    async fn test_profile_update_of_deleted_user_is_not_found() {
        let service = setup_test_service().await;
        let auth = service.register(register_input("+37360000001", None)).await.unwrap();
        service.delete_user(&auth.user.id).await.unwrap();

        assert!(matches!(
            service.update_name(&auth.user, "Nou").await,
            Err(UserServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.update_picture(&auth.user, "p.png".to_string()).await,
            Err(UserServiceError::NotFound(_))
        ));
        assert!(matches!(service.promote("user_missing").await, Err(UserServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_favorites_require_existing_car() {
        let (pool, service) = setup_test_service_with(accepting_provider()).await;
        let auth = service.register(register_input("+37360000001", None)).await.unwrap();
        assert!(matches!(
            service.add_favorite(&auth.user, "car_missing").await,
            Err(UserServiceError::NotFound(_))
        ));

        let car = crate::services::seed::sample_cars().remove(0);
        SqlxCarRepository::new(pool).create(&car).await.unwrap();

        assert_eq!(service.add_favorite(&auth.user, &car.id).await.unwrap(), vec![car.id.clone()]);
        assert_eq!(service.add_favorite(&auth.user, &car.id).await.unwrap().len(), 1);
        assert_eq!(service.favorite_cars(&auth.user).await.unwrap()[0].id, car.id);
        assert!(service.remove_favorite(&auth.user, &car.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let service = setup_test_service().await;
        let admin = BootstrapAdmin {
            phone: "+37360000000".to_string(),
            password: "admin123".to_string(),
            name: "Administrator".to_string(),
            email: None,
        };
        assert!(service.ensure_admin(&admin).await.unwrap());
        assert!(!service.ensure_admin(&admin).await.unwrap());

        let auth = service
            .login(LoginInput { phone: admin.phone.clone(), password: admin.password.clone() })
            .await
            .unwrap();
        assert!(auth.user.is_admin());
        assert_eq!(service.count_customers().await.unwrap(), 0);
    }
}
