//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_enum! {
    /// Authorization role. Only an explicit promotion changes it.
    UserRole, "user role" {
        User => "user",
        Admin => "admin",
    }
}

string_enum! {
    /// Display language preference
    Language, "language" {
        Ro => "ro",
        Ru => "ru",
    }
}

string_enum! {
    /// How the account was created
    AuthType, "auth type" {
        Phone => "phone",
        External => "external",
    }
}

/// A registered user.
///
/// Accounts created through external session exchange have no
/// `password_hash` and cannot use password login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "user_id")]
    pub id: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub picture: Option<String>,
    pub role: UserRole,
    pub language: Language,
    pub auth_type: AuthType,
    /// Favorite car ids
    #[serde(default)]
    pub favorites: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a new phone-registered user with a fresh `user_` id
    pub fn new_phone_user(phone: String, email: Option<String>, name: String, password_hash: String) -> Self {
        Self {
            id: super::new_id("user"),
            phone: Some(phone),
            email,
            name,
            password_hash: Some(password_hash),
            picture: None,
            role: UserRole::User,
            language: Language::Ro,
            auth_type: AuthType::Phone,
            favorites: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Build a password-less user from an external identity
    pub fn new_external_user(email: String, name: String, picture: Option<String>) -> Self {
        Self {
            id: super::new_id("user"),
            phone: None,
            email: Some(email),
            name,
            password_hash: None,
            picture,
            role: UserRole::User,
            language: Language::Ro,
            auth_type: AuthType::External,
            favorites: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Whether password login is possible for this account
    pub fn has_password(&self) -> bool {
        self.password_hash.as_deref().is_some_and(|h| !h.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_new_phone_user_defaults() {
        let user = User::new_phone_user(
            "+37360000001".to_string(),
            None,
            "Ion".to_string(),
            "hash".to_string(),
        );
        assert!(user.id.starts_with("user_"));
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.language, Language::Ro);
        assert_eq!(user.auth_type, AuthType::Phone);
        assert!(user.has_password());
        assert!(!user.is_admin());
    }

    #[test]
    fn test_external_user_has_no_password() {
        let user = User::new_external_user("a@b.md".to_string(), "A".to_string(), None);
        assert!(!user.has_password());
        assert_eq!(user.auth_type, AuthType::External);
        assert!(user.phone.is_none());
    }

    #[test]
    fn test_serialization_hides_password_hash() {
        let user = User::new_phone_user("+1".to_string(), None, "N".to_string(), "secret-hash".to_string());
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["user_id"], user.id);
        assert_eq!(json["role"], "user");
        assert_eq!(json["language"], "ro");
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!(Language::from_str("ru").unwrap(), Language::Ru);
        assert!(Language::from_str("en").is_err());
        assert!(Language::from_str("RO").is_err());
    }

    #[test]
    fn test_role_round_trips_through_str() {
        for role in UserRole::ALL {
            assert_eq!(UserRole::from_str(role.as_str()).unwrap(), *role);
        }
    }
}
