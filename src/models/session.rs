//! Session model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque token bound to a user until `expires_at`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// A session is valid only while `now < expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session_expiring(expires_at: DateTime<Utc>) -> Session {
        Session {
            id: 1,
            token: "sess_test".to_string(),
            user_id: "user_test".to_string(),
            expires_at,
            created_at: expires_at - Duration::days(7),
        }
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let now = Utc::now();
        assert!(session_expiring(now).is_expired_at(now));
        assert!(!session_expiring(now + Duration::seconds(1)).is_expired_at(now));
        assert!(session_expiring(now - Duration::seconds(1)).is_expired_at(now));
    }

    #[test]
    fn test_is_expired_uses_current_time() {
        assert!(session_expiring(Utc::now() - Duration::hours(1)).is_expired());
        assert!(!session_expiring(Utc::now() + Duration::hours(1)).is_expired());
    }
}
