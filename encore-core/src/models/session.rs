use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::UserId;
use super::permission::RoleFacts;
use super::user::User;

/// Persisted refresh credential.
///
/// The token value is opaque high-entropy randomness, not a JWT; it is
/// exchanged (and consumed) for a fresh access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshCredential {
    pub id: String,
    pub user_id: UserId,
    #[serde(skip_serializing)]
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RefreshCredential {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Everything a freshly logged-in client needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_member: bool,
    /// Empty when the user is already a community member
    pub join_invite_url: String,
    pub profile: User,
    pub permissions: RoleFacts,
}

/// New access/refresh pair returned by a refresh exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn credential_expiry_boundary_is_inclusive() {
        let now = Utc::now();
        let credential = RefreshCredential {
            id: "cred".to_string(),
            user_id: UserId::new(),
            token: "tok".to_string(),
            expires_at: now,
            created_at: now - Duration::days(7),
        };

        // Valid strictly before the expiry instant, invalid at and after it
        assert!(!credential.is_expired(now - Duration::seconds(1)));
        assert!(credential.is_expired(now));
        assert!(credential.is_expired(now + Duration::seconds(1)));
    }
}
