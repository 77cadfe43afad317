use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::UserId;

/// A community member (or prospective member) bootstrapped from their
/// chat-platform identity.
///
/// `telegram_id` is the external identity: unique and immutable once set.
/// Profile fields are hints supplied by the chat platform and are updated
/// opportunistically on every login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn new(telegram_id: i64, profile: ProfileHint) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            telegram_id,
            username: profile.username,
            first_name: profile.first_name.unwrap_or_default(),
            last_name: profile.last_name,
            created_at: now,
            updated_at: now,
        }
    }

    /// Human-readable name for logs and UI: "First Last" falling back to
    /// the platform username, then the raw chat id.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = match &self.last_name {
            Some(last) if !self.first_name.is_empty() => format!("{} {last}", self.first_name),
            _ => self.first_name.clone(),
        };
        if !full.is_empty() {
            return full;
        }
        self.username
            .clone()
            .unwrap_or_else(|| self.telegram_id.to_string())
    }
}

/// Optional profile fields supplied by the chat platform at login time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileHint {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_full_name() {
        let user = User::new(
            42,
            ProfileHint {
                first_name: Some("Alice".to_string()),
                last_name: Some("Cooper".to_string()),
                username: Some("alice".to_string()),
            },
        );
        assert_eq!(user.display_name(), "Alice Cooper");
    }

    #[test]
    fn display_name_falls_back_to_username_then_id() {
        let user = User::new(
            42,
            ProfileHint {
                username: Some("alice".to_string()),
                ..ProfileHint::default()
            },
        );
        assert_eq!(user.display_name(), "alice");

        let anonymous = User::new(42, ProfileHint::default());
        assert_eq!(anonymous.display_name(), "42");
    }
}
