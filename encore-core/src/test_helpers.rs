//! Test helpers and fixtures for encore-core tests
//!
//! Common fixtures to reduce boilerplate across unit tests.

use chrono::Utc;

use crate::models::{Event, EventId, ProfileHint, RoleFacts, Song, SongId, User, UserId};

/// Create a test user ID
pub fn test_user_id(id: &str) -> UserId {
    UserId::from_string(id.to_string())
}

/// Generate a random user ID for testing
pub fn random_user_id() -> UserId {
    UserId::new()
}

/// A user bootstrapped from a chat identity, for fixtures
pub fn test_user(telegram_id: i64, first_name: &str) -> User {
    User::new(
        telegram_id,
        ProfileHint {
            first_name: Some(first_name.to_string()),
            ..ProfileHint::default()
        },
    )
}

/// Role facts with only the given mutator applied
pub fn facts_with(f: impl FnOnce(&mut RoleFacts)) -> RoleFacts {
    let mut facts = RoleFacts::default();
    f(&mut facts);
    facts
}

/// A minimal event owned by `creator`
pub fn test_event(creator: &UserId, title: &str) -> Event {
    let now = Utc::now();
    Event {
        id: EventId::new(),
        title: title.to_string(),
        start_at: None,
        location: None,
        notify_day_before: false,
        notify_hour_before: false,
        created_by: creator.clone(),
        created_at: now,
        updated_at: now,
    }
}

/// A minimal song owned by `creator`
pub fn test_song(creator: Option<&UserId>, title: &str) -> Song {
    let now = Utc::now();
    Song {
        id: SongId::new(),
        title: title.to_string(),
        artist: String::new(),
        description: String::new(),
        link: None,
        created_by: creator.cloned(),
        created_at: now,
        updated_at: now,
    }
}
