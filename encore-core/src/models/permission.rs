//! Role facts
//!
//! A closed set of boolean capability flags attached to a user. The flags
//! are read from the store on every request and never inferred from tokens,
//! since membership and editing rights can change between requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Permission-relevant attributes of a user.
///
/// A user with no stored row gets `RoleFacts::default()`: everything false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleFacts {
    /// Recognized community member (drives the join-invitation flow)
    pub is_member: bool,
    /// Club organizer: may create, update and delete events
    pub can_edit_events: bool,
    /// Tracklist editor: may replace an event's tracklist
    pub can_edit_tracklists: bool,
    /// Song editor: may edit any song, not just their own
    pub can_edit_songs: bool,
    /// Role admin: may assign performance roles on behalf of others
    pub can_manage_roles: bool,
}

impl RoleFacts {
    /// Facts granting every capability, for fixtures and bootstrap.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            is_member: true,
            can_edit_events: true,
            can_edit_tracklists: true,
            can_edit_songs: true,
            can_manage_roles: true,
        }
    }
}

/// Stored role-fact row, `RoleFacts` plus bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleFactsRecord {
    pub user_id: UserId,
    #[serde(flatten)]
    pub facts: RoleFacts,
    pub updated_at: DateTime<Utc>,
}
