//! Permission evaluation
//!
//! The four decision functions below are the SOLE gate for every mutation in
//! the system. They are pure functions of role facts (and, for songs, the
//! entity's creator) so they can be tested without a database and audited in
//! one place. Mutating services load facts fresh per request and call
//! these; nothing else may decide.

use crate::{
    models::{RoleFacts, UserId},
    repository::RoleFactsRepository,
    Error, Result,
};

/// True iff the caller holds the organizer/event-editor fact.
#[must_use]
pub const fn can_edit_events(facts: &RoleFacts) -> bool {
    facts.can_edit_events
}

/// True iff the caller may replace tracklists. Granted more broadly than
/// event editing: dedicated tracklist editors qualify alongside organizers.
#[must_use]
pub const fn can_edit_tracklist(facts: &RoleFacts) -> bool {
    facts.can_edit_tracklists || facts.can_edit_events
}

/// True iff the caller created the song or holds the song-editor fact.
#[must_use]
pub fn can_edit_song(facts: &RoleFacts, creator: Option<&UserId>, caller: &UserId) -> bool {
    facts.can_edit_songs || creator == Some(caller)
}

/// True iff the caller is signing themselves up, or holds the role-admin
/// fact and may act on behalf of `target`.
#[must_use]
pub fn can_join_role(facts: &RoleFacts, target: &UserId, caller: &UserId) -> bool {
    target == caller || facts.can_manage_roles
}

/// Turn a boolean decision into the distinct forbidden outcome.
///
/// Denials are deliberate errors, never silently ignored.
pub fn require(allowed: bool, action: &str) -> Result<()> {
    if allowed {
        Ok(())
    } else {
        Err(Error::Authorization(format!("no rights to {action}")))
    }
}

/// Loads role facts for permission decisions.
///
/// No caching: facts can change between requests, and requests may be served
/// by independent handlers, so every decision reads current state.
#[derive(Clone)]
pub struct PermissionService {
    repository: RoleFactsRepository,
}

impl std::fmt::Debug for PermissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionService").finish()
    }
}

impl PermissionService {
    #[must_use]
    pub const fn new(repository: RoleFactsRepository) -> Self {
        Self { repository }
    }

    /// Load the caller's current role facts (all-false when none stored)
    pub async fn facts(&self, user_id: &UserId) -> Result<RoleFacts> {
        self.repository
            .get(user_id)
            .await
            .map_err(|e| e.with_operation("load role facts"))
    }

    /// Facts for an optional caller: anonymous readers get no capabilities
    pub async fn facts_opt(&self, user_id: Option<&UserId>) -> Result<RoleFacts> {
        match user_id {
            Some(id) => self.facts(id).await,
            None => Ok(RoleFacts::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts_with(f: impl FnOnce(&mut RoleFacts)) -> RoleFacts {
        let mut facts = RoleFacts::default();
        f(&mut facts);
        facts
    }

    #[test]
    fn event_editing_requires_the_event_fact() {
        assert!(!can_edit_events(&RoleFacts::default()));
        assert!(can_edit_events(&facts_with(|f| f.can_edit_events = true)));

        // Adjacent facts do not leak into event editing
        assert!(!can_edit_events(&facts_with(|f| {
            f.can_edit_tracklists = true;
            f.can_edit_songs = true;
            f.can_manage_roles = true;
            f.is_member = true;
        })));
    }

    #[test]
    fn tracklist_editing_is_broader_than_event_editing() {
        assert!(!can_edit_tracklist(&RoleFacts::default()));
        assert!(can_edit_tracklist(&facts_with(
            |f| f.can_edit_tracklists = true
        )));
        // Organizers may always fix tracklists too
        assert!(can_edit_tracklist(&facts_with(|f| f.can_edit_events = true)));
    }

    #[test]
    fn song_editing_allows_creator_or_editor() {
        let creator = UserId::from_string("creator-user".to_string());
        let other = UserId::from_string("someone-else".to_string());
        let none = RoleFacts::default();

        assert!(can_edit_song(&none, Some(&creator), &creator));
        assert!(!can_edit_song(&none, Some(&creator), &other));
        assert!(!can_edit_song(&none, None, &other));

        let editor = facts_with(|f| f.can_edit_songs = true);
        assert!(can_edit_song(&editor, Some(&creator), &other));
        assert!(can_edit_song(&editor, None, &other));
    }

    #[test]
    fn role_joining_is_self_service_or_admin() {
        let me = UserId::from_string("me-me-me-me-m".to_string());
        let target = UserId::from_string("target-user-x".to_string());
        let none = RoleFacts::default();

        assert!(can_join_role(&none, &me, &me));
        assert!(!can_join_role(&none, &target, &me));

        let admin = facts_with(|f| f.can_manage_roles = true);
        assert!(can_join_role(&admin, &target, &me));
    }

    #[test]
    fn require_produces_the_forbidden_outcome() {
        assert!(require(true, "edit events").is_ok());
        let err = require(false, "edit events").unwrap_err();
        assert!(matches!(err, Error::Authorization(msg) if msg.contains("edit events")));
    }
}
