use chrono::Utc;
use sqlx::PgPool;

use crate::{
    models::{
        Event, EventDetails, EventFields, EventId, EventListQuery, EventSummary, RoleFacts,
        SongId, TracklistItem, UserId,
    },
    repository::EventRepository,
    service::permission::{self, PermissionService},
    transaction::with_transaction,
    Error, Result,
};

/// Event service: composite writes over events and their tracklists.
///
/// Every mutation is gated by the permission evaluator first and then runs
/// inside a single transaction, so a concurrent reader never observes a
/// half-replaced tracklist.
#[derive(Clone)]
pub struct EventService {
    pool: PgPool,
    events: EventRepository,
    permissions: PermissionService,
}

impl std::fmt::Debug for EventService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventService").finish()
    }
}

impl EventService {
    #[must_use]
    pub fn new(pool: PgPool, permissions: PermissionService) -> Self {
        Self {
            events: EventRepository::new(pool.clone()),
            pool,
            permissions,
        }
    }

    /// Create an event together with its initial tracklist, as one unit.
    pub async fn create_event(
        &self,
        caller: &UserId,
        fields: EventFields,
        tracklist: Vec<SongId>,
    ) -> Result<EventDetails> {
        let facts = self.permissions.facts(caller).await?;
        permission::require(permission::can_edit_events(&facts), "create events")?;
        validate_fields(&fields)?;

        let now = Utc::now();
        let event = Event {
            id: EventId::new(),
            title: fields.title.trim().to_string(),
            start_at: fields.start_at,
            location: fields.location,
            notify_day_before: fields.notify_day_before,
            notify_hour_before: fields.notify_hour_before,
            created_by: caller.clone(),
            created_at: now,
            updated_at: now,
        };

        let repo = self.events.clone();
        let (created, items) = with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let created = repo.create_with_executor(&event, &mut **tx).await?;
                repo.replace_tracklist(&mut **tx, &created.id, &tracklist)
                    .await?;
                // Detail view composed from the same transactional snapshot,
                // not a post-commit re-read that could race another writer.
                let items = repo
                    .get_tracklist_with_executor(&created.id, &mut **tx)
                    .await?;
                Ok((created, items))
            })
        })
        .await
        .map_err(|e| e.with_operation("create event"))?;

        tracing::info!(event_id = %created.id, user_id = %caller, "event created");

        Ok(compose_details(created, items, &facts))
    }

    /// Fetch one event with its ordered tracklist.
    pub async fn get_event(
        &self,
        caller: Option<&UserId>,
        id: &EventId,
    ) -> Result<EventDetails> {
        let event = self
            .events
            .get_by_id(id)
            .await
            .map_err(|e| e.with_operation("get event"))?
            .ok_or_else(|| Error::NotFound("event not found".to_string()))?;

        let items = self
            .events
            .get_tracklist(id)
            .await
            .map_err(|e| e.with_operation("load tracklist"))?;

        let facts = self.permissions.facts_opt(caller).await?;
        Ok(compose_details(event, items, &facts))
    }

    /// List events by start time ascending, unscheduled last.
    pub async fn list_events(
        &self,
        caller: Option<&UserId>,
        query: &EventListQuery,
    ) -> Result<Vec<EventSummary>> {
        let events = self
            .events
            .list(query)
            .await
            .map_err(|e| e.with_operation("list events"))?;

        let facts = self.permissions.facts_opt(caller).await?;
        Ok(events
            .into_iter()
            .map(|event| EventSummary {
                editable_by_me: permission::can_edit_events(&facts),
                tracklist_editable_by_me: permission::can_edit_tracklist(&facts),
                event,
            })
            .collect())
    }

    /// Update scalar event fields. A missing target is NotFound, distinct
    /// from a successful no-op update.
    pub async fn update_event(
        &self,
        caller: &UserId,
        id: &EventId,
        fields: EventFields,
    ) -> Result<EventDetails> {
        let facts = self.permissions.facts(caller).await?;
        permission::require(permission::can_edit_events(&facts), "update events")?;
        validate_fields(&fields)?;

        let updated = self
            .events
            .update_fields(id, &fields)
            .await
            .map_err(|e| e.with_operation("update event"))?
            .ok_or_else(|| Error::NotFound("event not found".to_string()))?;

        let items = self
            .events
            .get_tracklist(id)
            .await
            .map_err(|e| e.with_operation("load tracklist"))?;

        Ok(compose_details(updated, items, &facts))
    }

    /// Delete an event and its tracklist.
    pub async fn delete_event(&self, caller: &UserId, id: &EventId) -> Result<()> {
        let facts = self.permissions.facts(caller).await?;
        permission::require(permission::can_edit_events(&facts), "delete events")?;

        let deleted = self
            .events
            .delete(id)
            .await
            .map_err(|e| e.with_operation("delete event"))?;
        if !deleted {
            return Err(Error::NotFound("event not found".to_string()));
        }

        tracing::info!(event_id = %id, user_id = %caller, "event deleted");
        Ok(())
    }

    /// Replace the event's tracklist with the given ordered set, as one
    /// unit (replace-not-merge).
    pub async fn set_tracklist(
        &self,
        caller: &UserId,
        event_id: &EventId,
        tracklist: Vec<SongId>,
    ) -> Result<EventDetails> {
        let facts = self.permissions.facts(caller).await?;
        permission::require(permission::can_edit_tracklist(&facts), "edit tracklists")?;

        let repo = self.events.clone();
        let id = event_id.clone();
        let (event, items) = with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let event = repo
                    .get_by_id_with_executor(&id, &mut **tx)
                    .await?
                    .ok_or_else(|| Error::NotFound("event not found".to_string()))?;
                repo.replace_tracklist(&mut **tx, &id, &tracklist).await?;
                let items = repo.get_tracklist_with_executor(&id, &mut **tx).await?;
                Ok((event, items))
            })
        })
        .await
        .map_err(|e| e.with_operation("set tracklist"))?;

        Ok(compose_details(event, items, &facts))
    }
}

fn validate_fields(fields: &EventFields) -> Result<()> {
    if fields.title.trim().is_empty() {
        return Err(Error::InvalidInput("event title is required".to_string()));
    }
    Ok(())
}

fn compose_details(
    event: Event,
    tracklist: Vec<TracklistItem>,
    facts: &RoleFacts,
) -> EventDetails {
    EventDetails {
        editable_by_me: permission::can_edit_events(facts),
        tracklist_editable_by_me: permission::can_edit_tracklist(facts),
        event,
        tracklist,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{facts_with, random_user_id, test_event};

    #[test]
    fn details_flags_follow_role_facts() {
        let creator = random_user_id();
        let event = test_event(&creator, "Spring gig");

        let none = compose_details(event.clone(), Vec::new(), &RoleFacts::default());
        assert!(!none.editable_by_me);
        assert!(!none.tracklist_editable_by_me);

        let tracklist_only = compose_details(
            event.clone(),
            Vec::new(),
            &facts_with(|f| f.can_edit_tracklists = true),
        );
        assert!(!tracklist_only.editable_by_me);
        assert!(tracklist_only.tracklist_editable_by_me);

        let organizer = compose_details(event, Vec::new(), &RoleFacts::all());
        assert!(organizer.editable_by_me);
        assert!(organizer.tracklist_editable_by_me);
    }

    #[test]
    fn blank_title_is_rejected() {
        let fields = EventFields {
            title: "   ".to_string(),
            ..EventFields::default()
        };
        assert!(matches!(
            validate_fields(&fields),
            Err(Error::InvalidInput(_))
        ));
    }
}
