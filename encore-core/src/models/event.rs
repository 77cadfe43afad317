use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{EventId, SongId, UserId};

/// A scheduled community event (rehearsal, gig, jam night).
///
/// Owns an ordered tracklist which is always replaced as a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub start_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    /// Notify members a day before the event starts
    pub notify_day_before: bool,
    /// Notify members an hour before the event starts
    pub notify_hour_before: bool,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tracklist entry joined with its song for detail views.
///
/// The stored `tracklist_entries` rows are (event, position, song) triples;
/// they only ever surface joined like this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracklistItem {
    pub position: i32,
    pub song_id: SongId,
    pub title: String,
    pub artist: String,
}

/// An event together with its ordered tracklist and the caller's
/// edit rights. `editable_by_me` is derived at read time, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetails {
    #[serde(flatten)]
    pub event: Event,
    pub tracklist: Vec<TracklistItem>,
    pub editable_by_me: bool,
    pub tracklist_editable_by_me: bool,
}

/// Listing row: event plus the caller's edit rights, no tracklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSummary {
    #[serde(flatten)]
    pub event: Event,
    pub editable_by_me: bool,
    pub tracklist_editable_by_me: bool,
}

/// Scalar fields accepted by create/update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFields {
    pub title: String,
    pub start_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    #[serde(default)]
    pub notify_day_before: bool,
    #[serde(default)]
    pub notify_hour_before: bool,
}

/// Time-window filter for event listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventListQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

/// Default page size for event listing
pub const DEFAULT_EVENT_LIMIT: i64 = 50;

/// Maximum page size for event listing
pub const MAX_EVENT_LIMIT: i64 = 200;

impl EventListQuery {
    /// Effective LIMIT: default 50, values outside (0, 200] fall back to it.
    #[must_use]
    pub fn effective_limit(&self) -> i64 {
        match self.limit {
            Some(limit) if limit > 0 && limit <= MAX_EVENT_LIMIT => limit,
            _ => DEFAULT_EVENT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_limit_clamps_out_of_range_values() {
        assert_eq!(EventListQuery::default().effective_limit(), 50);

        let over = EventListQuery {
            limit: Some(500),
            ..EventListQuery::default()
        };
        assert_eq!(over.effective_limit(), 50);

        let zero = EventListQuery {
            limit: Some(0),
            ..EventListQuery::default()
        };
        assert_eq!(zero.effective_limit(), 50);

        let ok = EventListQuery {
            limit: Some(200),
            ..EventListQuery::default()
        };
        assert_eq!(ok.effective_limit(), 200);
    }
}
