use sqlx::{postgres::PgRow, PgConnection, PgPool, Row};

use crate::{
    models::{Event, EventFields, EventId, EventListQuery, SongId, TracklistItem, UserId},
    Result,
};

/// Event repository
///
/// Tracklist rows belong to their event and are only ever replaced as a
/// whole set inside the caller's transaction.
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an event using a provided executor (pool or transaction)
    pub async fn create_with_executor<'e, E>(&self, event: &Event, executor: E) -> Result<Event>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let row = sqlx::query(
            r"
            INSERT INTO events (id, title, start_at, location, notify_day_before,
                                notify_hour_before, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, title, start_at, location, notify_day_before, notify_hour_before,
                      created_by, created_at, updated_at
            ",
        )
        .bind(event.id.as_str())
        .bind(&event.title)
        .bind(event.start_at)
        .bind(event.location.as_ref())
        .bind(event.notify_day_before)
        .bind(event.notify_hour_before)
        .bind(event.created_by.as_str())
        .bind(event.created_at)
        .bind(event.updated_at)
        .fetch_one(executor)
        .await?;

        Self::row_to_event(&row)
    }

    /// Get event by ID
    pub async fn get_by_id(&self, id: &EventId) -> Result<Option<Event>> {
        self.get_by_id_with_executor(id, &self.pool).await
    }

    /// Get event by ID using a provided executor (pool or transaction)
    pub async fn get_by_id_with_executor<'e, E>(
        &self,
        id: &EventId,
        executor: E,
    ) -> Result<Option<Event>>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let row = sqlx::query(
            r"
            SELECT id, title, start_at, location, notify_day_before, notify_hour_before,
                   created_by, created_at, updated_at
            FROM events
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(executor)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_event(&row)?)),
            None => Ok(None),
        }
    }

    /// Update scalar event fields.
    ///
    /// Returns `None` when no row matched, which callers must surface as
    /// NotFound: distinct from a successful no-op update.
    pub async fn update_fields(
        &self,
        id: &EventId,
        fields: &EventFields,
    ) -> Result<Option<Event>> {
        let row = sqlx::query(
            r"
            UPDATE events
            SET title = $2, start_at = $3, location = $4, notify_day_before = $5,
                notify_hour_before = $6, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING id, title, start_at, location, notify_day_before, notify_hour_before,
                      created_by, created_at, updated_at
            ",
        )
        .bind(id.as_str())
        .bind(&fields.title)
        .bind(fields.start_at)
        .bind(fields.location.as_ref())
        .bind(fields.notify_day_before)
        .bind(fields.notify_hour_before)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_event(&row)?)),
            None => Ok(None),
        }
    }

    /// Delete an event (tracklist rows cascade)
    pub async fn delete(&self, id: &EventId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List events in a time window, start time ascending, unscheduled last
    pub async fn list(&self, query: &EventListQuery) -> Result<Vec<Event>> {
        let mut clauses = Vec::new();
        let mut param_idx = 1u32;

        if query.from.is_some() {
            clauses.push(format!("start_at >= ${param_idx}"));
            param_idx += 1;
        }
        if query.to.is_some() {
            clauses.push(format!("start_at <= ${param_idx}"));
            param_idx += 1;
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            r"
            SELECT id, title, start_at, location, notify_day_before, notify_hour_before,
                   created_by, created_at, updated_at
            FROM events
            {where_sql}
            ORDER BY start_at ASC NULLS LAST, id
            LIMIT ${param_idx}
            "
        );

        let mut qb = sqlx::query(&sql);
        if let Some(from) = query.from {
            qb = qb.bind(from);
        }
        if let Some(to) = query.to {
            qb = qb.bind(to);
        }
        qb = qb.bind(query.effective_limit());

        let rows = qb.fetch_all(&self.pool).await?;

        rows.iter().map(Self::row_to_event).collect()
    }

    /// Replace the event's tracklist with the given ordered set.
    ///
    /// Must run inside the caller's transaction: the delete and the inserts
    /// are one unit, and positions are renumbered 0..n so the stored
    /// sequence never has gaps or duplicates.
    pub async fn replace_tracklist(
        &self,
        conn: &mut PgConnection,
        event_id: &EventId,
        songs: &[SongId],
    ) -> Result<()> {
        sqlx::query("DELETE FROM tracklist_entries WHERE event_id = $1")
            .bind(event_id.as_str())
            .execute(&mut *conn)
            .await?;

        for (position, song_id) in songs.iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO tracklist_entries (event_id, position, song_id)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(event_id.as_str())
            .bind(position as i32)
            .bind(song_id.as_str())
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Load the event's tracklist in order, joined with song metadata
    pub async fn get_tracklist_with_executor<'e, E>(
        &self,
        event_id: &EventId,
        executor: E,
    ) -> Result<Vec<TracklistItem>>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let rows = sqlx::query(
            r"
            SELECT t.position, t.song_id, s.title, s.artist
            FROM tracklist_entries t
            JOIN songs s ON s.id = t.song_id
            WHERE t.event_id = $1
            ORDER BY t.position ASC
            ",
        )
        .bind(event_id.as_str())
        .fetch_all(executor)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(TracklistItem {
                    position: row.try_get("position")?,
                    song_id: SongId::from_string(row.try_get("song_id")?),
                    title: row.try_get("title")?,
                    artist: row.try_get("artist")?,
                })
            })
            .collect()
    }

    /// Load the event's tracklist in order
    pub async fn get_tracklist(&self, event_id: &EventId) -> Result<Vec<TracklistItem>> {
        self.get_tracklist_with_executor(event_id, &self.pool).await
    }

    fn row_to_event(row: &PgRow) -> Result<Event> {
        Ok(Event {
            id: EventId::from_string(row.try_get("id")?),
            title: row.try_get("title")?,
            start_at: row.try_get("start_at")?,
            location: row.try_get("location")?,
            notify_day_before: row.try_get("notify_day_before")?,
            notify_hour_before: row.try_get("notify_hour_before")?,
            created_by: UserId::from_string(row.try_get("created_by")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
