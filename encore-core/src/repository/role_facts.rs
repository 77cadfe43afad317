use sqlx::{postgres::PgRow, PgPool, Row};

use crate::{
    models::{RoleFacts, RoleFactsRecord, UserId},
    Result,
};

/// Role-fact repository
///
/// Role facts are read on every permission check; they are never cached in
/// process because membership and editing rights can change between requests.
#[derive(Clone)]
pub struct RoleFactsRepository {
    pool: PgPool,
}

impl RoleFactsRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load a user's role facts. A user without a stored row has no
    /// capabilities at all.
    pub async fn get(&self, user_id: &UserId) -> Result<RoleFacts> {
        Ok(self
            .get_record(user_id)
            .await?
            .map(|record| record.facts)
            .unwrap_or_default())
    }

    /// Load the stored record, if any.
    pub async fn get_record(&self, user_id: &UserId) -> Result<Option<RoleFactsRecord>> {
        let row = sqlx::query(
            r"
            SELECT user_id, is_member, can_edit_events, can_edit_tracklists,
                   can_edit_songs, can_manage_roles, updated_at
            FROM role_facts
            WHERE user_id = $1
            ",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    /// Insert or update a user's role facts (admin/bootstrap path).
    pub async fn upsert(&self, user_id: &UserId, facts: &RoleFacts) -> Result<RoleFactsRecord> {
        let row = sqlx::query(
            r"
            INSERT INTO role_facts (user_id, is_member, can_edit_events, can_edit_tracklists,
                                    can_edit_songs, can_manage_roles, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, CURRENT_TIMESTAMP)
            ON CONFLICT (user_id) DO UPDATE SET
                is_member = EXCLUDED.is_member,
                can_edit_events = EXCLUDED.can_edit_events,
                can_edit_tracklists = EXCLUDED.can_edit_tracklists,
                can_edit_songs = EXCLUDED.can_edit_songs,
                can_manage_roles = EXCLUDED.can_manage_roles,
                updated_at = CURRENT_TIMESTAMP
            RETURNING user_id, is_member, can_edit_events, can_edit_tracklists,
                      can_edit_songs, can_manage_roles, updated_at
            ",
        )
        .bind(user_id.as_str())
        .bind(facts.is_member)
        .bind(facts.can_edit_events)
        .bind(facts.can_edit_tracklists)
        .bind(facts.can_edit_songs)
        .bind(facts.can_manage_roles)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_record(&row)
    }

    fn row_to_record(row: &PgRow) -> Result<RoleFactsRecord> {
        Ok(RoleFactsRecord {
            user_id: UserId::from_string(row.try_get("user_id")?),
            facts: RoleFacts {
                is_member: row.try_get("is_member")?,
                can_edit_events: row.try_get("can_edit_events")?,
                can_edit_tracklists: row.try_get("can_edit_tracklists")?,
                can_edit_songs: row.try_get("can_edit_songs")?,
                can_manage_roles: row.try_get("can_manage_roles")?,
            },
            updated_at: row.try_get("updated_at")?,
        })
    }
}
