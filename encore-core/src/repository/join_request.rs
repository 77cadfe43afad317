use sqlx::{postgres::PgRow, PgPool, Row};

use crate::{
    models::{generate_id, JoinRequest, UserId},
    Error, Result,
};

/// Join-request repository
///
/// The unique constraint on `user_id` is the race-safety mechanism: under
/// concurrent `ensure` calls exactly one INSERT wins and everyone re-reads
/// the surviving row.
#[derive(Clone)]
pub struct JoinRequestRepository {
    pool: PgPool,
}

impl JoinRequestRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Return the user's active join request, creating one with the given
    /// token candidate if none exists. The stored token is returned either
    /// way: a second call never mints a second token.
    pub async fn ensure(&self, user_id: &UserId, token_candidate: &str) -> Result<JoinRequest> {
        let inserted = sqlx::query(
            r"
            INSERT INTO join_requests (id, user_id, token, created_at)
            VALUES ($1, $2, $3, CURRENT_TIMESTAMP)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING id, user_id, token, created_at
            ",
        )
        .bind(generate_id())
        .bind(user_id.as_str())
        .bind(token_candidate)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Self::row_to_request(&row);
        }

        // Conflict: another request (or a concurrent call) already holds the
        // row; re-read it.
        self.get_by_user(user_id).await?.ok_or_else(|| {
            Error::Internal("join request vanished between insert and re-read".to_string())
        })
    }

    /// Get the active join request for a user, if any
    pub async fn get_by_user(&self, user_id: &UserId) -> Result<Option<JoinRequest>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, token, created_at
            FROM join_requests
            WHERE user_id = $1
            ",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_request(&row)?)),
            None => Ok(None),
        }
    }

    /// Delete a user's join request (called when membership is granted)
    pub async fn delete_by_user(&self, user_id: &UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM join_requests WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    fn row_to_request(row: &PgRow) -> Result<JoinRequest> {
        Ok(JoinRequest {
            id: row.try_get("id")?,
            user_id: UserId::from_string(row.try_get("user_id")?),
            token: row.try_get("token")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
