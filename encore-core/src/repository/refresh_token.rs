use sqlx::{postgres::PgRow, PgPool, Row};

use crate::{
    models::{generate_id, RefreshCredential, UserId},
    Result,
};

/// Refresh credential repository
///
/// Stores the long-lived half of a session. Tokens are consumed atomically
/// on exchange so a replayed token can never mint a second session.
#[derive(Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new refresh credential
    pub async fn create(&self, credential: &RefreshCredential) -> Result<RefreshCredential> {
        self.create_with_executor(credential, &self.pool).await
    }

    /// Persist a new refresh credential using a provided executor
    /// (pool or transaction)
    pub async fn create_with_executor<'e, E>(
        &self,
        credential: &RefreshCredential,
        executor: E,
    ) -> Result<RefreshCredential>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let row = sqlx::query(
            r"
            INSERT INTO refresh_tokens (id, user_id, token, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, token, expires_at, created_at
            ",
        )
        .bind(&credential.id)
        .bind(credential.user_id.as_str())
        .bind(&credential.token)
        .bind(credential.expires_at)
        .bind(credential.created_at)
        .fetch_one(executor)
        .await?;

        Self::row_to_credential(&row)
    }

    /// Atomically validate and consume a refresh token.
    ///
    /// In a single DELETE, checks that the token exists and has not expired;
    /// the row is gone afterwards, which is what makes rotation replay-safe.
    /// Returns `None` when the token is unknown, already consumed, or expired.
    pub async fn consume_with_executor<'e, E>(
        &self,
        token: &str,
        executor: E,
    ) -> Result<Option<RefreshCredential>>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let row = sqlx::query(
            r"
            DELETE FROM refresh_tokens
            WHERE token = $1
              AND expires_at > CURRENT_TIMESTAMP
            RETURNING id, user_id, token, expires_at, created_at
            ",
        )
        .bind(token)
        .fetch_optional(executor)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_credential(&row)?)),
            None => Ok(None),
        }
    }

    /// Remove expired rows (maintenance)
    pub async fn delete_expired(&self) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= CURRENT_TIMESTAMP")
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    fn row_to_credential(row: &PgRow) -> Result<RefreshCredential> {
        Ok(RefreshCredential {
            id: row.try_get("id")?,
            user_id: UserId::from_string(row.try_get("user_id")?),
            token: row.try_get("token")?,
            expires_at: row.try_get("expires_at")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Build an unsaved credential row for a user.
#[must_use]
pub fn new_credential(
    user_id: UserId,
    token: String,
    expires_at: chrono::DateTime<chrono::Utc>,
) -> RefreshCredential {
    RefreshCredential {
        id: generate_id(),
        user_id,
        token,
        expires_at,
        created_at: chrono::Utc::now(),
    }
}
