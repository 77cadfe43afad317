use sqlx::{postgres::PgRow, PgPool, Row};

use crate::{
    models::{ProfileHint, User, UserId},
    Result,
};

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the database pool
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Resolve a chat-platform identity to a user, creating the record on
    /// first sight.
    ///
    /// Race safety comes from the unique constraint on `telegram_id`: two
    /// concurrent first-logins collapse into one INSERT and one conflicting
    /// UPDATE, both returning the same row. Profile fields from the hint are
    /// applied opportunistically; empty hints never clobber stored values.
    pub async fn upsert_by_telegram(
        &self,
        telegram_id: i64,
        profile: &ProfileHint,
    ) -> Result<User> {
        let candidate = User::new(telegram_id, profile.clone());

        let row = sqlx::query(
            r"
            INSERT INTO users (id, telegram_id, username, first_name, last_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (telegram_id) DO UPDATE SET
                username = COALESCE(EXCLUDED.username, users.username),
                first_name = CASE
                    WHEN EXCLUDED.first_name <> '' THEN EXCLUDED.first_name
                    ELSE users.first_name
                END,
                last_name = COALESCE(EXCLUDED.last_name, users.last_name),
                updated_at = CURRENT_TIMESTAMP
            RETURNING id, telegram_id, username, first_name, last_name, created_at, updated_at
            ",
        )
        .bind(candidate.id.as_str())
        .bind(candidate.telegram_id)
        .bind(candidate.username.as_ref())
        .bind(&candidate.first_name)
        .bind(candidate.last_name.as_ref())
        .bind(candidate.created_at)
        .bind(candidate.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_user(&row)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, user_id: &UserId) -> Result<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, telegram_id, username, first_name, last_name, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// Get user by chat-platform identity
    pub async fn get_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, telegram_id, username, first_name, last_name, created_at, updated_at
            FROM users
            WHERE telegram_id = $1
            ",
        )
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// Convert database row to User model
    fn row_to_user(row: &PgRow) -> Result<User> {
        Ok(User {
            id: UserId::from_string(row.try_get("id")?),
            telegram_id: row.try_get("telegram_id")?,
            username: row.try_get("username")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {

    // Repository tests require a real database; covered by the
    // service-level tests that run against a live pool.

    #[tokio::test]
    #[ignore = "Requires database"]
    async fn test_upsert_by_telegram_is_idempotent() {
        // let pool = PgPool::connect("...").await.unwrap();
        // let repo = UserRepository::new(pool);
        // let a = repo.upsert_by_telegram(42, &hint("Alice")).await.unwrap();
        // let b = repo.upsert_by_telegram(42, &hint("Alice")).await.unwrap();
        // assert_eq!(a.id, b.id);
    }
}
