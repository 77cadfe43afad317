use sqlx::{postgres::PgRow, PgConnection, PgPool, Row};

use crate::{
    models::{
        LinkKind, RoleAssignment, Song, SongFields, SongId, SongLink, UserId,
    },
    Result,
};

/// Song repository
///
/// Role slots and role assignments belong to their song; slots are replaced
/// as a whole set, assignments are keyed (song, role, user) so joining twice
/// is a no-op at the constraint level.
#[derive(Clone)]
pub struct SongRepository {
    pool: PgPool,
}

impl SongRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new song
    pub async fn create(&self, song: &Song) -> Result<Song> {
        self.create_with_executor(song, &self.pool).await
    }

    /// Insert a new song using a provided executor (pool or transaction)
    pub async fn create_with_executor<'e, E>(&self, song: &Song, executor: E) -> Result<Song>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let row = sqlx::query(
            r"
            INSERT INTO songs (id, title, artist, description, link_kind, link_url,
                               created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, title, artist, description, link_kind, link_url,
                      created_by, created_at, updated_at
            ",
        )
        .bind(song.id.as_str())
        .bind(&song.title)
        .bind(&song.artist)
        .bind(&song.description)
        .bind(song.link.as_ref().map(|l| l.kind.as_str()))
        .bind(song.link.as_ref().map(|l| l.url.as_str()))
        .bind(song.created_by.as_ref().map(UserId::as_str))
        .bind(song.created_at)
        .bind(song.updated_at)
        .fetch_one(executor)
        .await?;

        Self::row_to_song(&row)
    }

    /// Get song by ID
    pub async fn get_by_id(&self, id: &SongId) -> Result<Option<Song>> {
        let row = sqlx::query(
            r"
            SELECT id, title, artist, description, link_kind, link_url,
                   created_by, created_at, updated_at
            FROM songs
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_song(&row)?)),
            None => Ok(None),
        }
    }

    /// Update song fields.
    ///
    /// Returns `None` when no row matched (NotFound at the service layer).
    pub async fn update_fields(&self, id: &SongId, fields: &SongFields) -> Result<Option<Song>> {
        let row = sqlx::query(
            r"
            UPDATE songs
            SET title = $2, artist = $3, description = $4, link_kind = $5, link_url = $6,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING id, title, artist, description, link_kind, link_url,
                      created_by, created_at, updated_at
            ",
        )
        .bind(id.as_str())
        .bind(&fields.title)
        .bind(&fields.artist)
        .bind(&fields.description)
        .bind(fields.link.as_ref().map(|l| l.kind.as_str()))
        .bind(fields.link.as_ref().map(|l| l.url.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_song(&row)?)),
            None => Ok(None),
        }
    }

    /// Delete a song (role slots and assignments cascade)
    pub async fn delete(&self, id: &SongId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM songs WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List songs, newest first, optionally filtered by a title/artist
    /// substring match
    pub async fn list(&self, search: Option<&str>, limit: i64, offset: i64) -> Result<Vec<Song>> {
        let search_param = search
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{q}%"));

        let where_sql = if search_param.is_some() {
            "WHERE title ILIKE $3 OR artist ILIKE $3"
        } else {
            ""
        };

        let sql = format!(
            r"
            SELECT id, title, artist, description, link_kind, link_url,
                   created_by, created_at, updated_at
            FROM songs
            {where_sql}
            ORDER BY created_at DESC, id
            LIMIT $1 OFFSET $2
            "
        );

        let mut qb = sqlx::query(&sql).bind(limit).bind(offset);
        if let Some(ref pattern) = search_param {
            qb = qb.bind(pattern.clone());
        }

        let rows = qb.fetch_all(&self.pool).await?;

        rows.iter().map(Self::row_to_song).collect()
    }

    /// Load the song's named role slots
    pub async fn get_roles(&self, song_id: &SongId) -> Result<Vec<String>> {
        let roles = sqlx::query_scalar::<_, String>(
            r"
            SELECT role
            FROM song_roles
            WHERE song_id = $1
            ORDER BY role
            ",
        )
        .bind(song_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    /// Replace the song's role slots with the given set.
    ///
    /// Must run inside the caller's transaction; delete and inserts are one
    /// unit.
    pub async fn replace_roles(
        &self,
        conn: &mut PgConnection,
        song_id: &SongId,
        roles: &[String],
    ) -> Result<()> {
        sqlx::query("DELETE FROM song_roles WHERE song_id = $1")
            .bind(song_id.as_str())
            .execute(&mut *conn)
            .await?;

        for role in roles {
            sqlx::query(
                r"
                INSERT INTO song_roles (song_id, role)
                VALUES ($1, $2)
                ON CONFLICT (song_id, role) DO NOTHING
                ",
            )
            .bind(song_id.as_str())
            .bind(role)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Sign a user up for a role. A pre-existing identical assignment is
    /// success, not an error.
    pub async fn join_role(&self, song_id: &SongId, role: &str, user_id: &UserId) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO song_role_assignments (song_id, role, user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (song_id, role, user_id) DO NOTHING
            ",
        )
        .bind(song_id.as_str())
        .bind(role)
        .bind(user_id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Load the song's role assignments
    pub async fn get_assignments(&self, song_id: &SongId) -> Result<Vec<RoleAssignment>> {
        let rows = sqlx::query(
            r"
            SELECT song_id, role, user_id
            FROM song_role_assignments
            WHERE song_id = $1
            ORDER BY role, user_id
            ",
        )
        .bind(song_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(RoleAssignment {
                    song_id: SongId::from_string(row.try_get("song_id")?),
                    role: row.try_get("role")?,
                    user_id: UserId::from_string(row.try_get("user_id")?),
                })
            })
            .collect()
    }

    fn row_to_song(row: &PgRow) -> Result<Song> {
        let link_kind: Option<String> = row.try_get("link_kind")?;
        let link_url: Option<String> = row.try_get("link_url")?;
        let link = match (link_kind, link_url) {
            (Some(kind), Some(url)) => Some(SongLink {
                kind: LinkKind::from_str_name(&kind),
                url,
            }),
            _ => None,
        };

        let created_by: Option<String> = row.try_get("created_by")?;

        Ok(Song {
            id: SongId::from_string(row.try_get("id")?),
            title: row.try_get("title")?,
            artist: row.try_get("artist")?,
            description: row.try_get("description")?,
            link,
            created_by: created_by.map(UserId::from_string),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
