use chrono::Utc;
use sqlx::PgPool;

use crate::{
    models::{
        effective_page_size, next_page_token, parse_page_token, RoleFacts, Song, SongDetails,
        SongFields, SongId, SongListQuery, SongSummary, UserId,
    },
    repository::SongRepository,
    service::permission::{self, PermissionService},
    transaction::with_transaction,
    Error, Result,
};

/// Song service: repertoire management and performance-role signup.
///
/// Role-slot replacement is a composite write; role joining is idempotent at
/// the store level so a double signup is success, not an error.
#[derive(Clone)]
pub struct SongService {
    pool: PgPool,
    songs: SongRepository,
    permissions: PermissionService,
}

impl std::fmt::Debug for SongService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SongService").finish()
    }
}

impl SongService {
    #[must_use]
    pub fn new(pool: PgPool, permissions: PermissionService) -> Self {
        Self {
            songs: SongRepository::new(pool.clone()),
            pool,
            permissions,
        }
    }

    /// Add a song with its initial role slots, as one unit.
    pub async fn create_song(
        &self,
        caller: &UserId,
        fields: SongFields,
        roles: Vec<String>,
    ) -> Result<SongDetails> {
        let facts = self.permissions.facts(caller).await?;
        // The caller becomes the creator, so the song-edit gate reduces to
        // "authenticated" here; it still runs so no mutation bypasses the
        // evaluator.
        permission::require(
            permission::can_edit_song(&facts, Some(caller), caller),
            "add songs",
        )?;
        validate_fields(&fields)?;
        let roles = normalize_roles(roles)?;

        let now = Utc::now();
        let song = Song {
            id: SongId::new(),
            title: fields.title.trim().to_string(),
            artist: fields.artist.trim().to_string(),
            description: fields.description,
            link: fields.link,
            created_by: Some(caller.clone()),
            created_at: now,
            updated_at: now,
        };

        let repo = self.songs.clone();
        let created = with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let created = repo.create_with_executor(&song, &mut **tx).await?;
                repo.replace_roles(&mut **tx, &created.id, &roles).await?;
                Ok(created)
            })
        })
        .await
        .map_err(|e| e.with_operation("create song"))?;

        tracing::info!(song_id = %created.id, user_id = %caller, "song created");

        self.load_details(created, &facts, caller).await
    }

    /// Fetch one song with roles and assignments.
    pub async fn get_song(&self, caller: Option<&UserId>, id: &SongId) -> Result<SongDetails> {
        let song = self
            .songs
            .get_by_id(id)
            .await
            .map_err(|e| e.with_operation("get song"))?
            .ok_or_else(|| Error::NotFound("song not found".to_string()))?;

        let facts = self.permissions.facts_opt(caller).await?;
        let anonymous = UserId::from_string(String::new());
        self.load_details(song, &facts, caller.unwrap_or(&anonymous))
            .await
    }

    /// List songs, newest first, with an opaque offset page token.
    pub async fn list_songs(
        &self,
        caller: Option<&UserId>,
        query: &SongListQuery,
    ) -> Result<(Vec<SongSummary>, String)> {
        let limit = effective_page_size(query.page_size);
        let offset = parse_page_token(query.page_token.as_deref());

        let songs = self
            .songs
            .list(query.query.as_deref(), limit, offset)
            .await
            .map_err(|e| e.with_operation("list songs"))?;

        let facts = self.permissions.facts_opt(caller).await?;
        let anonymous = UserId::from_string(String::new());
        let caller_id = caller.unwrap_or(&anonymous);

        let mut summaries = Vec::with_capacity(songs.len());
        for song in songs {
            let available_roles = self
                .songs
                .get_roles(&song.id)
                .await
                .map_err(|e| e.with_operation("load song roles"))?;
            summaries.push(SongSummary {
                editable_by_me: permission::can_edit_song(
                    &facts,
                    song.created_by.as_ref(),
                    caller_id,
                ),
                available_roles,
                song,
            });
        }

        let token = next_page_token(offset, limit, summaries.len());
        Ok((summaries, token))
    }

    /// Update song fields; creator or song editor only.
    pub async fn update_song(
        &self,
        caller: &UserId,
        id: &SongId,
        fields: SongFields,
    ) -> Result<SongDetails> {
        let song = self
            .songs
            .get_by_id(id)
            .await
            .map_err(|e| e.with_operation("get song"))?
            .ok_or_else(|| Error::NotFound("song not found".to_string()))?;

        let facts = self.permissions.facts(caller).await?;
        permission::require(
            permission::can_edit_song(&facts, song.created_by.as_ref(), caller),
            "edit this song",
        )?;
        validate_fields(&fields)?;

        let updated = self
            .songs
            .update_fields(id, &fields)
            .await
            .map_err(|e| e.with_operation("update song"))?
            .ok_or_else(|| Error::NotFound("song not found".to_string()))?;

        self.load_details(updated, &facts, caller).await
    }

    /// Delete a song; creator or song editor only.
    pub async fn delete_song(&self, caller: &UserId, id: &SongId) -> Result<()> {
        let song = self
            .songs
            .get_by_id(id)
            .await
            .map_err(|e| e.with_operation("get song"))?
            .ok_or_else(|| Error::NotFound("song not found".to_string()))?;

        let facts = self.permissions.facts(caller).await?;
        permission::require(
            permission::can_edit_song(&facts, song.created_by.as_ref(), caller),
            "delete this song",
        )?;

        let deleted = self
            .songs
            .delete(id)
            .await
            .map_err(|e| e.with_operation("delete song"))?;
        if !deleted {
            return Err(Error::NotFound("song not found".to_string()));
        }

        tracing::info!(song_id = %id, user_id = %caller, "song deleted");
        Ok(())
    }

    /// Sign `target` (default: the caller) up for a role on a song.
    ///
    /// Idempotent: a pre-existing identical assignment is success.
    pub async fn join_role(
        &self,
        caller: &UserId,
        song_id: &SongId,
        role: &str,
        target: Option<UserId>,
    ) -> Result<SongDetails> {
        let target = target.unwrap_or_else(|| caller.clone());

        let facts = self.permissions.facts(caller).await?;
        permission::require(
            permission::can_join_role(&facts, &target, caller),
            "join roles for other members",
        )?;

        let role = role.trim();
        if role.is_empty() {
            return Err(Error::InvalidInput("role is required".to_string()));
        }

        let song = self
            .songs
            .get_by_id(song_id)
            .await
            .map_err(|e| e.with_operation("get song"))?
            .ok_or_else(|| Error::NotFound("song not found".to_string()))?;

        let available = self
            .songs
            .get_roles(song_id)
            .await
            .map_err(|e| e.with_operation("load song roles"))?;
        if !available.iter().any(|r| r == role) {
            return Err(Error::InvalidInput(format!(
                "song has no role named {role}"
            )));
        }

        self.songs
            .join_role(song_id, role, &target)
            .await
            .map_err(|e| e.with_operation("join role"))?;

        tracing::info!(song_id = %song_id, user_id = %target, role, "role joined");

        self.load_details(song, &facts, caller).await
    }

    /// Replace the song's role slots with the given set, as one unit.
    pub async fn replace_song_roles(
        &self,
        caller: &UserId,
        song_id: &SongId,
        roles: Vec<String>,
    ) -> Result<SongDetails> {
        let song = self
            .songs
            .get_by_id(song_id)
            .await
            .map_err(|e| e.with_operation("get song"))?
            .ok_or_else(|| Error::NotFound("song not found".to_string()))?;

        let facts = self.permissions.facts(caller).await?;
        permission::require(
            permission::can_edit_song(&facts, song.created_by.as_ref(), caller),
            "edit this song's roles",
        )?;
        let roles = normalize_roles(roles)?;

        let repo = self.songs.clone();
        let id = song_id.clone();
        with_transaction(&self.pool, move |tx| {
            Box::pin(async move { repo.replace_roles(&mut **tx, &id, &roles).await })
        })
        .await
        .map_err(|e| e.with_operation("replace song roles"))?;

        self.load_details(song, &facts, caller).await
    }

    async fn load_details(
        &self,
        song: Song,
        facts: &RoleFacts,
        caller: &UserId,
    ) -> Result<SongDetails> {
        let available_roles = self
            .songs
            .get_roles(&song.id)
            .await
            .map_err(|e| e.with_operation("load song roles"))?;
        let assignments = self
            .songs
            .get_assignments(&song.id)
            .await
            .map_err(|e| e.with_operation("load role assignments"))?;

        Ok(SongDetails {
            editable_by_me: permission::can_edit_song(facts, song.created_by.as_ref(), caller),
            available_roles,
            assignments,
            song,
        })
    }
}

fn validate_fields(fields: &SongFields) -> Result<()> {
    if fields.title.trim().is_empty() {
        return Err(Error::InvalidInput("song title is required".to_string()));
    }
    Ok(())
}

/// Trim role names, drop empties, reject duplicates.
fn normalize_roles(roles: Vec<String>) -> Result<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(roles.len());
    for role in roles {
        let role = role.trim().to_string();
        if role.is_empty() {
            continue;
        }
        if normalized.contains(&role) {
            return Err(Error::InvalidInput(format!("duplicate role: {role}")));
        }
        normalized.push(role);
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_is_rejected() {
        let fields = SongFields {
            title: String::new(),
            ..SongFields::default()
        };
        assert!(matches!(
            validate_fields(&fields),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn roles_are_trimmed_and_deduplicated() {
        let roles = normalize_roles(vec![
            " vocals ".to_string(),
            "drums".to_string(),
            String::new(),
        ])
        .unwrap();
        assert_eq!(roles, vec!["vocals".to_string(), "drums".to_string()]);

        let err = normalize_roles(vec!["vocals".to_string(), " vocals".to_string()]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(msg) if msg.contains("duplicate")));
    }
}
