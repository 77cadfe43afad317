// Song and performance-role HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use encore_core::models::{
    SongDetails, SongFields, SongId, SongLink, SongListQuery, SongSummary, UserId,
};

use super::{
    middleware::{AuthUser, OptionalAuthUser},
    AppResult, AppState,
};

/// Search + pagination parameters for song listing
#[derive(Debug, Deserialize)]
pub struct ListSongsParams {
    pub query: Option<String>,
    pub page_size: Option<i64>,
    pub page_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListSongsResponse {
    pub songs: Vec<SongSummary>,
    /// Opaque token for the next page; empty when the listing is exhausted
    pub next_page_token: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSongRequest {
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub description: String,
    pub link: Option<SongLink>,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSongRequest {
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub description: String,
    pub link: Option<SongLink>,
}

#[derive(Debug, Deserialize)]
pub struct JoinRoleRequest {
    pub role: String,
    /// Role admins may sign up another member; defaults to the caller
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceRolesRequest {
    pub roles: Vec<String>,
}

/// List songs, newest first, with an opaque offset page token
pub async fn list_songs(
    auth: OptionalAuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListSongsParams>,
) -> AppResult<Json<ListSongsResponse>> {
    let query = SongListQuery {
        query: params.query,
        page_size: params.page_size,
        page_token: params.page_token,
    };

    let (songs, next_page_token) = state
        .song_service
        .list_songs(auth.0.as_ref(), &query)
        .await?;

    Ok(Json(ListSongsResponse {
        songs,
        next_page_token,
    }))
}

/// Fetch one song with roles and assignments
pub async fn get_song(
    auth: OptionalAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<SongDetails>> {
    let details = state
        .song_service
        .get_song(auth.0.as_ref(), &SongId::from_string(id))
        .await?;

    Ok(Json(details))
}

/// Add a song with its initial role slots
pub async fn create_song(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateSongRequest>,
) -> AppResult<Json<SongDetails>> {
    let fields = SongFields {
        title: req.title,
        artist: req.artist,
        description: req.description,
        link: req.link,
    };

    let details = state
        .song_service
        .create_song(&auth.user_id, fields, req.roles)
        .await?;

    Ok(Json(details))
}

/// Update song fields; creator or song editor only
pub async fn update_song(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSongRequest>,
) -> AppResult<Json<SongDetails>> {
    let fields = SongFields {
        title: req.title,
        artist: req.artist,
        description: req.description,
        link: req.link,
    };

    let details = state
        .song_service
        .update_song(&auth.user_id, &SongId::from_string(id), fields)
        .await?;

    Ok(Json(details))
}

/// Delete a song; creator or song editor only
pub async fn delete_song(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state
        .song_service
        .delete_song(&auth.user_id, &SongId::from_string(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Sign up for a performance role (idempotent)
pub async fn join_role(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<JoinRoleRequest>,
) -> AppResult<Json<SongDetails>> {
    let target = req.user_id.map(UserId::from_string);

    let details = state
        .song_service
        .join_role(&auth.user_id, &SongId::from_string(id), &req.role, target)
        .await?;

    Ok(Json(details))
}

/// Replace the song's role slots with the given set
pub async fn replace_roles(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReplaceRolesRequest>,
) -> AppResult<Json<SongDetails>> {
    let details = state
        .song_service
        .replace_song_roles(&auth.user_id, &SongId::from_string(id), req.roles)
        .await?;

    Ok(Json(details))
}
