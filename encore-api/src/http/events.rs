// Event and tracklist HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use encore_core::models::{
    EventDetails, EventFields, EventId, EventListQuery, EventSummary, SongId,
};

use super::{
    middleware::{AuthUser, OptionalAuthUser},
    AppResult, AppState,
};

/// Time-window filter accepted by the listing endpoint
#[derive(Debug, Deserialize)]
pub struct ListEventsParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListEventsResponse {
    pub events: Vec<EventSummary>,
}

/// Create event request: scalar fields plus the initial ordered tracklist
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub start_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    #[serde(default)]
    pub notify_day_before: bool,
    #[serde(default)]
    pub notify_hour_before: bool,
    #[serde(default)]
    pub tracklist: Vec<String>,
}

/// Update event request: scalar fields only, the tracklist has its own
/// endpoint
#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub title: String,
    pub start_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    #[serde(default)]
    pub notify_day_before: bool,
    #[serde(default)]
    pub notify_hour_before: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetTracklistRequest {
    pub tracklist: Vec<String>,
}

/// List events in a time window, start time ascending, unscheduled last
pub async fn list_events(
    auth: OptionalAuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListEventsParams>,
) -> AppResult<Json<ListEventsResponse>> {
    let query = EventListQuery {
        from: params.from,
        to: params.to,
        limit: params.limit,
    };

    let events = state
        .event_service
        .list_events(auth.0.as_ref(), &query)
        .await?;

    Ok(Json(ListEventsResponse { events }))
}

/// Fetch one event with its ordered tracklist
pub async fn get_event(
    auth: OptionalAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<EventDetails>> {
    let details = state
        .event_service
        .get_event(auth.0.as_ref(), &EventId::from_string(id))
        .await?;

    Ok(Json(details))
}

/// Create an event together with its initial tracklist
pub async fn create_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> AppResult<Json<EventDetails>> {
    let fields = EventFields {
        title: req.title,
        start_at: req.start_at,
        location: req.location,
        notify_day_before: req.notify_day_before,
        notify_hour_before: req.notify_hour_before,
    };
    let tracklist: Vec<SongId> = req.tracklist.into_iter().map(SongId::from_string).collect();

    let details = state
        .event_service
        .create_event(&auth.user_id, fields, tracklist)
        .await?;

    Ok(Json(details))
}

/// Update scalar event fields
pub async fn update_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateEventRequest>,
) -> AppResult<Json<EventDetails>> {
    let fields = EventFields {
        title: req.title,
        start_at: req.start_at,
        location: req.location,
        notify_day_before: req.notify_day_before,
        notify_hour_before: req.notify_hour_before,
    };

    let details = state
        .event_service
        .update_event(&auth.user_id, &EventId::from_string(id), fields)
        .await?;

    Ok(Json(details))
}

/// Delete an event and its tracklist
pub async fn delete_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state
        .event_service
        .delete_event(&auth.user_id, &EventId::from_string(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Replace the event's tracklist with the given ordered set
pub async fn set_tracklist(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetTracklistRequest>,
) -> AppResult<Json<EventDetails>> {
    let tracklist: Vec<SongId> = req.tracklist.into_iter().map(SongId::from_string).collect();

    let details = state
        .event_service
        .set_tracklist(&auth.user_id, &EventId::from_string(id), tracklist)
        .await?;

    Ok(Json(details))
}
