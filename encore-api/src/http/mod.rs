// Module: http
// HTTP/JSON API surface: router, shared state, and handlers

pub mod auth;
pub mod error;
pub mod events;
pub mod health;
pub mod middleware;
pub mod songs;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use encore_core::{
    bootstrap::Services,
    service::{
        EventService, IdentityService, JoinRequestService, JwtService, SessionService,
        SongService, UserService,
    },
    Config,
};

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub identity_service: Arc<IdentityService>,
    pub session_service: Arc<SessionService>,
    pub join_request_service: Arc<JoinRequestService>,
    pub user_service: Arc<UserService>,
    pub event_service: Arc<EventService>,
    pub song_service: Arc<SongService>,
    pub jwt_service: JwtService,
}

impl AppState {
    #[must_use]
    pub fn new(services: Services, config: Config) -> Self {
        Self {
            config: Arc::new(config),
            identity_service: services.identity_service,
            session_service: services.session_service,
            join_request_service: services.join_request_service,
            user_service: services.user_service,
            event_service: services.event_service,
            song_service: services.song_service,
            jwt_service: services.jwt_service,
        }
    }
}

/// Create the HTTP router with all routes
pub fn create_router(services: Services, config: Config) -> Router {
    let request_timeout = Duration::from_secs(config.server.request_timeout_seconds);
    let state = AppState::new(services, config);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(health::healthz))
        // Auth
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/profile", get(auth::profile))
        // Events + tracklists
        .route(
            "/api/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/api/events/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/api/events/{id}/tracklist", put(events::set_tracklist))
        // Songs + roles
        .route("/api/songs", get(songs::list_songs).post(songs::create_song))
        .route(
            "/api/songs/{id}",
            get(songs::get_song)
                .put(songs::update_song)
                .delete(songs::delete_song),
        )
        .route("/api/songs/{id}/roles", put(songs::replace_roles))
        .route("/api/songs/{id}/roles/join", post(songs::join_role))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
