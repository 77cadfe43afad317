//! Service initialization and dependency injection

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crate::{
    repository::RoleFactsRepository,
    service::{
        EventService, IdentityService, JoinRequestService, JwtService, PermissionService,
        SessionService, SongService, UserService,
    },
    Config,
};

/// Container for all initialized services
#[derive(Clone)]
pub struct Services {
    /// Identity resolution (chat identity -> internal user)
    pub identity_service: Arc<IdentityService>,
    /// Access/refresh credential issuance and exchange
    pub session_service: Arc<SessionService>,
    /// Community join-invitation coordination
    pub join_request_service: Arc<JoinRequestService>,
    /// Profile lookups
    pub user_service: Arc<UserService>,
    /// Event + tracklist composite writes
    pub event_service: Arc<EventService>,
    /// Song + role composite writes
    pub song_service: Arc<SongService>,
    /// Role-fact loading for permission decisions
    pub permission_service: PermissionService,
    /// Access token signing/verification
    pub jwt_service: JwtService,
}

/// Initialize all core services
pub fn init_services(pool: PgPool, config: &Config) -> Result<Services, anyhow::Error> {
    info!("Initializing services...");

    let jwt_service = JwtService::new(
        config.jwt.secret.as_bytes(),
        config.jwt.access_token_duration_minutes,
    )?;

    let permission_service = PermissionService::new(RoleFactsRepository::new(pool.clone()));

    let identity_service = Arc::new(IdentityService::new(pool.clone()));
    let session_service = Arc::new(SessionService::new(
        pool.clone(),
        jwt_service.clone(),
        config.jwt.refresh_token_duration_days,
        config.jwt.rotate_refresh_on_use,
    ));
    let join_request_service = Arc::new(JoinRequestService::new(
        pool.clone(),
        config.community.chat_invite_base_url.clone(),
    ));
    let user_service = Arc::new(UserService::new(pool.clone()));
    let event_service = Arc::new(EventService::new(pool.clone(), permission_service.clone()));
    let song_service = Arc::new(SongService::new(pool, permission_service.clone()));

    info!("Services initialized");

    Ok(Services {
        identity_service,
        session_service,
        join_request_service,
        user_service,
        event_service,
        song_service,
        permission_service,
        jwt_service,
    })
}
