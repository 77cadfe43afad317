// Authentication HTTP handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use encore_core::models::{ProfileHint, RoleFacts, Session, TokenPair, User};

use super::{middleware::AuthUser, AppError, AppResult, AppState};

/// Login with a chat-platform identity
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub telegram_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

/// Refresh token exchange request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Profile response
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: User,
    pub permissions: RoleFacts,
}

/// Log in with the caller's chat-platform identity.
///
/// Creates the user on first sight and issues a session. Callers who are
/// not yet community members also get the standing join-invitation URL;
/// repeat logins return the same invitation token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<Session>> {
    if req.telegram_id == 0 {
        return Err(AppError::bad_request("telegram_id is required"));
    }

    let hint = ProfileHint {
        first_name: req.first_name,
        last_name: req.last_name,
        username: req.username,
    };

    let (user, is_member) = state
        .identity_service
        .resolve_or_create(req.telegram_id, &hint)
        .await?;

    let permissions = state.identity_service.role_facts(&user).await?;
    let tokens = state.session_service.issue(&user.id).await?;

    let join_invite_url = if is_member {
        String::new()
    } else {
        state
            .join_request_service
            .ensure_invite_url(&user.id)
            .await?
    };

    Ok(Json(Session {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        issued_at: tokens.issued_at,
        expires_at: tokens.expires_at,
        is_member,
        join_invite_url,
        profile: user,
        permissions,
    }))
}

/// Exchange a refresh token for a new access/refresh pair (rotation).
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<TokenPair>> {
    let pair = state.session_service.exchange(&req.refresh_token).await?;
    Ok(Json(pair))
}

/// Current caller's profile and permissions.
pub async fn profile(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ProfileResponse>> {
    let (profile, permissions) = state.user_service.get_profile(&auth.user_id).await?;
    Ok(Json(ProfileResponse {
        profile,
        permissions,
    }))
}
