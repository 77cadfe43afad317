// HTTP middleware: bearer-token authentication extractors

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use encore_core::models::UserId;

use super::{AppError, AppState};

/// Authenticated caller extracted from the Authorization header.
///
/// The transport attaches the resolved identity to the request; handlers
/// never parse tokens themselves.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
}

/// Caller identity for endpoints that also serve anonymous readers.
///
/// A missing Authorization header yields `None`; a present-but-invalid
/// token is still rejected.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<UserId>);

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(header) = parts.headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = header
        .to_str()
        .map_err(|e| AppError::unauthorized(format!("Invalid Authorization header: {e}")))?;

    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .ok_or_else(|| AppError::unauthorized("Authorization header must use Bearer scheme"))?;

    Ok(Some(token))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = bearer_token(parts)?
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let claims = app_state
            .jwt_service
            .verify_access_token(token)
            .map_err(|e| AppError::unauthorized(format!("{e}")))?;

        Ok(Self {
            user_id: claims.user_id(),
        })
    }
}

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let Some(token) = bearer_token(parts)? else {
            return Ok(Self(None));
        };

        let claims = app_state
            .jwt_service
            .verify_access_token(token)
            .map_err(|e| AppError::unauthorized(format!("{e}")))?;

        Ok(Self(Some(claims.user_id())))
    }
}
