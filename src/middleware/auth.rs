use axum::{
    extract::{FromRequestParts, Query},
    http::{header, request::Parts},
};
use serde::Deserialize;

use orar_auth::verify_token;
use orar_core::AppError;
use orar_models::ids::UserId;
use orar_models::users::{Principal, UserRole};

use crate::state::AppState;

/// Extractor that validates the bearer JWT and yields the caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl AuthUser {
    pub fn principal(&self) -> &Principal {
        &self.0
    }

    pub fn user_id(&self) -> UserId {
        self.0.id
    }

    pub fn role(&self) -> UserRole {
        self.0.role
    }

    fn from_token(token: &str, state: &AppState) -> Result<Self, AppError> {
        let claims = verify_token(token, &state.jwt_config)?;
        Ok(AuthUser(claims.principal()?))
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid authorization header"))?;
    value
        .strip_prefix("Bearer ")
        .map(Some)
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        AuthUser::from_token(token, state)
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Authentication for event streams.
///
/// Browsers cannot attach headers to an `EventSource`, so a `?token=` query
/// parameter is accepted when no `Authorization` header is present.
#[derive(Debug, Clone)]
pub struct StreamUser(pub AuthUser);

impl FromRequestParts<AppState> for StreamUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(token) = bearer_token(parts)? {
            return AuthUser::from_token(token, state).map(StreamUser);
        }

        let Query(query) = Query::<TokenQuery>::try_from_uri(&parts.uri)
            .map_err(|_| AppError::unauthorized("Invalid query string"))?;
        let token = query
            .token
            .ok_or_else(|| AppError::unauthorized("Missing authorization token"))?;

        AuthUser::from_token(&token, state).map(StreamUser)
    }
}
