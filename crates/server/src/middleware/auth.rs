//! Bearer token extractors.
//!
//! ```rust,ignore
//! async fn handler(RequireLeader(user): RequireLeader) -> impl IntoResponse {
//!     format!("Hello, {}!", user.name)
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, set_sentry_user};
use crate::models::CurrentUser;
use crate::services::auth::JwtService;
use crate::state::AppState;

/// Requires a valid bearer token. Rejects with 401.
pub struct RequireAuth(pub CurrentUser);

/// Requires a leader or director. Rejects with 401, then 403.
pub struct RequireLeader(pub CurrentUser);

/// Requires a director. Rejects with 401, then 403.
pub struct RequireDirector(pub CurrentUser);

fn authenticate(parts: &mut Parts, state: &AppState) -> Result<CurrentUser, AppError> {
    if let Some(user) = parts.extensions.get::<CurrentUser>() {
        return Ok(user.clone());
    }

    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))?;
    let token = JwtService::extract_from_header(header)
        .ok_or_else(|| AppError::Unauthorized("malformed authorization header".to_owned()))?;

    let user = state.jwt().current_user(token).map_err(|e| {
        tracing::debug!(error = %e, uri = %parts.uri, "Bearer token rejected");
        AppError::from(e)
    })?;

    set_sentry_user(user.id.as_i32(), None);
    parts.extensions.insert(user.clone());
    Ok(user)
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).map(Self)
    }
}

impl FromRequestParts<AppState> for RequireLeader {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state)?;
        if !user.is_leader() {
            return Err(AppError::Forbidden("leader access required".to_owned()));
        }
        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for RequireDirector {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state)?;
        if !user.is_director() {
            return Err(AppError::Forbidden("director access required".to_owned()));
        }
        Ok(Self(user))
    }
}
