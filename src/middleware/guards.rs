use std::sync::Arc;

use axum::{extract::FromRequestParts, http::header};

use crate::{
    auth::{Claims, jwt::decode_token},
    error::AppError,
    state::AppState,
};

// Auth guard: validate the bearer JWT and return its claims.
impl FromRequestParts<Arc<AppState>> for Claims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>().cloned() {
            return Ok(claims);
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::unauthorized("Missing/invalid Authorization header"))?;

        let claims = decode_token(&state.jwt, token.trim())?;
        // Reject tokens whose subject cannot scope a query before any handler runs.
        claims.owner_id()?;

        parts.extensions.insert(claims.clone());
        Ok(claims)
    }
}

pub type AuthGuard = Claims;
