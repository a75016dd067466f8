use std::sync::Arc;

use axum::{Router, middleware};
use sea_orm::DatabaseConnection;

use crate::{
    auth::jwt::{JwtKeys, encode_token, make_access_claims},
    config::AppConfig,
    middleware::{catch_panic_layer, json_error_middleware},
    routes::router,
    state::AppState,
};

/// Full router over `db` with the production error layers, signing with `secret`.
pub fn test_router(secret: &[u8], db: DatabaseConnection) -> Router {
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_secret = String::from_utf8_lossy(secret).into_owned();
    let state = AppState::new(cfg, db);
    router(Arc::clone(&state))
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
}

/// `Authorization` header value for `owner_id`.
pub fn bearer_for(secret: &[u8], owner_id: i32) -> String {
    let claims = make_access_claims(owner_id, 3600);
    match encode_token(&JwtKeys::from_secret(secret), &claims) {
        Ok(token) => format!("Bearer {token}"),
        Err(err) => panic!("test token should encode: {err}"),
    }
}
