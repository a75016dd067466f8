use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

use super::{public, schedule};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(public::router())
        .merge(schedule::router(state))
}
