//! Leadership development: 360° evaluations and reflections.

pub mod evaluations;
pub mod reflections;

use axum::Router;

use crate::state::AppState;

/// Build the leadership router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(evaluations::router())
        .merge(reflections::router())
}
