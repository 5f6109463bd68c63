//! Kitchen operations: shift checklists, waste tracking and the dashboard.

pub mod checklists;
pub mod dashboard;
pub mod waste;

use axum::Router;

use crate::state::AppState;

/// Build the kitchen router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(checklists::router())
        .merge(waste::router())
        .merge(dashboard::router())
}
