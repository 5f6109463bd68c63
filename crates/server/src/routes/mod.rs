//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness
//! GET  /health/ready                        - Database readiness
//!
//! # Auth
//! POST /api/auth/login                      - Email + password login (rate limited)
//! GET  /api/auth/me                         - The signed-in employee
//!
//! # Employees
//! GET|POST /api/employees                   - List / create (director)
//! GET|PUT|DELETE /api/employees/{id}        - Read / update, deactivate (director)
//!
//! # Kitchen
//! GET|PUT /api/kitchen/checklists/{type}/items
//! POST /api/kitchen/checklists/{type}/complete
//! GET  /api/kitchen/checklists/completions
//! GET|POST /api/kitchen/waste
//! GET|PUT|DELETE /api/kitchen/waste/{id}
//! GET  /api/kitchen/dashboard
//!
//! # Setup sheets
//! GET|POST /api/setup-sheets/templates
//! GET|PUT|DELETE /api/setup-sheets/templates/{id}
//! GET|POST /api/setup-sheets
//! GET  /api/setup-sheets/week               - Sheet covering a date
//! GET  /api/setup-sheets/day                - One day's schedule
//! GET|PUT|DELETE /api/setup-sheets/{id}
//!
//! # Leadership
//! GET|POST /api/leadership/360
//! GET  /api/leadership/360/assigned         - Evaluations awaiting my response
//! GET|DELETE /api/leadership/360/{id}
//! POST /api/leadership/360/{id}/raters
//! POST /api/leadership/360/{id}/responses
//! GET|POST /api/leadership/reflections
//! GET|PUT|DELETE /api/leadership/reflections/{id}
//!
//! # Documentation
//! GET|POST /api/documentation
//! GET|PUT|DELETE /api/documentation/{id}
//! POST /api/documentation/{id}/acknowledge
//!
//! # Settings
//! GET|PUT /api/settings
//! ```

pub mod auth;
pub mod documentation;
pub mod employees;
pub mod kitchen;
pub mod leadership;
pub mod settings;
pub mod setup_sheets;

use axum::Router;
use chrono::{NaiveDateTime, Utc};

use mise_core::StoreId;

use crate::db::SettingsRepository;
use crate::error::ApiResult;
use crate::models::StoreSettings;
use crate::state::AppState;

/// Build the complete API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(employees::router())
        .merge(kitchen::router())
        .merge(setup_sheets::router())
        .merge(leadership::router())
        .merge(documentation::router())
        .merge(settings::router())
}

/// The store's settings and its current local wall-clock time.
pub(crate) async fn store_clock(
    state: &AppState,
    store: StoreId,
) -> ApiResult<(StoreSettings, NaiveDateTime)> {
    let settings = SettingsRepository::new(state.pool()).get(store).await?;
    let now = settings.local_time(Utc::now());
    Ok((settings, now))
}
