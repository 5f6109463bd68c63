//! Store settings routes.

use axum::{Json, Router, extract::State, routing::get};
use tracing::instrument;

use crate::db::SettingsRepository;
use crate::error::{AppError, ApiResult};
use crate::extract::ApiJson;
use crate::middleware::{RequireAuth, RequireDirector};
use crate::models::StoreSettings;
use crate::state::AppState;

/// Build the settings router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/settings", get(show).put(update))
}

/// Current settings, or the defaults if none were saved.
#[instrument(skip_all, fields(store_id = %user.store_id))]
async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> ApiResult<Json<StoreSettings>> {
    let settings = SettingsRepository::new(state.pool())
        .get(user.store_id)
        .await?;
    Ok(Json(settings))
}

#[instrument(skip_all, fields(store_id = %user.store_id))]
async fn update(
    RequireDirector(user): RequireDirector,
    State(state): State<AppState>,
    ApiJson(settings): ApiJson<StoreSettings>,
) -> ApiResult<Json<StoreSettings>> {
    settings.validate().map_err(AppError::BadRequest)?;
    let saved = SettingsRepository::new(state.pool())
        .put(user.store_id, &settings, user.id)
        .await?;

    tracing::info!(updated_by = %user.id, "Store settings updated");
    Ok(Json(saved))
}
