use axum::{extract::State, routing::get, Router};
use time::{Duration, OffsetDateTime};
use tracing::{info, instrument, warn};

use super::{
    dto::{AddWaterRequest, DateQuery},
    repo_types::{WaterDay, WaterLogEntry},
};
use crate::{
    auth::AuthUser,
    dates::today_utc,
    error::{ApiError, ApiResponse, ApiResult, AppJson, AppQuery},
    state::AppState,
};

/// Days covered by the history view, today included.
pub const HISTORY_DAYS: i64 = 7;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/water-intake",
            get(get_water).post(add_water).delete(delete_water),
        )
        .route("/water-intake/history", get(water_history))
}

#[instrument(skip(state, payload))]
pub async fn add_water(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<AddWaterRequest>,
) -> ApiResult<ApiResponse<WaterDay>> {
    let (amount_ml, date) = payload.validate(today_utc())?;
    let entry = WaterLogEntry {
        amount_ml,
        logged_at: OffsetDateTime::now_utc(),
    };
    let day = state.water.add(user_id, date, entry).await?;
    info!(%user_id, %date, amount_ml, total_ml = day.total_ml, "water logged");
    Ok(ApiResponse::data(day.into()).with_message("Water intake recorded"))
}

#[instrument(skip(state))]
pub async fn get_water(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppQuery(query): AppQuery<DateQuery>,
) -> ApiResult<ApiResponse<WaterDay>> {
    let date = query.resolve(today_utc())?;
    let day = state
        .water
        .get(user_id, date)
        .await?
        .map(WaterDay::from)
        .unwrap_or_else(|| WaterDay::empty(date));
    Ok(ApiResponse::data(day))
}

#[instrument(skip(state))]
pub async fn water_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<ApiResponse<Vec<WaterDay>>> {
    let today = today_utc();
    let from = today - Duration::days(HISTORY_DAYS - 1);
    let days = state.water.list_between(user_id, from, today).await?;
    Ok(ApiResponse::data(days.into_iter().map(WaterDay::from).collect()))
}

#[instrument(skip(state))]
pub async fn delete_water(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppQuery(query): AppQuery<DateQuery>,
) -> ApiResult<ApiResponse<WaterDay>> {
    let date = query.resolve(today_utc())?;
    if !state.water.delete(user_id, date).await? {
        warn!(%user_id, %date, "no water intake to delete");
        return Err(ApiError::NotFound("Water intake not found".into()));
    }
    info!(%user_id, %date, "water intake deleted");
    Ok(ApiResponse::data(WaterDay::empty(date)).with_message("Water intake deleted"))
}
