use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::{info, instrument, warn};

use super::{
    calculator::{self, BodyMetrics, BodyMetricsInput},
    dto::{
        activity_level, BodyAnalysisRequest, BodyMetricsReport, BodyMetricsUpdateRequest,
        CalculateQuery, CalculatedValue,
    },
};
use crate::{
    auth::{repo_types::MetricsUpdate, AuthUser},
    dates::{age_on, today_utc},
    error::{ApiError, ApiResponse, ApiResult, AppJson, AppQuery},
    state::AppState,
    validation::Checker,
};

/// Calculator endpoints; no authentication required.
pub fn calculator_routes() -> Router<AppState> {
    Router::new()
        .route("/body-analysis/analyze", post(analyze_body))
        .route("/calculate/bmi", get(calculate_bmi))
        .route("/calculate/bmr", get(calculate_bmr))
        .route("/calculate/daily-calories", get(calculate_daily_calories))
        .route("/calculate/body-fat", get(calculate_body_fat))
        .route("/calculate/ideal-weight", get(calculate_ideal_weight))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/me/body-metrics", post(update_body_metrics))
}

fn calculated(value: serde_json::Value, unit: &'static str) -> ApiResponse<CalculatedValue> {
    ApiResponse::data(CalculatedValue { value, unit })
}

#[instrument(skip(payload))]
pub async fn analyze_body(
    AppJson(payload): AppJson<BodyAnalysisRequest>,
) -> ApiResult<ApiResponse<BodyMetrics>> {
    let input = payload.validate()?;
    Ok(ApiResponse::data(calculator::analyze(&input)))
}

#[instrument(skip(q))]
pub async fn calculate_bmi(
    AppQuery(q): AppQuery<CalculateQuery>,
) -> ApiResult<ApiResponse<CalculatedValue>> {
    let (weight, height) = q.bmi_params()?;
    Ok(calculated(json!(calculator::bmi(weight, height)), "kg/m²"))
}

#[instrument(skip(q))]
pub async fn calculate_bmr(
    AppQuery(q): AppQuery<CalculateQuery>,
) -> ApiResult<ApiResponse<CalculatedValue>> {
    let (weight, height, age, gender) = q.bmr_params()?;
    Ok(calculated(
        json!(calculator::bmr(weight, height, age, gender)),
        "kcal/day",
    ))
}

#[instrument(skip(q))]
pub async fn calculate_daily_calories(
    AppQuery(q): AppQuery<CalculateQuery>,
) -> ApiResult<ApiResponse<CalculatedValue>> {
    let (bmr, level) = q.daily_calories_params()?;
    Ok(calculated(
        json!(calculator::daily_calories(bmr, level)),
        "kcal/day",
    ))
}

#[instrument(skip(q))]
pub async fn calculate_body_fat(
    AppQuery(q): AppQuery<CalculateQuery>,
) -> ApiResult<ApiResponse<CalculatedValue>> {
    let (bmi, age, gender) = q.body_fat_params()?;
    Ok(calculated(
        json!(calculator::body_fat_percentage(bmi, age, gender)),
        "%",
    ))
}

#[instrument(skip(q))]
pub async fn calculate_ideal_weight(
    AppQuery(q): AppQuery<CalculateQuery>,
) -> ApiResult<ApiResponse<CalculatedValue>> {
    let (height, gender) = q.ideal_weight_params()?;
    Ok(calculated(json!(calculator::ideal_weight(height, gender)), "kg"))
}

/// Recomputes the caller's metrics from the stored profile and saves the
/// calorie target and body fat on the user.
#[instrument(skip(state, payload))]
pub async fn update_body_metrics(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<BodyMetricsUpdateRequest>,
) -> ApiResult<ApiResponse<BodyMetricsReport>> {
    let mut c = Checker::new();
    let level = activity_level(&mut c, payload.activity_level.as_deref());
    c.finish()?;
    let level = level.ok_or_else(|| ApiError::BadRequest("activityLevel is required".into()))?;

    let user = state.users.find_by_id(user_id).await?.ok_or_else(|| {
        warn!(%user_id, "user not found");
        ApiError::Unauthorized("User not found".into())
    })?;

    let age = age_on(user.birth_date, today_utc());
    if age <= 0 {
        return Err(ApiError::BadRequest(
            "birthDate must be at least one year in the past".into(),
        ));
    }

    let metrics = calculator::analyze(&BodyMetricsInput {
        height_cm: user.height_cm,
        weight_kg: user.weight_kg,
        age: age as u32,
        gender: user.gender,
        activity_level: level,
    });

    let user = state
        .users
        .update_metrics(
            user_id,
            MetricsUpdate {
                activity_level: level,
                daily_calorie_target: i32::try_from(metrics.daily_calories)
                    .map_err(|e| ApiError::Internal(e.into()))?,
                body_fat_percent: metrics.body_fat_percentage,
            },
        )
        .await?;

    info!(%user_id, daily_calories = metrics.daily_calories, "body metrics updated");
    Ok(ApiResponse::data(BodyMetricsReport { metrics, user }).with_message("Body metrics updated"))
}
