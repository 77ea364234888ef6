use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    analysis::{analyze, PlanAnalysis},
    dto::PlanRequest,
    model::{Plan, PlanBody},
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResponse, ApiResult, AppJson, AppPath},
    state::AppState,
};

/// CRUD and analyze routes for one plan kind, mounted at `base`.
pub fn routes<D: PlanBody>(base: &str) -> Router<AppState> {
    Router::new()
        .route(base, get(list_plans::<D>).post(create_plan::<D>))
        .route(
            &format!("{base}/:id"),
            get(get_plan::<D>)
                .put(update_plan::<D>)
                .delete(delete_plan::<D>),
        )
        .route(&format!("{base}/:id/analyze"), post(analyze_plan::<D>))
}

/// "meal plan" -> "Meal plan"
fn capitalized(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn not_found<D: PlanBody>() -> ApiError {
    ApiError::NotFound(format!("{} not found", capitalized(D::LABEL)))
}

async fn load<D: PlanBody>(state: &AppState, user_id: Uuid, id: Uuid) -> ApiResult<Plan<D>> {
    D::repo(state).get(user_id, id).await?.ok_or_else(|| {
        warn!(%user_id, plan_id = %id, kind = D::LABEL, "plan not found");
        not_found::<D>()
    })
}

#[instrument(skip(state), fields(kind = D::LABEL))]
pub async fn list_plans<D: PlanBody>(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<ApiResponse<Vec<Plan<D>>>> {
    let plans = D::repo(&state).list(user_id).await?;
    Ok(ApiResponse::plans(plans))
}

#[instrument(skip(state), fields(kind = D::LABEL))]
pub async fn get_plan<D: PlanBody>(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<ApiResponse<Plan<D>>> {
    Ok(ApiResponse::plan(load::<D>(&state, user_id, id).await?))
}

#[instrument(skip(state, payload), fields(kind = D::LABEL))]
pub async fn create_plan<D: PlanBody>(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<PlanRequest<D>>,
) -> ApiResult<(StatusCode, ApiResponse<Plan<D>>)> {
    let (title, days) = payload.validate()?;
    let plan = D::repo(&state).create(user_id, title, days).await?;
    info!(%user_id, plan_id = %plan.id, "plan created");
    Ok((
        StatusCode::CREATED,
        ApiResponse::plan(plan).with_message(format!("{} created", capitalized(D::LABEL))),
    ))
}

#[instrument(skip(state, payload), fields(kind = D::LABEL))]
pub async fn update_plan<D: PlanBody>(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<PlanRequest<D>>,
) -> ApiResult<ApiResponse<Plan<D>>> {
    let (title, days) = payload.validate()?;
    let plan = D::repo(&state)
        .update(user_id, id, title, days)
        .await?
        .ok_or_else(not_found::<D>)?;
    info!(%user_id, plan_id = %id, "plan updated");
    Ok(ApiResponse::plan(plan).with_message(format!("{} updated", capitalized(D::LABEL))))
}

#[instrument(skip(state), fields(kind = D::LABEL))]
pub async fn delete_plan<D: PlanBody>(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<ApiResponse<Value>> {
    if !D::repo(&state).delete(user_id, id).await? {
        return Err(not_found::<D>());
    }
    info!(%user_id, plan_id = %id, "plan deleted");
    Ok(ApiResponse::data(json!({ "id": id }))
        .with_message(format!("{} deleted", capitalized(D::LABEL))))
}

#[instrument(skip(state), fields(kind = D::LABEL))]
pub async fn analyze_plan<D: PlanBody>(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<ApiResponse<PlanAnalysis<D::Summary>>> {
    let plan = load::<D>(&state, user_id, id).await?;
    let analysis = analyze(state.generator.as_ref(), &plan).await?;
    Ok(ApiResponse::analysis(analysis))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::test_support::{register_user, ScriptedGenerator, TestApp};

    fn meal_plan(title: &str) -> Value {
        json!({
            "title": title,
            "days": {
                "monday": {
                    "breakfast": [{"name": "Oats", "calories": 389, "protein": 16.9, "carbs": 66.3, "fat": 6.9}],
                    "dinner": [{"name": "Salmon", "calories": 367, "protein": 40, "carbs": 0, "fat": 22}]
                },
                "thursday": {"lunch": [{"name": "Lentil soup", "calories": 180, "protein": 9, "carbs": 30, "fat": 3}]}
            }
        })
    }

    fn exercise_plan() -> Value {
        json!({
            "title": "Push pull",
            "days": {
                "monday": [{"name": "bench press", "sets": 4, "reps": 8, "durationMinutes": 15, "bodyPart": "chest", "target": "pectorals"}],
                "friday": [{"name": "deadlift", "sets": 3, "reps": 5, "durationMinutes": 20, "bodyPart": "back", "target": "glutes", "equipment": "barbell"}]
            }
        })
    }

    #[tokio::test]
    async fn meal_plan_crud_round() {
        let app = TestApp::new();
        let s = register_user(&app, "crud@example.com").await;
        let token = Some(s.token.as_str());

        let (status, body) = app.post("/api/meal-plans", token, meal_plan("Week 1")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Meal plan created");
        let id = body["plan"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["plan"]["days"]["monday"]["dinner"][0]["name"], "Salmon");

        let (_, body) = app.post("/api/meal-plans", token, meal_plan("Week 2")).await;
        let second = body["plan"]["id"].as_str().unwrap().to_string();

        let (status, body) = app.get("/api/meal-plans", token).await;
        assert_eq!(status, StatusCode::OK);
        let plans = body["plans"].as_array().unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0]["id"], second.as_str());

        let (status, body) = app
            .put(&format!("/api/meal-plans/{id}"), token, meal_plan("Week 1 revised"))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["plan"]["title"], "Week 1 revised");

        let (status, body) = app.get(&format!("/api/meal-plans/{id}"), token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["plan"]["title"], "Week 1 revised");

        let (status, _) = app.delete(&format!("/api/meal-plans/{id}"), token).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = app.delete(&format!("/api/meal-plans/{id}"), token).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Meal plan not found");
    }

    #[tokio::test]
    async fn plans_of_other_users_are_invisible() {
        let app = TestApp::new();
        let owner = register_user(&app, "owner@example.com").await;
        let other = register_user(&app, "other@example.com").await;

        let (_, body) = app
            .post("/api/exercise-plans", Some(owner.token.as_str()), exercise_plan())
            .await;
        let path = format!("/api/exercise-plans/{}", body["plan"]["id"].as_str().unwrap());
        let token = Some(other.token.as_str());

        assert_eq!(app.get(&path, token).await.0, StatusCode::NOT_FOUND);
        assert_eq!(app.put(&path, token, exercise_plan()).await.0, StatusCode::NOT_FOUND);
        assert_eq!(app.delete(&path, token).await.0, StatusCode::NOT_FOUND);
        assert_eq!(
            app.post(&format!("{path}/analyze"), token, json!({})).await.0,
            StatusCode::NOT_FOUND
        );

        let (_, body) = app.get("/api/exercise-plans", token).await;
        assert_eq!(body["plans"].as_array().unwrap().len(), 0);
        assert_eq!(app.get(&path, Some(owner.token.as_str())).await.0, StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_plan_bodies_are_rejected() {
        let app = TestApp::new();
        let s = register_user(&app, "invalid@example.com").await;
        let token = Some(s.token.as_str());

        let (status, body) = app
            .post("/api/meal-plans", token, json!({"title": " ", "days": {}}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);

        let (status, body) = app
            .post("/api/exercise-plans", token, json!({"title": "Bad", "days": {"funday": []}}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = app.get("/api/meal-plans/not-a-uuid", token).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_update_leaves_plan_untouched() {
        let app = TestApp::new();
        let s = register_user(&app, "update@example.com").await;
        let token = Some(s.token.as_str());

        let (_, body) = app.post("/api/meal-plans", token, meal_plan("Keep me")).await;
        let path = format!("/api/meal-plans/{}", body["plan"]["id"].as_str().unwrap());

        let (status, body) = app
            .put(&path, token, json!({"title": "Emptied", "days": {"monday": {}}}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "meal plan must contain at least one meal");

        let (status, body) = app.get(&path, token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["plan"]["title"], "Keep me");
        assert_eq!(body["plan"]["days"]["monday"]["breakfast"][0]["name"], "Oats");

        let (_, body) = app.post("/api/exercise-plans", token, exercise_plan()).await;
        let path = format!("/api/exercise-plans/{}", body["plan"]["id"].as_str().unwrap());
        let (status, body) = app
            .put(&path, token, json!({
                "title": "Negative",
                "days": {"monday": [{"name": "row", "sets": -2, "reps": 10}]}
            }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "days.monday[0].sets");
        let (_, body) = app.get(&path, token).await;
        assert_eq!(body["plan"]["title"], "Push pull");
    }

    #[tokio::test]
    async fn plans_require_authentication() {
        let app = TestApp::new();
        assert_eq!(app.get("/api/meal-plans", None).await.0, StatusCode::UNAUTHORIZED);
        assert_eq!(
            app.post("/api/exercise-plans", None, exercise_plan()).await.0,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn analyze_returns_summary_and_feedback() {
        let app = TestApp::with_generator(ScriptedGenerator::answering("Looks balanced."));
        let s = register_user(&app, "analyze@example.com").await;
        let token = Some(s.token.as_str());

        let (_, body) = app.post("/api/exercise-plans", token, exercise_plan()).await;
        let id = body["plan"]["id"].as_str().unwrap().to_string();

        let (status, body) = app
            .post(&format!("/api/exercise-plans/{id}/analyze"), token, json!({}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["analysis"]["feedback"], "Looks balanced.");
        let summary = &body["analysis"]["summary"];
        assert_eq!(summary["exerciseCount"], 2);
        assert_eq!(summary["totalSets"], 7);
        assert_eq!(summary["bodyParts"], json!(["back", "chest"]));
    }

    #[tokio::test]
    async fn generator_failure_is_a_server_error() {
        let app = TestApp::with_generator(ScriptedGenerator::failing("upstream down"));
        let s = register_user(&app, "fail@example.com").await;
        let token = Some(s.token.as_str());

        let (_, body) = app.post("/api/meal-plans", token, meal_plan("W")).await;
        let id = body["plan"]["id"].as_str().unwrap().to_string();

        let (status, body) = app
            .post(&format!("/api/meal-plans/{id}/analyze"), token, json!({}))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("upstream down"));
    }
}
