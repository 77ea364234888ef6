use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo_types::{NewUser, User},
    },
    error::{ApiError, ApiResponse, ApiResult, AppJson},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn issue_tokens(state: &AppState, user: User, message: &str) -> ApiResult<AuthResponse> {
    let keys = JwtKeys::from_ref(state);
    let token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;
    Ok(AuthResponse {
        success: true,
        message: message.into(),
        token,
        refresh_token,
        user,
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let reg = payload.validate()?;

    if state.users.find_by_email(&reg.email).await?.is_some() {
        warn!(email = %reg.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&reg.password)?;
    let user = state
        .users
        .create(NewUser {
            email: reg.email,
            password_hash,
            first_name: reg.first_name,
            last_name: reg.last_name,
            birth_date: reg.birth_date,
            gender: reg.gender,
            height_cm: reg.height_cm,
            weight_kg: reg.weight_kg,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    let body = issue_tokens(&state, user, "Registration successful")?;
    Ok((StatusCode::CREATED, Json(body)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = payload
        .email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty());
    let (Some(email), Some(password)) = (email, payload.password.filter(|p| !p.is_empty()))
    else {
        return Err(ApiError::BadRequest("Email and password are required".into()));
    };

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let user = state.users.record_login(user.id).await?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(issue_tokens(&state, user, "Login successful")?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        ApiError::Unauthorized("Invalid or expired refresh token".into())
    })?;

    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    Ok(Json(issue_tokens(&state, user, "Token refreshed")?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<ApiResponse<User>> {
    let user = state.users.find_by_id(user_id).await?.ok_or_else(|| {
        warn!(user_id = %user_id, "user not found");
        ApiError::Unauthorized("User not found".into())
    })?;
    Ok(ApiResponse::user(user))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::{register_user, TestApp};

    #[tokio::test]
    async fn register_returns_tokens_and_public_user() {
        let app = TestApp::new();
        let (status, body) = app
            .post("/api/register", None, json!({
                "firstName": "Mehmet",
                "lastName": "Demir",
                "email": "mehmet@example.com",
                "password": "password123",
                "birthDate": "1990-05-01",
                "gender": "male",
                "height": 180,
                "weight": 80
            }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert!(body["token"].as_str().unwrap().len() > 20);
        assert!(body["refreshToken"].is_string());
        assert_eq!(body["user"]["email"], "mehmet@example.com");
        assert_eq!(body["user"]["birthDate"], "1990-05-01");
        assert!(body["user"].get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let app = TestApp::new();
        register_user(&app, "dup@example.com").await;
        let (status, body) = app
            .post("/api/register", None, json!({
                "firstName": "Other",
                "lastName": "Person",
                "email": "DUP@example.com",
                "password": "password123",
                "birthDate": "1992-01-01",
                "gender": "female",
                "height": 170,
                "weight": 65
            }))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn register_reports_field_errors() {
        let app = TestApp::new();
        let (status, body) = app
            .post("/api/register", None, json!({"email": "nope"}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields: Vec<_> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap().to_string())
            .collect();
        assert!(fields.contains(&"email".to_string()));
        assert!(fields.contains(&"password".to_string()));
    }

    #[tokio::test]
    async fn login_checks_hashed_password() {
        let app = TestApp::new();
        register_user(&app, "login@example.com").await;

        let (status, body) = app
            .post("/api/login", None, json!({"email": "login@example.com", "password": "wrong-pass"}))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");

        let (status, body) = app
            .post("/api/login", None, json!({"email": "Login@Example.com", "password": "password123"}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let first = body["user"]["lastLoginAt"].clone();
        assert!(first.is_string());

        let token = body["token"].as_str().unwrap().to_string();
        let (_, me) = app.get("/api/me", Some(token.as_str())).await;
        assert_eq!(me["user"]["lastLoginAt"], first);

        let (_, again) = app
            .post("/api/login", None, json!({"email": "login@example.com", "password": "password123"}))
            .await;
        let (_, me) = app.get("/api/me", Some(token.as_str())).await;
        assert_eq!(again["user"]["lastLoginAt"], me["user"]["lastLoginAt"]);
    }

    #[tokio::test]
    async fn login_unknown_email_and_missing_fields() {
        let app = TestApp::new();
        let (status, _) = app
            .post("/api/login", None, json!({"email": "ghost@example.com", "password": "password123"}))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app.post("/api/login", None, json!({"email": "a@b.co"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn me_requires_access_token() {
        let app = TestApp::new();
        let (status, _) = app.get("/api/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let session = register_user(&app, "me@example.com").await;
        let (status, body) = app.get("/api/me", Some(session.token.as_str())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["email"], "me@example.com");
        assert_eq!(body["user"]["id"], session.user_id.to_string());

        let (status, _) = app.get("/api/me", Some(session.refresh_token.as_str())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn refresh_issues_new_pair() {
        let app = TestApp::new();
        let session = register_user(&app, "refresh@example.com").await;
        let (status, body) = app
            .post("/api/refresh", None, json!({"refreshToken": session.refresh_token}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["token"].is_string());

        let (status, _) = app
            .post("/api/refresh", None, json!({"refreshToken": session.token}))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
