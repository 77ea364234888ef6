//! Router-level test helpers: an in-memory app driven through `oneshot`.

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    app::build_app,
    config::{AppConfig, GeminiConfig, JwtConfig},
    generation::{TextGenerator, UnconfiguredGenerator},
    state::AppState,
};

pub const TEST_PASSWORD: &str = "password123";

/// Generator double: answers every prompt the same way and records prompts.
pub struct ScriptedGenerator {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn answering(text: &str) -> Self {
        Self {
            reply: Ok(text.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(|e| anyhow!(e))
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        database_url: None,
        jwt: JwtConfig {
            secret: "test-secret".into(),
            issuer: "fitanaliz-test".into(),
            audience: "fitanaliz-test-users".into(),
            ttl_minutes: 5,
            refresh_ttl_minutes: 60,
        },
        gemini: GeminiConfig {
            api_key: None,
            model: "test-model".into(),
            base_url: "http://localhost".into(),
        },
    }
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::from_generator(Arc::new(UnconfiguredGenerator))
    }

    pub fn with_generator(generator: impl TextGenerator + 'static) -> Self {
        Self::from_generator(Arc::new(generator))
    }

    fn from_generator(generator: Arc<dyn TextGenerator>) -> Self {
        let state = AppState::in_memory(Arc::new(test_config()), generator);
        Self {
            router: build_app(state.clone()),
            state,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let req = match body {
            Some(b) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }
}

pub struct Session {
    pub token: String,
    pub refresh_token: String,
    pub user_id: Uuid,
}

/// Registers a 180 cm / 80 kg male born 1990-05-01 with [`TEST_PASSWORD`].
pub async fn register_user(app: &TestApp, email: &str) -> Session {
    let (status, body) = app
        .post(
            "/api/register",
            None,
            json!({
                "firstName": "Test",
                "lastName": "User",
                "email": email,
                "password": TEST_PASSWORD,
                "birthDate": "1990-05-01",
                "gender": "male",
                "height": 180,
                "weight": 80
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    Session {
        token: body["token"].as_str().unwrap().to_string(),
        refresh_token: body["refreshToken"].as_str().unwrap().to_string(),
        user_id: body["user"]["id"].as_str().unwrap().parse().unwrap(),
    }
}
