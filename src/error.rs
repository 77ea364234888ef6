use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// One rejected input field.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Internal(e) => {
                error!(error = %format!("{e:#}"), "request failed");
                ErrorBody {
                    success: false,
                    message: "Internal server error".into(),
                    errors: Vec::new(),
                    error: Some(format!("{e:#}")),
                }
            }
            ApiError::Validation(errors) => {
                warn!(fields = errors.len(), "validation failed");
                let message = match errors.as_slice() {
                    [only] => only.message.clone(),
                    _ => "Validation failed".into(),
                };
                ErrorBody {
                    success: false,
                    message,
                    errors,
                    error: None,
                }
            }
            other => ErrorBody {
                success: false,
                message: other.to_string(),
                errors: Vec::new(),
                error: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Failures reported by the repository layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                warn!(
                    constraint = db.constraint().unwrap_or_default(),
                    detail = db.message(),
                    "unique violation"
                );
                StoreError::Conflict("Resource already exists".into())
            }
            other => StoreError::Backend(anyhow::Error::new(other)),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiError::NotFound("Not found".into()),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Backend(e) => ApiError::Internal(e),
        }
    }
}

/// JSON body extractor whose rejections use the API error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Query-string extractor whose rejections use the API error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

/// Success envelope: `{success: true, message?, <key>: payload}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: Payload<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Payload<T> {
    Data(T),
    User(T),
    Plan(T),
    Plans(T),
    Analysis(T),
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(payload: Payload<T>) -> Self {
        Self {
            success: true,
            message: None,
            payload,
        }
    }

    pub fn data(value: T) -> Self {
        Self::ok(Payload::Data(value))
    }

    pub fn user(value: T) -> Self {
        Self::ok(Payload::User(value))
    }

    pub fn plan(value: T) -> Self {
        Self::ok(Payload::Plan(value))
    }

    pub fn plans(value: T) -> Self {
        Self::ok(Payload::Plans(value))
    }

    pub fn analysis(value: T) -> Self {
        Self::ok(Payload::Analysis(value))
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
