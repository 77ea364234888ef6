use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::Date;

use super::repo_types::User;
use crate::{
    dates,
    error::ApiError,
    metrics::calculator::Gender,
    validation::{is_valid_email, Checker},
};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Request body for user registration. Fields are optional so that missing
/// ones are reported per field instead of as a decode failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub height: Option<Value>,
    pub weight: Option<Value>,
}

/// Registration data that passed validation; password still in plain text.
#[derive(Debug)]
pub struct ValidRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub birth_date: Date,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<ValidRegistration, ApiError> {
        let mut c = Checker::new();
        let first_name = c.text("firstName", self.first_name.as_deref());
        let last_name = c.text("lastName", self.last_name.as_deref());

        let email = c
            .text("email", self.email.as_deref())
            .map(|e| e.to_lowercase());
        if let Some(e) = &email {
            if !is_valid_email(e) {
                c.push("email", "Invalid email");
            }
        }

        let password = match self.password {
            Some(p) if p.len() >= MIN_PASSWORD_LEN => Some(p),
            Some(_) => {
                c.push(
                    "password",
                    format!("password must be at least {MIN_PASSWORD_LEN} characters"),
                );
                None
            }
            None => {
                c.push("password", "password is required");
                None
            }
        };

        let birth_date = match c.text("birthDate", self.birth_date.as_deref()) {
            Some(raw) => match dates::parse_iso_date(&raw) {
                Some(d) if d <= dates::today_utc() => Some(d),
                Some(_) => {
                    c.push("birthDate", "birthDate must not be in the future");
                    None
                }
                None => {
                    c.push("birthDate", "birthDate must be formatted as YYYY-MM-DD");
                    None
                }
            },
            None => None,
        };

        let gender = c.choice::<Gender>("gender", self.gender.as_deref(), "male, female");
        let height_cm = c.positive_number("height", self.height.as_ref());
        let weight_kg = c.positive_number("weight", self.weight.as_ref());

        c.finish()?;
        match (
            first_name, last_name, email, password, birth_date, gender, height_cm, weight_kg,
        ) {
            (
                Some(first_name),
                Some(last_name),
                Some(email),
                Some(password),
                Some(birth_date),
                Some(gender),
                Some(height_cm),
                Some(weight_kg),
            ) => Ok(ValidRegistration {
                first_name,
                last_name,
                email,
                password,
                birth_date,
                gender,
                height_cm,
                weight_kg,
            }),
            _ => Err(ApiError::BadRequest("Invalid registration payload".into())),
        }
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response returned after login, register or refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub refresh_token: String,
    pub user: User,
}
