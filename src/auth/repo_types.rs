use serde::Serialize;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::metrics::calculator::{ActivityLevel, Gender};

/// User record in the database.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2 PHC string, never exposed
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "crate::dates::iso_date")]
    pub birth_date: Date,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: Option<ActivityLevel>,
    pub daily_calorie_target: Option<i32>,
    pub body_fat_percent: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login_at: Option<OffsetDateTime>,
}

/// Validated registration data, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Date,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
}

/// Result of a calorie recalculation stored back on the user.
#[derive(Debug, Clone, Copy)]
pub struct MetricsUpdate {
    pub activity_level: ActivityLevel,
    pub daily_calorie_target: i32,
    pub body_fat_percent: f64,
}
