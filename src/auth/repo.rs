use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::auth::repo_types::{MetricsUpdate, NewUser, User};
use crate::error::StoreError;

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Find a user by (already lowercased) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Fails with `StoreError::Conflict` when the email is taken.
    async fn create(&self, new: NewUser) -> Result<User, StoreError>;
    /// Stamps `last_login_at` and returns the updated user.
    async fn record_login(&self, id: Uuid) -> Result<User, StoreError>;
    async fn update_metrics(&self, id: Uuid, update: MetricsUpdate) -> Result<User, StoreError>;
}

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, birth_date, gender, \
     height_cm, weight_kg, activity_level, daily_calorie_target, body_fat_percent, \
     created_at, updated_at, last_login_at";

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let gender: String = row.try_get("gender")?;
    let activity_level: Option<String> = row.try_get("activity_level")?;
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        birth_date: row.try_get("birth_date")?,
        gender: gender.parse().map_err(anyhow::Error::msg)?,
        height_cm: row.try_get("height_cm")?,
        weight_kg: row.try_get("weight_kg")?,
        activity_level: activity_level
            .map(|v| v.parse())
            .transpose()
            .map_err(anyhow::Error::msg)?,
        daily_calorie_target: row.try_get("daily_calorie_target")?,
        body_fat_percent: row.try_get("body_fat_percent")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        last_login_at: row.try_get("last_login_at")?,
    })
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, birth_date,
                               gender, height_cm, weight_kg)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.birth_date)
        .bind(new.gender.as_str())
        .bind(new.height_cm)
        .bind(new.weight_kg)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match StoreError::from(e) {
            StoreError::Conflict(_) => StoreError::Conflict("Email already registered".into()),
            other => other,
        })?;
        user_from_row(&row)
    }

    async fn record_login(&self, id: Uuid) -> Result<User, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE users SET last_login_at = now() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)?;
        user_from_row(&row)
    }

    async fn update_metrics(&self, id: Uuid, update: MetricsUpdate) -> Result<User, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
               SET activity_level = $2, daily_calorie_target = $3,
                   body_fat_percent = $4, updated_at = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.activity_level.as_str())
        .bind(update.daily_calorie_target)
        .bind(update.body_fat_percent)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)?;
        user_from_row(&row)
    }
}
