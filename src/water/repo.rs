use async_trait::async_trait;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use time::Date;
use uuid::Uuid;

use crate::error::StoreError;
use crate::water::repo_types::{WaterIntake, WaterLogEntry};

#[async_trait]
pub trait WaterRepo: Send + Sync {
    /// Creates the day's document or adds `entry` to it, atomically.
    async fn add(
        &self,
        user_id: Uuid,
        date: Date,
        entry: WaterLogEntry,
    ) -> Result<WaterIntake, StoreError>;
    async fn get(&self, user_id: Uuid, date: Date) -> Result<Option<WaterIntake>, StoreError>;
    /// Documents with `from <= date <= to`, newest first.
    async fn list_between(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> Result<Vec<WaterIntake>, StoreError>;
    async fn delete(&self, user_id: Uuid, date: Date) -> Result<bool, StoreError>;
}

const WATER_COLUMNS: &str = "id, user_id, day, total_ml, entries, created_at, updated_at";

#[derive(Clone)]
pub struct PgWaterRepo {
    db: PgPool,
}

impl PgWaterRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn water_from_row(row: &PgRow) -> Result<WaterIntake, StoreError> {
    let Json(entries): Json<Vec<WaterLogEntry>> = row.try_get("entries")?;
    Ok(WaterIntake {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        date: row.try_get("day")?,
        total_ml: row.try_get("total_ml")?,
        entries,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl WaterRepo for PgWaterRepo {
    async fn add(
        &self,
        user_id: Uuid,
        date: Date,
        entry: WaterLogEntry,
    ) -> Result<WaterIntake, StoreError> {
        let amount = entry.amount_ml;
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO water_intake (id, user_id, day, total_ml, entries)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, day) DO UPDATE
               SET total_ml = water_intake.total_ml + EXCLUDED.total_ml,
                   entries = water_intake.entries || EXCLUDED.entries,
                   updated_at = now()
            RETURNING {WATER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(date)
        .bind(amount)
        .bind(Json(vec![entry]))
        .fetch_one(&self.db)
        .await?;
        water_from_row(&row)
    }

    async fn get(&self, user_id: Uuid, date: Date) -> Result<Option<WaterIntake>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {WATER_COLUMNS} FROM water_intake WHERE user_id = $1 AND day = $2"
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await?;
        row.as_ref().map(water_from_row).transpose()
    }

    async fn list_between(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> Result<Vec<WaterIntake>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {WATER_COLUMNS} FROM water_intake
             WHERE user_id = $1 AND day BETWEEN $2 AND $3
             ORDER BY day DESC
            "#
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await?;
        rows.iter().map(water_from_row).collect()
    }

    async fn delete(&self, user_id: Uuid, date: Date) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM water_intake WHERE user_id = $1 AND day = $2")
            .bind(user_id)
            .bind(date)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
