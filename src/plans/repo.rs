use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use uuid::Uuid;

use super::model::{Plan, PlanBody};
use crate::error::StoreError;

/// Storage for one plan kind. Every call is scoped to the owning user; a
/// plan owned by someone else behaves as if it did not exist.
#[async_trait]
pub trait PlanRepo<D: PlanBody>: Send + Sync {
    /// Newest first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<Plan<D>>, StoreError>;
    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<Plan<D>>, StoreError>;
    async fn create(&self, user_id: Uuid, title: String, days: D) -> Result<Plan<D>, StoreError>;
    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        title: String,
        days: D,
    ) -> Result<Option<Plan<D>>, StoreError>;
    /// Returns whether a plan was removed.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError>;
}

const PLAN_COLUMNS: &str = "id, user_id, title, days, created_at, updated_at";

pub struct PgPlanRepo<D> {
    db: PgPool,
    _kind: PhantomData<fn() -> D>,
}

impl<D> PgPlanRepo<D> {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            _kind: PhantomData,
        }
    }
}

fn plan_from_row<D: PlanBody>(row: &PgRow) -> Result<Plan<D>, StoreError> {
    let Json(days): Json<D> = row.try_get("days")?;
    Ok(Plan {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        days,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl<D: PlanBody> PlanRepo<D> for PgPlanRepo<D> {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Plan<D>>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {PLAN_COLUMNS} FROM {} WHERE user_id = $1 ORDER BY created_at DESC",
            D::TABLE
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        rows.iter().map(plan_from_row).collect()
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<Plan<D>>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {PLAN_COLUMNS} FROM {} WHERE id = $1 AND user_id = $2",
            D::TABLE
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        row.as_ref().map(plan_from_row).transpose()
    }

    async fn create(&self, user_id: Uuid, title: String, days: D) -> Result<Plan<D>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO {} (id, user_id, title, days)
            VALUES ($1, $2, $3, $4)
            RETURNING {PLAN_COLUMNS}
            "#,
            D::TABLE
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .bind(Json(days))
        .fetch_one(&self.db)
        .await?;
        plan_from_row(&row)
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        title: String,
        days: D,
    ) -> Result<Option<Plan<D>>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE {}
               SET title = $3, days = $4, updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {PLAN_COLUMNS}
            "#,
            D::TABLE
        ))
        .bind(id)
        .bind(user_id)
        .bind(title)
        .bind(Json(days))
        .fetch_optional(&self.db)
        .await?;
        row.as_ref().map(plan_from_row).transpose()
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query(&format!(
            "DELETE FROM {} WHERE id = $1 AND user_id = $2",
            D::TABLE
        ))
        .bind(id)
        .bind(user_id)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() > 0)
    }
}
