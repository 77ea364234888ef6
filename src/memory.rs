//! In-process store used when no database is configured and by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{
        repo::UserRepo,
        repo_types::{MetricsUpdate, NewUser, User},
    },
    error::StoreError,
    plans::{
        model::{Plan, PlanBody},
        ExerciseWeek, MealWeek, PlanRepo,
    },
    water::{
        repo::WaterRepo,
        repo_types::{WaterIntake, WaterLogEntry},
    },
};

#[derive(Default)]
pub(crate) struct Tables {
    users: HashMap<Uuid, User>,
    /// Insertion order; newest last.
    meal_plans: Vec<Plan<MealWeek>>,
    exercise_plans: Vec<Plan<ExerciseWeek>>,
    water: HashMap<(Uuid, Date), WaterIntake>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Maps a plan kind to its table.
pub(crate) trait PlanTable: PlanBody {
    fn table(t: &Tables) -> &Vec<Plan<Self>>;
    fn table_mut(t: &mut Tables) -> &mut Vec<Plan<Self>>;
}

impl PlanTable for MealWeek {
    fn table(t: &Tables) -> &Vec<Plan<Self>> {
        &t.meal_plans
    }
    fn table_mut(t: &mut Tables) -> &mut Vec<Plan<Self>> {
        &mut t.meal_plans
    }
}

impl PlanTable for ExerciseWeek {
    fn table(t: &Tables) -> &Vec<Plan<Self>> {
        &t.exercise_plans
    }
    fn table_mut(t: &mut Tables) -> &mut Vec<Plan<Self>> {
        &mut t.exercise_plans
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.email == new.email) {
            return Err(StoreError::Conflict("Email already registered".into()));
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            birth_date: new.birth_date,
            gender: new.gender,
            height_cm: new.height_cm,
            weight_kg: new.weight_kg,
            activity_level: None,
            daily_calorie_target: None,
            body_fat_percent: None,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn record_login(&self, id: Uuid) -> Result<User, StoreError> {
        let mut t = self.tables.write().await;
        let u = t.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        u.last_login_at = Some(OffsetDateTime::now_utc());
        Ok(u.clone())
    }

    async fn update_metrics(&self, id: Uuid, update: MetricsUpdate) -> Result<User, StoreError> {
        let mut t = self.tables.write().await;
        let u = t.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        u.activity_level = Some(update.activity_level);
        u.daily_calorie_target = Some(update.daily_calorie_target);
        u.body_fat_percent = Some(update.body_fat_percent);
        u.updated_at = OffsetDateTime::now_utc();
        Ok(u.clone())
    }
}

#[async_trait]
impl<D: PlanTable> PlanRepo<D> for MemoryStore {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Plan<D>>, StoreError> {
        let t = self.tables.read().await;
        Ok(D::table(&t)
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<Plan<D>>, StoreError> {
        let t = self.tables.read().await;
        Ok(D::table(&t)
            .iter()
            .find(|p| p.id == id && p.user_id == user_id)
            .cloned())
    }

    async fn create(&self, user_id: Uuid, title: String, days: D) -> Result<Plan<D>, StoreError> {
        let now = OffsetDateTime::now_utc();
        let plan = Plan {
            id: Uuid::new_v4(),
            user_id,
            title,
            days,
            created_at: now,
            updated_at: now,
        };
        D::table_mut(&mut *self.tables.write().await).push(plan.clone());
        Ok(plan)
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        title: String,
        days: D,
    ) -> Result<Option<Plan<D>>, StoreError> {
        let mut t = self.tables.write().await;
        let Some(plan) = D::table_mut(&mut t)
            .iter_mut()
            .find(|p| p.id == id && p.user_id == user_id)
        else {
            return Ok(None);
        };
        plan.title = title;
        plan.days = days;
        plan.updated_at = OffsetDateTime::now_utc();
        Ok(Some(plan.clone()))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        let plans = D::table_mut(&mut t);
        let before = plans.len();
        plans.retain(|p| !(p.id == id && p.user_id == user_id));
        Ok(plans.len() != before)
    }
}

#[async_trait]
impl WaterRepo for MemoryStore {
    async fn add(
        &self,
        user_id: Uuid,
        date: Date,
        entry: WaterLogEntry,
    ) -> Result<WaterIntake, StoreError> {
        let mut t = self.tables.write().await;
        let now = OffsetDateTime::now_utc();
        let day = t.water.entry((user_id, date)).or_insert_with(|| WaterIntake {
            id: Uuid::new_v4(),
            user_id,
            date,
            total_ml: 0,
            entries: Vec::new(),
            created_at: now,
            updated_at: now,
        });
        day.total_ml += entry.amount_ml;
        day.entries.push(entry);
        day.updated_at = now;
        Ok(day.clone())
    }

    async fn get(&self, user_id: Uuid, date: Date) -> Result<Option<WaterIntake>, StoreError> {
        Ok(self.tables.read().await.water.get(&(user_id, date)).cloned())
    }

    async fn list_between(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> Result<Vec<WaterIntake>, StoreError> {
        let t = self.tables.read().await;
        let mut days: Vec<_> = t
            .water
            .values()
            .filter(|w| w.user_id == user_id && w.date >= from && w.date <= to)
            .cloned()
            .collect();
        days.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(days)
    }

    async fn delete(&self, user_id: Uuid, date: Date) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .write()
            .await
            .water
            .remove(&(user_id, date))
            .is_some())
    }
}
