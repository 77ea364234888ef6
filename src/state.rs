use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::{
    auth::repo::{PgUserRepo, UserRepo},
    config::AppConfig,
    generation::{self, TextGenerator},
    memory::MemoryStore,
    plans::{ExerciseWeek, MealWeek, PgPlanRepo, PlanRepo},
    water::{PgWaterRepo, WaterRepo},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub meal_plans: Arc<dyn PlanRepo<MealWeek>>,
    pub exercise_plans: Arc<dyn PlanRepo<ExerciseWeek>>,
    pub water: Arc<dyn WaterRepo>,
    pub generator: Arc<dyn TextGenerator>,
}

impl AppState {
    /// Connects to Postgres and runs migrations when `DATABASE_URL` is set,
    /// otherwise falls back to the in-memory store.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let generator = generation::from_config(&config.gemini)?;

        let Some(url) = config.database_url.clone() else {
            warn!("DATABASE_URL not set; using in-memory store, data is lost on restart");
            return Ok(Self::in_memory(config, generator));
        };

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&url)
            .await
            .context("connect to postgres")?;

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;
        info!("database ready");

        Ok(Self {
            config,
            users: Arc::new(PgUserRepo::new(db.clone())),
            meal_plans: Arc::new(PgPlanRepo::<MealWeek>::new(db.clone())),
            exercise_plans: Arc::new(PgPlanRepo::<ExerciseWeek>::new(db.clone())),
            water: Arc::new(PgWaterRepo::new(db)),
            generator,
        })
    }

    pub fn in_memory(config: Arc<AppConfig>, generator: Arc<dyn TextGenerator>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            config,
            users: store.clone(),
            meal_plans: store.clone(),
            exercise_plans: store.clone(),
            water: store,
            generator,
        }
    }
}
