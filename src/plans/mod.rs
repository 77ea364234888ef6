use axum::Router;

use crate::state::AppState;

pub mod analysis;
pub mod dto;
pub mod exercise;
pub mod handlers;
pub mod meal;
pub mod model;
pub mod repo;

pub use exercise::ExerciseWeek;
pub use meal::MealWeek;
pub use repo::{PgPlanRepo, PlanRepo};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::routes::<MealWeek>("/meal-plans"))
        .merge(handlers::routes::<ExerciseWeek>("/exercise-plans"))
}
