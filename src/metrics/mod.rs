use axum::Router;

use crate::state::AppState;

pub mod calculator;
pub mod dto;
pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::calculator_routes())
        .merge(handlers::profile_routes())
}
