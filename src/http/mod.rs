use axum::Router;

use crate::AppState;

mod auth;
mod error;
mod handlers;
mod routes;

pub use auth::{AdminToken, AuthUser};
pub use error::AppError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health())
        .merge(routes::auth())
        .merge(routes::users())
        .merge(routes::posts())
        .merge(routes::properties())
        .merge(routes::services())
        .merge(routes::events())
        .merge(routes::blogs())
        .merge(routes::notifications())
        .merge(routes::leaderboard())
        .with_state(state)
}
