use axum::{routing::get, routing::post, routing::put, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/health/db", get(handlers::health_db))
}

pub fn auth() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/me", get(handlers::get_current_user))
}

pub fn users() -> Router<AppState> {
    Router::new().route("/users/:id", get(handlers::get_user))
}

pub fn posts() -> Router<AppState> {
    Router::new()
        .route("/posts", get(handlers::list_posts).post(handlers::create_post))
        .route("/posts/:id", get(handlers::get_post))
        .route("/posts/:id/like", post(handlers::toggle_post_like))
        .route(
            "/posts/:id/comments",
            get(handlers::list_post_comments).post(handlers::comment_post),
        )
        .route("/comments/:id/like", post(handlers::toggle_comment_like))
}

pub fn properties() -> Router<AppState> {
    Router::new()
        .route(
            "/properties",
            get(handlers::list_properties).post(handlers::create_property),
        )
        .route("/properties/:id", get(handlers::get_property))
}

pub fn services() -> Router<AppState> {
    Router::new()
        .route(
            "/services",
            get(handlers::list_services).post(handlers::create_service),
        )
        .route("/services/:id", get(handlers::get_service))
}

pub fn events() -> Router<AppState> {
    Router::new()
        .route("/events", get(handlers::list_events).post(handlers::create_event))
        .route("/events/:id", get(handlers::get_event))
}

pub fn blogs() -> Router<AppState> {
    Router::new()
        .route("/blogs", get(handlers::list_blogs).post(handlers::create_blog))
        .route("/blogs/:id", get(handlers::get_blog))
}

pub fn notifications() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(handlers::list_notifications))
        .route(
            "/notifications/:id/read",
            post(handlers::mark_notification_read),
        )
}

pub fn leaderboard() -> Router<AppState> {
    Router::new()
        .route("/leaderboard", get(handlers::get_leaderboard))
        .route("/leaderboard/:user_id", put(handlers::set_leaderboard_score))
}
