pub mod auth;
pub mod stores;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/forgot-password", post(auth::forgot_password))
        .route(
            "/api/v1/auth/reset-password/{token}",
            get(auth::check_reset_token).post(auth::reset_password),
        )
        // Stores
        .route("/api/v1/stores", get(stores::list).post(stores::create))
        .route("/api/v1/stores/by-slug/{slug}", get(stores::get))
        .route("/api/v1/stores/{id}", put(stores::update))
        .route("/api/v1/tags", get(stores::tags))
}
