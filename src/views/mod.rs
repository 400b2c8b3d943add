pub mod auth;
pub mod stores;

use axum::routing::get;
use axum::Router;

use crate::state::SharedState;

pub fn public_routes() -> Router<SharedState> {
    Router::new()
        // Stores
        .route("/", get(stores::index))
        .route("/stores", get(stores::index))
        .route("/store/{slug}", get(stores::show))
        .route("/tags", get(stores::tags_page))
        .route("/tags/{tag}", get(stores::tag_page))
        // Auth
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/logout", get(auth::logout))
        .route(
            "/account/forgot",
            get(auth::forgot_page).post(auth::forgot_submit),
        )
        .route(
            "/account/reset/{token}",
            get(auth::reset_page).post(auth::reset_submit),
        )
}

/// Pages that need a session; 401s become a redirect to the login page.
pub fn member_routes() -> Router<SharedState> {
    Router::new()
        .route("/add", get(stores::add_page).post(stores::add_submit))
        .route(
            "/stores/{id}/edit",
            get(stores::edit_page).post(stores::edit_submit),
        )
}

/// Flash text for the short codes passed in `?notice=` / `?error=`.
pub(crate) fn flash_message(code: &str) -> Option<&'static str> {
    match code {
        "reset-sent" => Some("If that email is registered, a password reset has been sent."),
        "reset-invalid" => Some("Password reset is invalid or has expired."),
        "reset-complete" => Some("Successfully reset! You are now logged in."),
        "logged-in" => Some("You are logged in!"),
        "logged-out" => Some("You are now logged out."),
        "login-required" => Some("Oops you must be logged in to do that!"),
        _ => None,
    }
}
