pub mod config;
pub mod error;
pub mod state;
pub mod auth;
pub mod db;
pub mod models;
pub mod middleware;
pub mod routes;
pub mod views;
pub mod email;
pub mod reset;
pub mod rate_limit;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use sqlx::PgPool;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::auth::credentials::Argon2Credentials;
use crate::config::Config;
use crate::email::{LogDispatcher, SystemMailer};
use crate::middleware::auth_redirect::redirect_unauthorized;
use crate::rate_limit::AttemptLimiter;
use crate::reset::store::PgResetStore;
use crate::reset::{NotificationDispatcher, ResetWorkflow};
use crate::state::{AppState, SharedState};

pub fn build_app(pool: PgPool, config: Config) -> (Router, SharedState) {
    let notifier: Arc<dyn NotificationDispatcher> = match config.smtp.as_ref() {
        Some(smtp) => match SystemMailer::new(smtp) {
            Ok(mailer) => {
                tracing::info!("System SMTP configured");
                Arc::new(mailer)
            }
            Err(e) => {
                tracing::warn!("System SMTP not available: {e}");
                Arc::new(LogDispatcher)
            }
        },
        None => Arc::new(LogDispatcher),
    };

    let reset = ResetWorkflow::new(
        Arc::new(PgResetStore::new(pool.clone())),
        Arc::new(Argon2Credentials),
        notifier,
        &config.base_url,
        config.reset_ttl,
    );

    let state: SharedState = Arc::new(AppState {
        pool,
        config,
        reset,
        login_limiter: AttemptLimiter::for_login(),
        reset_limiter: AttemptLimiter::for_reset_requests(),
    });

    let app = Router::new()
        .merge(routes::api_routes())
        .merge(views::public_routes())
        .merge(views::member_routes().layer(axum::middleware::from_fn(redirect_unauthorized)))
        .nest_service("/static", ServeDir::new("static"))
        .route("/health", axum::routing::get(health))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (app, state)
}

/// Periodically drop expired rate limiter entries.
pub fn spawn_limiter_sweep(state: SharedState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(10 * 60));
        loop {
            ticker.tick().await;
            state.login_limiter.cleanup();
            state.reset_limiter.cleanup();
        }
    })
}

async fn health() -> &'static str {
    "ok"
}
