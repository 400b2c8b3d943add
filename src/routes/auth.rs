use axum::extract::{Path, State};
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::auth::{password, session};
use crate::db;
use crate::error::AppError;
use crate::models::{normalize_email, User};
use crate::reset::ResetError;
use crate::state::SharedState;

pub const RESET_REQUESTED_MESSAGE: &str = "If that email is registered, a password reset has been sent.";

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
    pub password_confirm: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct ResetTokenResponse {
    pub email: String,
}

pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let email = normalize_email(&req.email);
    let name = req.name.trim();

    if email.is_empty() || name.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    }
    if !email.contains('@') {
        return Err(AppError::BadRequest("That email is not valid".to_string()));
    }
    if req.password != req.password_confirm {
        return Err(AppError::BadRequest("Passwords do not match".to_string()));
    }
    password::check_strength(&req.password).map_err(AppError::BadRequest)?;

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;

    let user = db::users::create(&state.pool, &email, name, &pw_hash)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("An account with this email already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

    tracing::info!(user_id = %user.id, "User registered");

    let token = session::issue(&user, &state.config.session_secret)?;
    Ok((session::session_cookie(&token), Json(AuthResponse { token, user })))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let user = authenticate(&state, &req.email, &req.password).await?;
    let token = session::issue(&user, &state.config.session_secret)?;
    Ok((session::session_cookie(&token), Json(AuthResponse { token, user })))
}

/// Check credentials, counting failures against the login limiter.
pub(crate) async fn authenticate(
    state: &SharedState,
    email: &str,
    plaintext: &str,
) -> Result<User, AppError> {
    let email = normalize_email(email);

    if state.login_limiter.check(&email).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let Some(user) = db::users::find_by_email(&state.pool, &email).await? else {
        state.login_limiter.record(&email);
        return Err(AppError::Unauthorized("Failed Login.".to_string()));
    };

    let valid = password::verify(plaintext, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        state.login_limiter.record(&email);
        return Err(AppError::Unauthorized("Failed Login.".to_string()));
    }

    Ok(user)
}

pub async fn logout() -> (CookieJar, Json<MessageResponse>) {
    (
        session::clear_session_cookie(),
        Json(MessageResponse {
            message: "You are now logged out.".to_string(),
        }),
    )
}

pub async fn forgot_password(
    State(state): State<SharedState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    request_reset(&state, &req.email).await?;

    Ok(Json(MessageResponse {
        message: RESET_REQUESTED_MESSAGE.to_string(),
    }))
}

/// Run a reset request so that the outcome looks the same for every email.
///
/// Throttled requests and delivery failures are logged and reported as
/// success; only failures that would hit any email (entropy, storage) surface.
pub(crate) async fn request_reset(state: &SharedState, email: &str) -> Result<(), AppError> {
    let email = normalize_email(email);

    if state.reset_limiter.hit(&email).is_err() {
        tracing::debug!("Password reset request throttled");
        return Ok(());
    }

    match state.reset.request_reset(&email).await {
        Ok(()) => Ok(()),
        Err(ResetError::Notification(e)) => {
            tracing::error!("Failed to send password reset email: {e}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn check_reset_token(
    State(state): State<SharedState>,
    Path(token): Path<String>,
) -> Result<Json<ResetTokenResponse>, AppError> {
    let user = state.reset.validate_token(&token).await?;
    Ok(Json(ResetTokenResponse { email: user.email }))
}

pub async fn reset_password(
    State(state): State<SharedState>,
    Path(token): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let user = state
        .reset
        .complete_reset(&token, &req.password, &req.password_confirm)
        .await?;

    let token = session::issue(&user, &state.config.session_secret)?;
    Ok((session::session_cookie(&token), Json(AuthResponse { token, user })))
}
