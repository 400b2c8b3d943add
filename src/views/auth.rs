use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use super::flash_message;
use crate::auth::session;
use crate::error::AppError;
use crate::reset::ResetError;
use crate::routes;
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginTemplate {
    notice: Option<&'static str>,
    error: Option<String>,
}

#[derive(Template)]
#[template(path = "auth/forgot.html")]
struct ForgotTemplate {}

#[derive(Template)]
#[template(path = "auth/reset.html")]
struct ResetTemplate {
    token: String,
    error: Option<String>,
}

#[derive(Deserialize)]
pub struct FlashQuery {
    pub notice: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotForm {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetForm {
    pub password: String,
    #[serde(rename = "password-confirm")]
    pub password_confirm: String,
}

pub async fn login_page(Query(q): Query<FlashQuery>) -> impl IntoResponse {
    let template = LoginTemplate {
        notice: q.notice.as_deref().and_then(flash_message),
        error: q.error.as_deref().and_then(flash_message).map(str::to_string),
    };
    Html(template.render().unwrap_or_default())
}

pub async fn login_submit(
    State(state): State<SharedState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let user = match routes::auth::authenticate(&state, &form.email, &form.password).await {
        Ok(user) => user,
        Err(AppError::Unauthorized(msg) | AppError::RateLimited(msg)) => {
            let template = LoginTemplate {
                notice: None,
                error: Some(msg),
            };
            return Ok(Html(template.render().unwrap_or_default()).into_response());
        }
        Err(e) => return Err(e),
    };

    let token = session::issue(&user, &state.config.session_secret)?;
    Ok((
        session::session_cookie(&token),
        Redirect::to("/?notice=logged-in"),
    )
        .into_response())
}

pub async fn logout() -> impl IntoResponse {
    (
        session::clear_session_cookie(),
        Redirect::to("/?notice=logged-out"),
    )
}

pub async fn forgot_page() -> impl IntoResponse {
    Html(ForgotTemplate {}.render().unwrap_or_default())
}

pub async fn forgot_submit(
    State(state): State<SharedState>,
    Form(form): Form<ForgotForm>,
) -> Result<Redirect, AppError> {
    routes::auth::request_reset(&state, &form.email).await?;
    Ok(Redirect::to("/login?notice=reset-sent"))
}

pub async fn reset_page(
    State(state): State<SharedState>,
    Path(token): Path<String>,
) -> Result<Response, AppError> {
    match state.reset.validate_token(&token).await {
        Ok(_) => {
            let template = ResetTemplate { token, error: None };
            Ok(Html(template.render().unwrap_or_default()).into_response())
        }
        Err(ResetError::InvalidOrExpiredToken) => {
            Ok(Redirect::to("/login?error=reset-invalid").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn reset_submit(
    State(state): State<SharedState>,
    Path(token): Path<String>,
    Form(form): Form<ResetForm>,
) -> Result<Response, AppError> {
    let outcome = state
        .reset
        .complete_reset(&token, &form.password, &form.password_confirm)
        .await;

    match outcome {
        Ok(user) => {
            let session_token = session::issue(&user, &state.config.session_secret)?;
            Ok((
                session::session_cookie(&session_token),
                Redirect::to("/?notice=reset-complete"),
            )
                .into_response())
        }
        Err(ResetError::InvalidOrExpiredToken) => {
            Ok(Redirect::to("/login?error=reset-invalid").into_response())
        }
        Err(e @ (ResetError::PasswordMismatch | ResetError::WeakPassword(_))) => {
            let template = ResetTemplate {
                token,
                error: Some(e.to_string()),
            };
            Ok(Html(template.render().unwrap_or_default()).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
