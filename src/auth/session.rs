use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;

use super::jwt::{self, Claims, SESSION_DAYS};
use crate::error::AppError;
use crate::models::User;

pub const SESSION_COOKIE: &str = "session";

/// Sign a session token for `user`.
pub fn issue(user: &User, secret: &str) -> Result<String, AppError> {
    jwt::encode_token(&Claims::new(user.id, &user.email), secret).map_err(AppError::Internal)
}

pub fn session_cookie(token: &str) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(SESSION_DAYS))
        .build();

    CookieJar::new().add(cookie)
}

pub fn clear_session_cookie() -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    CookieJar::new().add(cookie)
}
