use std::net::IpAddr;

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub reset_ttl: Duration,
    pub log_level: String,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let session_secret = env_required("STOREFINDER_SESSION_SECRET")?;

        let host: IpAddr = env_or("STOREFINDER_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid STOREFINDER_HOST: {e}"))?;

        let port: u16 = env_or("STOREFINDER_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid STOREFINDER_PORT: {e}"))?;

        let base_url = env_or("STOREFINDER_BASE_URL", &format!("http://{host}:{port}"));
        let base_url = base_url.trim_end_matches('/').to_string();

        let reset_ttl = parse_ttl(&env_or("STOREFINDER_RESET_TTL_SECS", "3600"))?;

        let log_level = env_or("STOREFINDER_LOG_LEVEL", "info");

        let smtp = match (
            std::env::var("STOREFINDER_SMTP_HOST").ok(),
            std::env::var("STOREFINDER_SMTP_PORT").ok(),
            std::env::var("STOREFINDER_SMTP_USER").ok(),
            std::env::var("STOREFINDER_SMTP_PASS").ok(),
            std::env::var("STOREFINDER_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid STOREFINDER_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            session_secret,
            host,
            port,
            base_url,
            reset_ttl,
            log_level,
            smtp,
        })
    }
}

fn parse_ttl(raw: &str) -> Result<Duration, String> {
    let secs: i64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("Invalid STOREFINDER_RESET_TTL_SECS: {e}"))?;
    if secs <= 0 {
        return Err("STOREFINDER_RESET_TTL_SECS must be positive".to_string());
    }
    Ok(Duration::seconds(secs))
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_defaults_to_an_hour() {
        assert_eq!(parse_ttl("3600").unwrap(), Duration::hours(1));
    }

    #[test]
    fn ttl_rejects_zero_and_garbage() {
        assert!(parse_ttl("0").is_err());
        assert!(parse_ttl("-5").is_err());
        assert!(parse_ttl("soon").is_err());
    }
}
