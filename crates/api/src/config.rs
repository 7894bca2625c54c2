use chrono::Duration;
use maxpizza_core::config::{AuthConfig, DEFAULT_ACCESS_TOKEN_TTL_MINS, DEFAULT_HASH_COST};
use maxpizza_mailer::{EmailConfig, DEFAULT_FROM_ADDRESS, DEFAULT_SMTP_PORT};

/// Configuration problem detected at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Server configuration loaded from environment variables.
///
/// Everything except the token secrets has a default suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Front-end base URL that `/auth/confirm/{id}` redirects to.
    pub front_host: String,
    /// Token secrets, lifetimes, hashing cost and activation link addressing.
    pub auth: AuthConfig,
    /// SMTP settings; `None` when `SMTP_HOST` is unset.
    pub email: Option<EmailConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                 |
    /// |--------------------------|-------------------------|
    /// | `HOST`                   | `0.0.0.0`               |
    /// | `PORT`                   | `3000`                  |
    /// | `CORS_ORIGINS`           | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                    |
    /// | `FRONT_HOST`             | `http://localhost:5173` |
    /// | `SECRET_ACCESS_TOKEN`    | required                |
    /// | `SECRET_REFRESH_TOKEN`   | required                |
    /// | `PASSWORD_HASH_COST`     | `3`                     |
    /// | `ACCESS_TOKEN_TTL_MINS`  | `120`                   |
    /// | `REFRESH_TOKEN_TTL_DAYS` | unset (no expiry)       |
    /// | `SERVER_HOST`            | `localhost`             |
    /// | `SERVER_PORT`            | value of `PORT`         |
    /// | `SMTP_HOST`              | unset (no mailer)       |
    /// | `SMTP_PORT`              | `587`                   |
    /// | `EMAIL_USER`             | `noreply@maxpizza.local`|
    /// | `SMTP_USER`              | unset                   |
    /// | `SMTP_PASSWORD`          | unset                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&lookup, "PORT", 3000)?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            if origin.parse::<axum::http::HeaderValue>().is_err() {
                return Err(ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    reason: format!("'{origin}' is not a valid origin"),
                });
            }
        }

        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;
        let front_host = lookup("FRONT_HOST")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .trim_end_matches('/')
            .to_string();

        let access_ttl_mins: i64 =
            parse_or(&lookup, "ACCESS_TOKEN_TTL_MINS", DEFAULT_ACCESS_TOKEN_TTL_MINS)?;
        let refresh_ttl_days: Option<i64> = match lookup("REFRESH_TOKEN_TTL_DAYS") {
            Some(raw) => Some(parse_value("REFRESH_TOKEN_TTL_DAYS", &raw)?),
            None => None,
        };

        let auth = AuthConfig {
            access_token_secret: lookup("SECRET_ACCESS_TOKEN")
                .ok_or(ConfigError::Missing("SECRET_ACCESS_TOKEN"))?,
            refresh_token_secret: lookup("SECRET_REFRESH_TOKEN")
                .ok_or(ConfigError::Missing("SECRET_REFRESH_TOKEN"))?,
            access_token_ttl: Duration::minutes(access_ttl_mins),
            refresh_token_ttl: refresh_ttl_days.map(Duration::days),
            hash_cost: parse_or(&lookup, "PASSWORD_HASH_COST", DEFAULT_HASH_COST)?,
            public_host: lookup("SERVER_HOST").unwrap_or_else(|| "localhost".into()),
            public_port: parse_or(&lookup, "SERVER_PORT", port)?,
        };
        auth.validate().map_err(|e| ConfigError::Invalid {
            var: "auth settings",
            reason: e.to_string(),
        })?;

        let email = match lookup("SMTP_HOST") {
            Some(smtp_host) => Some(EmailConfig {
                smtp_port: parse_or(&lookup, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
                from_address: lookup("EMAIL_USER")
                    .unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
                smtp_user: lookup("SMTP_USER"),
                smtp_password: lookup("SMTP_PASSWORD"),
                ..EmailConfig::new(smtp_host)
            }),
            None => None,
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            front_host,
            auth,
            email,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Some(raw) => parse_value(var, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}
