//! Session configuration parsed from environment variables.

use std::time::Duration;

use crate::cookies::{CookieOptions, Expires, SameSite};

/// Placeholder in [`AuthUrls::after_good_login`] replaced by the user's role.
pub const ROLE_PLACEHOLDER: &str = "{loggedUserRole}";

pub const DEFAULT_AFTER_GOOD_LOGIN: &str = "/{loggedUserRole}";
pub const DEFAULT_AFTER_BAD_LOGIN: &str = "/login";
pub const DEFAULT_AFTER_LOGOUT: &str = "/login";
pub const DEFAULT_COOKIE_PATH: &str = "/";
pub const DEFAULT_COOKIE_EXPIRES_DAYS: i64 = 3;
pub const DEFAULT_LOGOUT_DELAY_MS: u64 = 300;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {var}")]
    MissingVar { var: &'static str },
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Login endpoint and navigation targets supplied by the host application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUrls {
    pub api_login_url: String,
    /// May contain [`ROLE_PLACEHOLDER`].
    pub after_good_login: String,
    pub after_bad_login: String,
    pub after_logout: String,
}

impl AuthUrls {
    /// URLs with default navigation targets.
    #[must_use]
    pub fn new(api_login_url: impl Into<String>) -> Self {
        Self {
            api_login_url: api_login_url.into(),
            after_good_login: DEFAULT_AFTER_GOOD_LOGIN.to_owned(),
            after_bad_login: DEFAULT_AFTER_BAD_LOGIN.to_owned(),
            after_logout: DEFAULT_AFTER_LOGOUT.to_owned(),
        }
    }

    /// Build from environment variables.
    ///
    /// Required:
    /// - `AUTH_API_LOGIN_URL`
    ///
    /// Optional:
    /// - `AUTH_AFTER_GOOD_LOGIN`: default `/{loggedUserRole}`
    /// - `AUTH_AFTER_BAD_LOGIN`: default `/login`
    /// - `AUTH_AFTER_LOGOUT`: default `/login`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(None)
    }

    /// As [`AuthUrls::from_env`], but an explicit `api_login_url` wins over
    /// `AUTH_API_LOGIN_URL`.
    pub fn from_env_with(api_login_url: Option<String>) -> Result<Self, ConfigError> {
        let api_login_url = match api_login_url {
            Some(url) => url,
            None => std::env::var("AUTH_API_LOGIN_URL")
                .map_err(|_| ConfigError::MissingVar { var: "AUTH_API_LOGIN_URL" })?,
        };
        Ok(Self {
            api_login_url,
            after_good_login: env_or("AUTH_AFTER_GOOD_LOGIN", DEFAULT_AFTER_GOOD_LOGIN),
            after_bad_login: env_or("AUTH_AFTER_BAD_LOGIN", DEFAULT_AFTER_BAD_LOGIN),
            after_logout: env_or("AUTH_AFTER_LOGOUT", DEFAULT_AFTER_LOGOUT),
        })
    }

    /// `after_good_login` with the role substituted.
    #[must_use]
    pub fn after_good_login_for(&self, role: &str) -> String {
        self.after_good_login.replace(ROLE_PLACEHOLDER, role)
    }
}

/// HTTP client limits. `None` leaves reqwest's behavior untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request: Option<Duration>,
    pub connect: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub urls: AuthUrls,
    /// Attributes for the token and profile cookies.
    pub cookie_options: CookieOptions,
    /// Wait between clearing the session and navigating away on logout.
    pub logout_delay: Duration,
    pub timeouts: HttpTimeouts,
}

impl SessionConfig {
    /// Config with default cookie options: `path=/`, three days, not
    /// secure, `SameSite=strict`.
    #[must_use]
    pub fn new(urls: AuthUrls) -> Self {
        Self {
            urls,
            cookie_options: default_cookie_options(),
            logout_delay: Duration::from_millis(DEFAULT_LOGOUT_DELAY_MS),
            timeouts: HttpTimeouts::default(),
        }
    }

    /// Build from environment variables.
    ///
    /// Everything [`AuthUrls::from_env`] reads, plus (all optional):
    /// - `AUTH_COOKIE_DOMAIN`
    /// - `AUTH_COOKIE_PATH`: default `/`
    /// - `AUTH_COOKIE_EXPIRES_DAYS`: default 3, `0` for session cookies
    /// - `AUTH_COOKIE_SECURE`: default false
    /// - `AUTH_COOKIE_SAME_SITE`: `strict` (default), `lax` or `none`
    /// - `AUTH_LOGOUT_DELAY_MS`: default 300
    /// - `AUTH_REQUEST_TIMEOUT_SECS`, `AUTH_CONNECT_TIMEOUT_SECS`: unset by default
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(AuthUrls::from_env()?)
    }

    /// As [`SessionConfig::from_env`], with `urls` supplied by the caller.
    pub fn from_env_with(urls: AuthUrls) -> Result<Self, ConfigError> {
        let same_site = match std::env::var("AUTH_COOKIE_SAME_SITE").ok() {
            None => SameSite::Strict,
            Some(raw) => {
                SameSite::parse(&raw).ok_or(ConfigError::Invalid { var: "AUTH_COOKIE_SAME_SITE", value: raw })?
            }
        };
        let cookie_options = CookieOptions {
            domain: std::env::var("AUTH_COOKIE_DOMAIN").ok(),
            path: Some(env_or("AUTH_COOKIE_PATH", DEFAULT_COOKIE_PATH)),
            expires: Some(Expires::Days(env_parse("AUTH_COOKIE_EXPIRES_DAYS")?.unwrap_or(DEFAULT_COOKIE_EXPIRES_DAYS))),
            secure: env_bool("AUTH_COOKIE_SECURE")?.unwrap_or(false),
            http_only: false,
            same_site: Some(same_site),
        };

        let logout_delay = Duration::from_millis(env_parse("AUTH_LOGOUT_DELAY_MS")?.unwrap_or(DEFAULT_LOGOUT_DELAY_MS));
        let timeouts = HttpTimeouts {
            request: env_parse("AUTH_REQUEST_TIMEOUT_SECS")?.map(Duration::from_secs),
            connect: env_parse("AUTH_CONNECT_TIMEOUT_SECS")?.map(Duration::from_secs),
        };

        Ok(Self { urls, cookie_options, logout_delay, timeouts })
    }
}

fn default_cookie_options() -> CookieOptions {
    CookieOptions {
        domain: None,
        path: Some(DEFAULT_COOKIE_PATH.to_owned()),
        expires: Some(Expires::Days(DEFAULT_COOKIE_EXPIRES_DAYS)),
        secure: false,
        http_only: false,
        same_site: Some(SameSite::Strict),
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_parse<T>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Err(_) => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var: key, value: raw }),
    }
}

fn env_bool(key: &'static str) -> Result<Option<bool>, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(None),
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::Invalid { var: key, value: raw }),
        },
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
