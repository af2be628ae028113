//! Session service: login, logout and current-session queries.
//!
//! ARCHITECTURE
//! ============
//! Cookies are the source of truth. The token lives in `auth_jwtToken`, the
//! profile (JSON) in `auth_loggedUser`; both are written together on a
//! successful login and wiped together (with every other visible cookie) on
//! logout or failed login. An in-memory copy of the profile saves a cookie
//! parse on the hot path and is dropped whenever the cookies are.
//!
//! TRADE-OFFS
//! ==========
//! A generation counter moves on every wipe. Login remembers the generation
//! it started under and refuses to write its response if a logout happened
//! while the request was in flight, so a slow backend cannot resurrect a
//! session the user just ended. The request itself is not cancelled.
//!
//! The generation, the cached profile and the cookie writes that go with
//! them change under one lock: "check generation, write both cookies, fill
//! the cache" and "bump generation, wipe cookies, drop the cache" never
//! interleave, so a concurrent logout cannot leave a profile without its
//! token. Navigation runs outside the lock; routers call back into the
//! service.

pub mod backend;
pub mod config;
pub mod types;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub use backend::{HttpLoginBackend, LoginBackend};
pub use config::{AuthUrls, ConfigError, HttpTimeouts, ROLE_PLACEHOLDER, SessionConfig};
pub use types::{Credentials, LoggedUser, LoginResponse};

use crate::cookies::{CookieError, CookieStore};

pub const TOKEN_COOKIE: &str = "auth_jwtToken";
pub const USER_COOKIE: &str = "auth_loggedUser";

/// Returned by [`SessionService::jwt_token`] when no token is stored.
pub const TOKEN_PLACEHOLDER: &str = "JWT ";

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("login request failed: {0}")]
    Request(String),
    #[error("login rejected: status {status}")]
    Rejected { status: u16, body: String },
    #[error("login response parse failed: {0}")]
    Parse(String),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
    #[error("login response discarded: session was cleared while the request was in flight")]
    Superseded,
    #[error(transparent)]
    Cookie(#[from] CookieError),
}

// =============================================================================
// NAVIGATION
// =============================================================================

/// Router hook used for post-login, post-logout and guard redirects.
pub trait Navigator: Send + Sync {
    fn navigate_by_url(&self, url: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate_by_url(&self, url: &str) {
        self(url);
    }
}

// =============================================================================
// SESSION SERVICE
// =============================================================================

/// Mutable session state, guarded as a unit.
#[derive(Debug, Default)]
struct SessionState {
    /// Bumped by every wipe.
    generation: u64,
    cached_user: Option<LoggedUser>,
}

pub struct SessionService {
    config: SessionConfig,
    cookies: CookieStore,
    backend: Arc<dyn LoginBackend>,
    navigator: Arc<dyn Navigator>,
    state: Mutex<SessionState>,
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("config", &self.config)
            .field("generation", &self.lock_state().generation)
            .finish_non_exhaustive()
    }
}

impl SessionService {
    #[must_use]
    pub fn new(
        config: SessionConfig,
        cookies: CookieStore,
        backend: Arc<dyn LoginBackend>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self { config, cookies, backend, navigator, state: Mutex::new(SessionState::default()) }
    }

    /// Service talking to the login endpoint over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_http(
        config: SessionConfig,
        cookies: CookieStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, SessionError> {
        let backend = HttpLoginBackend::new(config.timeouts)?;
        Ok(Self::new(config, cookies, Arc::new(backend), navigator))
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn cookies(&self) -> &CookieStore {
        &self.cookies
    }

    /// Hand `url` to the router.
    pub fn navigate(&self, url: &str) {
        tracing::debug!(%url, "navigate");
        self.navigator.navigate_by_url(url);
    }

    /// Post-login destination for `role`.
    #[must_use]
    pub fn after_good_login_url(&self, role: &str) -> String {
        self.config.urls.after_good_login_for(role)
    }

    /// Log in and, on success, persist the session and navigate to the
    /// post-login destination.
    ///
    /// # Errors
    ///
    /// On any backend failure every cookie and the cached profile are
    /// cleared and the backend's error is returned unchanged. Returns
    /// [`SessionError::Superseded`] if a logout happened while the request
    /// was in flight; nothing is written in that case.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, SessionError> {
        let started = self.lock_state().generation;
        let result = self
            .backend
            .login(&self.config.urls.api_login_url, credentials)
            .await;

        let resp = {
            let mut state = self.lock_state();
            if state.generation != started {
                tracing::warn!(username = %credentials.username, "login finished after session was cleared; discarding");
                return match result {
                    Ok(_) => Err(SessionError::Superseded),
                    Err(e) => Err(e),
                };
            }

            let resp = match result {
                Ok(resp) => resp,
                Err(e) => {
                    tracing::warn!(username = %credentials.username, error = %e, "login failed");
                    self.clear_locked(&mut state);
                    return Err(e);
                }
            };

            if let Err(e) = self.persist_locked(&mut state, &resp) {
                tracing::error!(error = %e, "login succeeded but session could not be stored");
                self.clear_locked(&mut state);
                return Err(e.into());
            }
            resp
        };

        tracing::info!(username = %resp.logged_user.username, role = %resp.logged_user.role, "logged in");
        self.navigate(&self.after_good_login_url(&resp.logged_user.role));
        Ok(resp)
    }

    /// Clear the session now, then navigate to the post-logout destination
    /// once the configured delay has elapsed.
    pub async fn logout(&self) {
        self.clear();
        tracing::info!("logged out");
        sleep(self.config.logout_delay).await;
        self.navigate(&self.config.urls.after_logout);
    }

    /// The logged-in user's profile: the cached copy when present, else the
    /// profile cookie. `Ok(None)` when there is no session or no document.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cookie exists but cannot be decoded.
    pub fn logged_user(&self) -> Result<Option<LoggedUser>, SessionError> {
        if let Some(user) = self.lock_state().cached_user.clone() {
            return Ok(Some(user));
        }
        match self.cookies.get_object::<LoggedUser>(USER_COOKIE) {
            Ok(user) => Ok(user),
            Err(CookieError::DocumentUnavailable) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The stored token, or [`TOKEN_PLACEHOLDER`] when there is none.
    #[must_use]
    pub fn jwt_token(&self) -> String {
        match self.cookies.get(TOKEN_COOKIE) {
            Ok(token) if !token.is_empty() => token,
            Ok(_) | Err(CookieError::DocumentUnavailable) => TOKEN_PLACEHOLDER.to_owned(),
            Err(e) => {
                tracing::warn!(error = %e, "stored token unreadable");
                TOKEN_PLACEHOLDER.to_owned()
            }
        }
    }

    /// Whether a profile with a non-empty username is present. A corrupt
    /// profile counts as logged out.
    #[must_use]
    pub fn is_logged(&self) -> bool {
        match self.logged_user() {
            Ok(user) => user.is_some_and(|u| !u.username.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "stored profile unreadable; treating as logged out");
                false
            }
        }
    }

    fn persist_locked(&self, state: &mut SessionState, resp: &LoginResponse) -> Result<(), CookieError> {
        let options = &self.config.cookie_options;
        tolerate_detached(self.cookies.put(TOKEN_COOKIE, &resp.jwt_token, options))?;
        tolerate_detached(self.cookies.put_object(USER_COOKIE, &resp.logged_user, options))?;
        state.cached_user = Some(resp.logged_user.clone());
        Ok(())
    }

    fn clear(&self) {
        let mut state = self.lock_state();
        self.clear_locked(&mut state);
    }

    fn clear_locked(&self, state: &mut SessionState) {
        state.generation += 1;
        if let Err(e) = tolerate_detached(self.cookies.remove_all()) {
            tracing::warn!(error = %e, "failed to clear cookies");
        }
        state.cached_user = None;
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// No document means nothing to write; the in-memory profile still carries
/// the session for this page.
fn tolerate_detached(result: Result<(), CookieError>) -> Result<(), CookieError> {
    match result {
        Err(CookieError::DocumentUnavailable) => Ok(()),
        other => other,
    }
}

#[cfg(not(feature = "hydrate"))]
async fn sleep(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(feature = "hydrate")]
async fn sleep(delay: Duration) {
    if !delay.is_zero() {
        gloo_timers::future::sleep(delay).await;
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
