//! Route guards consulted before a navigation completes.
//!
//! SYSTEM CONTEXT
//! ==============
//! A router calls [`Guard::can_activate`] with the target URL. Guards read
//! the current session fresh on every call and keep no state of their own;
//! a blocking guard performs its own redirect before returning `false`.
//!
//! Role checks are substring containment against the whole target URL, so
//! role `admin` also admits `/superadmin` and `/reports?from=admin`.

use std::sync::Arc;

use crate::session::SessionService;

pub trait Guard: Send + Sync {
    /// Whether navigation to `target_url` may proceed.
    fn can_activate(&self, target_url: &str) -> bool;
}

/// Evaluate `guards` in order, stopping at the first one that blocks.
pub fn run_guards(guards: &[&dyn Guard], target_url: &str) -> bool {
    guards.iter().all(|guard| guard.can_activate(target_url))
}

// =============================================================================
// IS LOGGED
// =============================================================================

/// Admits only a logged-in user; otherwise redirects to `after_bad_login`.
#[derive(Debug, Clone)]
pub struct IsLoggedGuard {
    session: Arc<SessionService>,
}

impl IsLoggedGuard {
    #[must_use]
    pub fn new(session: Arc<SessionService>) -> Self {
        Self { session }
    }
}

impl Guard for IsLoggedGuard {
    fn can_activate(&self, target_url: &str) -> bool {
        let logged = self.session.is_logged();
        if !logged {
            self.session.navigate(&self.session.config().urls.after_bad_login);
            tracing::error!(%target_url, "guard blocks route: user is not logged in; redirecting to login");
        }
        logged
    }
}

// =============================================================================
// HAS ROLE
// =============================================================================

/// Admits a user whose role appears in the target URL; otherwise redirects
/// to `after_bad_login`.
#[derive(Debug, Clone)]
pub struct HasRoleGuard {
    session: Arc<SessionService>,
}

impl HasRoleGuard {
    #[must_use]
    pub fn new(session: Arc<SessionService>) -> Self {
        Self { session }
    }
}

impl Guard for HasRoleGuard {
    fn can_activate(&self, target_url: &str) -> bool {
        let user = self.session.logged_user().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "stored profile unreadable; treating as logged out");
            None
        });
        let allowed = user.as_ref().is_some_and(|u| target_url.contains(u.role.as_str()));
        if !allowed {
            self.session.navigate(&self.session.config().urls.after_bad_login);
            tracing::error!(
                %target_url,
                role = user.as_ref().map_or("", |u| u.role.as_str()),
                "guard blocks route: user lacks the required role; redirecting to login"
            );
        }
        allowed
    }
}

// =============================================================================
// AUTO LOGIN
// =============================================================================

/// For the login page: never blocks, but sends an already logged-in user
/// straight to their post-login destination.
#[derive(Debug, Clone)]
pub struct AutoLoginGuard {
    session: Arc<SessionService>,
}

impl AutoLoginGuard {
    #[must_use]
    pub fn new(session: Arc<SessionService>) -> Self {
        Self { session }
    }
}

impl Guard for AutoLoginGuard {
    fn can_activate(&self, _target_url: &str) -> bool {
        if let Ok(Some(user)) = self.session.logged_user() {
            if !user.username.is_empty() {
                self.session.navigate(&self.session.after_good_login_url(&user.role));
            }
        }
        true
    }
}

#[cfg(test)]
#[path = "guards_test.rs"]
mod tests;
