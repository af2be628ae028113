use super::*;

use std::sync::Mutex;

use crate::cookies::{CookieOptions, CookieStore, MemoryDocument};
use crate::session::{
    AuthUrls, Credentials, LoggedUser, LoginBackend, LoginResponse, Navigator, SessionConfig, SessionError,
    USER_COOKIE,
};

struct NoBackend;

#[async_trait::async_trait]
impl LoginBackend for NoBackend {
    async fn login(&self, _url: &str, _credentials: &Credentials) -> Result<LoginResponse, SessionError> {
        Err(SessionError::Request("offline".into()))
    }
}

#[derive(Default)]
struct RecordingNavigator {
    urls: Mutex<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn navigate_by_url(&self, url: &str) {
        self.urls.lock().unwrap().push(url.to_owned());
    }
}

impl RecordingNavigator {
    fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

fn session() -> (Arc<SessionService>, Arc<RecordingNavigator>) {
    let urls = AuthUrls {
        api_login_url: "/api/login".into(),
        after_good_login: "/{loggedUserRole}/dashboard".into(),
        after_bad_login: "/login".into(),
        after_logout: "/login".into(),
    };
    let nav = Arc::new(RecordingNavigator::default());
    let service = SessionService::new(
        SessionConfig::new(urls),
        CookieStore::new(Arc::new(MemoryDocument::new())),
        Arc::new(NoBackend),
        nav.clone(),
    );
    (Arc::new(service), nav)
}

fn sign_in(session: &SessionService, username: &str, role: &str) {
    let user = LoggedUser { username: username.into(), role: role.into(), ..LoggedUser::default() };
    session
        .cookies()
        .put_object(USER_COOKIE, &user, &CookieOptions::default())
        .unwrap();
}

// =============================================================================
// IsLoggedGuard
// =============================================================================

#[test]
fn is_logged_admits_logged_user_without_redirect() {
    let (session, nav) = session();
    sign_in(&session, "bob", "admin");
    assert!(IsLoggedGuard::new(session).can_activate("/admin/dashboard"));
    assert!(nav.urls().is_empty());
}

#[test]
fn is_logged_blocks_and_redirects_anonymous_user() {
    let (session, nav) = session();
    assert!(!IsLoggedGuard::new(session).can_activate("/admin/dashboard"));
    assert_eq!(nav.urls(), vec!["/login"]);
}

#[test]
fn is_logged_blocks_profile_without_username() {
    let (session, nav) = session();
    sign_in(&session, "", "admin");
    assert!(!IsLoggedGuard::new(session).can_activate("/admin"));
    assert_eq!(nav.urls(), vec!["/login"]);
}

#[test]
fn is_logged_blocks_corrupt_profile() {
    let (session, nav) = session();
    session
        .cookies()
        .put(USER_COOKIE, "not-json", &CookieOptions::default())
        .unwrap();
    assert!(!IsLoggedGuard::new(session).can_activate("/admin"));
    assert_eq!(nav.urls(), vec!["/login"]);
}

// =============================================================================
// HasRoleGuard
// =============================================================================

#[test]
fn has_role_admits_url_containing_role() {
    let (session, nav) = session();
    sign_in(&session, "bob", "admin");
    assert!(HasRoleGuard::new(session).can_activate("/admin/dashboard"));
    assert!(nav.urls().is_empty());
}

#[test]
fn has_role_blocks_other_role_and_redirects() {
    let (session, nav) = session();
    sign_in(&session, "bob", "admin");
    assert!(!HasRoleGuard::new(session).can_activate("/customer/orders"));
    assert_eq!(nav.urls(), vec!["/login"]);
}

#[test]
fn has_role_matches_by_substring() {
    let (session, _) = session();
    sign_in(&session, "bob", "admin");
    let guard = HasRoleGuard::new(session);
    assert!(guard.can_activate("/superadmin/tools"));
    assert!(guard.can_activate("/reports?owner=admin"));
}

#[test]
fn has_role_blocks_anonymous_user() {
    let (session, nav) = session();
    assert!(!HasRoleGuard::new(session).can_activate("/admin/dashboard"));
    assert_eq!(nav.urls(), vec!["/login"]);
}

// =============================================================================
// AutoLoginGuard
// =============================================================================

#[test]
fn auto_login_passes_anonymous_user_through() {
    let (session, nav) = session();
    assert!(AutoLoginGuard::new(session).can_activate("/login"));
    assert!(nav.urls().is_empty());
}

#[test]
fn auto_login_redirects_logged_user_but_still_activates() {
    let (session, nav) = session();
    sign_in(&session, "bob", "customer");
    assert!(AutoLoginGuard::new(session).can_activate("/login"));
    assert_eq!(nav.urls(), vec!["/customer/dashboard"]);
}

// =============================================================================
// run_guards
// =============================================================================

#[test]
fn run_guards_stops_at_first_block() {
    let (session, nav) = session();
    let is_logged = IsLoggedGuard::new(session.clone());
    let has_role = HasRoleGuard::new(session);
    assert!(!run_guards(&[&is_logged, &has_role], "/admin"));
    assert_eq!(nav.urls(), vec!["/login"]);
}

#[test]
fn run_guards_requires_every_guard() {
    let (session, nav) = session();
    sign_in(&session, "bob", "admin");
    let is_logged = IsLoggedGuard::new(session.clone());
    let has_role = HasRoleGuard::new(session);
    assert!(run_guards(&[&is_logged, &has_role], "/admin/users"));
    assert!(!run_guards(&[&is_logged, &has_role], "/customer"));
    assert_eq!(nav.urls(), vec!["/login"]);
}
