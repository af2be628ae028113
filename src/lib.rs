//! Client-side session management for single-page applications.
//!
//! SYSTEM CONTEXT
//! ==============
//! A login form submits credentials through [`SessionService::login`], which
//! stores the backend's bearer token and user profile as cookies. Route
//! guards consult the same service before every navigation and the request
//! interceptor replays the stored token on every outgoing request.
//!
//! The browser is reached through two seams: [`CookieDocument`] (the
//! `document.cookie` string) and [`Navigator`] (the router). Native builds
//! use [`MemoryDocument`]; the `hydrate` feature adds
//! [`cookies::BrowserDocument`].

pub mod cookies;
pub mod guards;
pub mod interceptor;
pub mod session;

pub use cookies::{CookieDocument, CookieError, CookieOptions, CookieStore, Expires, MemoryDocument, SameSite};
pub use guards::{AutoLoginGuard, Guard, HasRoleGuard, IsLoggedGuard, run_guards};
pub use interceptor::{TokenInterceptor, TokenLayer, TokenService};
pub use session::{
    AuthUrls, ConfigError, Credentials, HttpLoginBackend, LoggedUser, LoginBackend, LoginResponse, Navigator,
    SessionConfig, SessionError, SessionService,
};
