//! Stamps the stored token on outgoing requests.
//!
//! The header is set to [`SessionService::jwt_token`] verbatim, placeholder
//! included, replacing any existing value. There is no retry on 401 and no
//! refresh.

use std::sync::Arc;
use std::task::{Context, Poll};

use http::HeaderValue;
use http::header::{AUTHORIZATION, HeaderMap};

use crate::session::SessionService;

#[derive(Debug, Clone)]
pub struct TokenInterceptor {
    session: Arc<SessionService>,
}

impl TokenInterceptor {
    #[must_use]
    pub fn new(session: Arc<SessionService>) -> Self {
        Self { session }
    }

    /// Current `Authorization` value, or `None` if the stored token cannot
    /// be carried in a header.
    #[must_use]
    pub fn authorization(&self) -> Option<HeaderValue> {
        let token = self.session.jwt_token();
        match HeaderValue::from_str(&token) {
            Ok(mut value) => {
                value.set_sensitive(true);
                Some(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored token is not a valid header value");
                None
            }
        }
    }

    /// Set `Authorization` on `headers`. An unrepresentable token drops the
    /// header instead of leaving a stale one in place.
    pub fn apply(&self, headers: &mut HeaderMap) {
        match self.authorization() {
            Some(value) => {
                headers.insert(AUTHORIZATION, value);
            }
            None => {
                headers.remove(AUTHORIZATION);
            }
        }
    }

    /// Stamp a built `reqwest` request.
    #[must_use]
    pub fn intercept(&self, mut request: reqwest::Request) -> reqwest::Request {
        self.apply(request.headers_mut());
        request
    }
}

// =============================================================================
// TOWER LAYER
// =============================================================================

/// [`tower::Layer`] applying a [`TokenInterceptor`] to `http::Request`s.
#[derive(Debug, Clone)]
pub struct TokenLayer {
    interceptor: TokenInterceptor,
}

impl TokenLayer {
    #[must_use]
    pub fn new(session: Arc<SessionService>) -> Self {
        Self { interceptor: TokenInterceptor::new(session) }
    }
}

impl<S> tower::Layer<S> for TokenLayer {
    type Service = TokenService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TokenService { inner, interceptor: self.interceptor.clone() }
    }
}

#[derive(Debug, Clone)]
pub struct TokenService<S> {
    inner: S,
    interceptor: TokenInterceptor,
}

impl<S, B> tower::Service<http::Request<B>> for TokenService<S>
where
    S: tower::Service<http::Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: http::Request<B>) -> Self::Future {
        self.interceptor.apply(request.headers_mut());
        self.inner.call(request)
    }
}

#[cfg(test)]
#[path = "interceptor_test.rs"]
mod tests;
