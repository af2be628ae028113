//! Login transport: the one outbound HTTP call this crate makes.

use super::SessionError;
use super::config::HttpTimeouts;
use super::types::{Credentials, LoginResponse};

/// Posts credentials and returns the backend's session payload.
///
/// The session service only ever talks to this trait, so tests and
/// non-HTTP hosts can substitute their own transport. Browser fetch futures
/// are not `Send`, so the wasm build drops that bound.
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
pub trait LoginBackend: Send + Sync {
    /// Exchange credentials for a token and profile.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the request fails, the backend answers
    /// with a non-success status, or the body is not a login response.
    async fn login(&self, url: &str, credentials: &Credentials) -> Result<LoginResponse, SessionError>;
}

/// [`LoginBackend`] over `reqwest`: `POST url` with a JSON
/// `{username, password}` body.
#[derive(Debug, Clone)]
pub struct HttpLoginBackend {
    http: reqwest::Client,
}

impl HttpLoginBackend {
    /// Build a client applying the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, SessionError> {
        let mut builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Some(request) = timeouts.request {
                builder = builder.timeout(request);
            }
            if let Some(connect) = timeouts.connect {
                builder = builder.connect_timeout(connect);
            }
        }
        #[cfg(target_arch = "wasm32")]
        let _ = timeouts;
        let http = builder
            .build()
            .map_err(|e| SessionError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http })
    }

    /// Wrap an existing client.
    #[must_use]
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
impl LoginBackend for HttpLoginBackend {
    async fn login(&self, url: &str, credentials: &Credentials) -> Result<LoginResponse, SessionError> {
        let resp = self
            .http
            .post(url)
            .json(credentials)
            .send()
            .await
            .map_err(|e| SessionError::Request(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| SessionError::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(SessionError::Rejected { status: status.as_u16(), body });
        }

        parse_login_response(&body)
    }
}

fn parse_login_response(body: &str) -> Result<LoginResponse, SessionError> {
    serde_json::from_str(body).map_err(|e| SessionError::Parse(e.to_string()))
}

#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;
