//! Cookie store over a `document.cookie`-shaped surface.
//!
//! DESIGN
//! ======
//! Values are percent-encoded on write and decoded on read, so any Unicode
//! string survives a `put`/`get` round trip. Objects go through JSON first.
//! Lookups split the header on `;`, trim each pair and scan linearly; when a
//! name repeats the last pair wins.
//!
//! ERROR HANDLING
//! ==============
//! A missing document is reported as [`CookieError::DocumentUnavailable`]
//! rather than an empty result, and a stored object that no longer parses
//! as [`CookieError::Corrupt`], so callers can tell "no cookie" from "no
//! document" from "bad data". Nothing here panics.

mod document;
mod options;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use time::OffsetDateTime;

#[cfg(feature = "hydrate")]
pub use document::BrowserDocument;
pub use document::{CookieDocument, DetachedDocument, MemoryDocument};
pub use options::{CookieOptions, Expires, SameSite};

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    #[error("cookie document is not available")]
    DocumentUnavailable,
    #[error("cookie `{name}` is not valid UTF-8 once decoded: {source}")]
    Decode {
        name: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("cookie `{name}` holds malformed JSON: {source}")]
    Corrupt {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("cookie value could not be serialized: {0}")]
    Serialize(#[source] serde_json::Error),
}

// =============================================================================
// COOKIE STORE
// =============================================================================

#[derive(Clone)]
pub struct CookieStore {
    document: Arc<dyn CookieDocument>,
}

impl std::fmt::Debug for CookieStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieStore").finish_non_exhaustive()
    }
}

impl CookieStore {
    #[must_use]
    pub fn new(document: Arc<dyn CookieDocument>) -> Self {
        Self { document }
    }

    /// Store backed by a fresh [`MemoryDocument`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryDocument::new()))
    }

    /// Store backed by the page's `document.cookie`.
    #[cfg(feature = "hydrate")]
    #[must_use]
    pub fn browser() -> Self {
        Self::new(Arc::new(BrowserDocument))
    }

    /// Set a string cookie.
    pub fn put(&self, name: &str, value: &str, options: &CookieOptions) -> Result<(), CookieError> {
        self.put_at(name, value, options, OffsetDateTime::now_utc())
    }

    /// [`CookieStore::put`] with relative expiry resolved against `now`.
    fn put_at(&self, name: &str, value: &str, options: &CookieOptions, now: OffsetDateTime) -> Result<(), CookieError> {
        let encoded = urlencoding::encode(value);
        let assignment = options::assignment(name, &encoded, options, now);
        tracing::debug!(%name, "cookie put");
        self.write(&assignment)
    }

    /// Set a cookie holding `value` as JSON.
    pub fn put_object<T>(&self, name: &str, value: &T, options: &CookieOptions) -> Result<(), CookieError>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string(value).map_err(CookieError::Serialize)?;
        self.put(name, &json, options)
    }

    /// The raw cookie header, e.g. `a=1; b=2`.
    pub fn get_all(&self) -> Result<String, CookieError> {
        self.read()
    }

    /// Decoded value of `name`, or an empty string when absent.
    pub fn get(&self, name: &str) -> Result<String, CookieError> {
        let header = self.read()?;
        let Some(raw) = find_value(&header, name) else {
            return Ok(String::new());
        };
        urlencoding::decode(raw)
            .map(std::borrow::Cow::into_owned)
            .map_err(|source| CookieError::Decode { name: name.to_owned(), source })
    }

    /// JSON value of `name`. `Ok(None)` when the cookie is absent, empty or
    /// holds the literal `undefined`.
    pub fn get_object<T>(&self, name: &str) -> Result<Option<T>, CookieError>
    where
        T: DeserializeOwned,
    {
        let value = self.get(name)?;
        if value.is_empty() || value == "undefined" {
            return Ok(None);
        }
        match serde_json::from_str(&value) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(source) => {
                tracing::debug!(%name, error = %source, "cookie holds malformed JSON");
                Err(CookieError::Corrupt { name: name.to_owned(), source })
            }
        }
    }

    /// Whether a cookie named `name` is present (even with an empty value).
    pub fn exists(&self, name: &str) -> Result<bool, CookieError> {
        let header = self.read()?;
        Ok(find_value(&header, name).is_some())
    }

    /// Expire `name` immediately.
    pub fn remove(&self, name: &str) -> Result<(), CookieError> {
        tracing::debug!(%name, "cookie remove");
        self.write(&options::removal(name))
    }

    /// Expire every cookie currently visible.
    pub fn remove_all(&self) -> Result<(), CookieError> {
        let header = self.read()?;
        let names: Vec<&str> = pairs(&header)
            .map(|(name, _)| name)
            .filter(|name| !name.is_empty())
            .collect();
        tracing::debug!(count = names.len(), "cookie remove all");
        for name in names {
            self.write(&options::removal(name))?;
        }
        Ok(())
    }

    /// Blank the value of `name` without expiring it.
    pub fn empty(&self, name: &str) -> Result<(), CookieError> {
        tracing::debug!(%name, "cookie empty");
        self.write(&format!("{name}=;"))
    }

    fn read(&self) -> Result<String, CookieError> {
        self.document.cookie().ok_or_else(|| {
            tracing::debug!("cookie read skipped: no document");
            CookieError::DocumentUnavailable
        })
    }

    fn write(&self, assignment: &str) -> Result<(), CookieError> {
        if self.document.set_cookie(assignment) {
            Ok(())
        } else {
            tracing::debug!("cookie write skipped: no document");
            Err(CookieError::DocumentUnavailable)
        }
    }
}

/// Trimmed `(name, raw_value)` pairs of a cookie header.
fn pairs(header: &str) -> impl DoubleEndedIterator<Item = (&str, &str)> {
    header.split(';').map(str::trim).map(|pair| match pair.split_once('=') {
        Some((name, value)) => (name, value),
        None => (pair, ""),
    })
}

fn find_value<'h>(header: &'h str, name: &str) -> Option<&'h str> {
    pairs(header)
        .rev()
        .find(|(n, _)| *n == name)
        .map(|(_, value)| value)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
