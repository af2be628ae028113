//! The `document.cookie` seam.
//!
//! SYSTEM CONTEXT
//! ==============
//! Browsers expose cookies as one string: reading yields `a=1; b=2`,
//! assigning writes a single cookie with attributes. [`CookieStore`] only
//! talks to that surface, so the same store runs in the browser, in SSR and
//! in tests.
//!
//! [`CookieStore`]: super::CookieStore

use std::sync::Mutex;

use time::OffsetDateTime;

/// A cookie string source/sink shaped like `document.cookie`.
pub trait CookieDocument: Send + Sync {
    /// The full cookie header, or `None` when no document is reachable.
    fn cookie(&self) -> Option<String>;

    /// Apply one assignment. Returns `false` when no document is reachable.
    fn set_cookie(&self, assignment: &str) -> bool;
}

// =============================================================================
// IN-MEMORY DOCUMENT
// =============================================================================

/// Native stand-in for a browser cookie jar.
///
/// Applies assignments the way a browser does for a single origin: a later
/// write replaces the cookie of the same name in place, and a write whose
/// `expires` is in the past (or whose `max-age` is not positive) deletes it.
/// Domain and path scoping are not modeled.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    jar: Mutex<Vec<(String, String)>>,
}

impl MemoryDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cookies currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, String)>> {
        self.jar
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn apply_at(&self, assignment: &str, now: OffsetDateTime) {
        let parsed = match ::cookie::Cookie::parse(assignment) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(error = %e, assignment, "ignoring unparsable cookie assignment");
                return;
            }
        };

        let expired = parsed.expires_datetime().is_some_and(|at| at <= now)
            || parsed.max_age().is_some_and(|age| age.is_zero() || age.is_negative());

        let mut jar = self.lock();
        let existing = jar.iter().position(|(name, _)| name == parsed.name());
        match (existing, expired) {
            (Some(idx), true) => {
                jar.remove(idx);
            }
            (None, true) => {}
            (Some(idx), false) => jar[idx].1 = parsed.value().to_owned(),
            (None, false) => jar.push((parsed.name().to_owned(), parsed.value().to_owned())),
        }
    }
}

impl CookieDocument for MemoryDocument {
    fn cookie(&self) -> Option<String> {
        let jar = self.lock();
        let pairs: Vec<String> = jar
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        Some(pairs.join("; "))
    }

    fn set_cookie(&self, assignment: &str) -> bool {
        self.apply_at(assignment, OffsetDateTime::now_utc());
        true
    }
}

// =============================================================================
// DETACHED DOCUMENT
// =============================================================================

/// A context with no document at all (server rendering, workers).
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedDocument;

impl CookieDocument for DetachedDocument {
    fn cookie(&self) -> Option<String> {
        None
    }

    fn set_cookie(&self, _assignment: &str) -> bool {
        false
    }
}

// =============================================================================
// BROWSER DOCUMENT
// =============================================================================

/// The page's real `document.cookie`.
#[cfg(feature = "hydrate")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserDocument;

#[cfg(feature = "hydrate")]
impl BrowserDocument {
    fn html_document() -> Option<web_sys::HtmlDocument> {
        use wasm_bindgen::JsCast;

        web_sys::window()?
            .document()?
            .dyn_into::<web_sys::HtmlDocument>()
            .ok()
    }
}

#[cfg(feature = "hydrate")]
impl CookieDocument for BrowserDocument {
    fn cookie(&self) -> Option<String> {
        Self::html_document()?.cookie().ok()
    }

    fn set_cookie(&self, assignment: &str) -> bool {
        Self::html_document().is_some_and(|doc| doc.set_cookie(assignment).is_ok())
    }
}

#[cfg(test)]
#[path = "document_test.rs"]
mod tests;
