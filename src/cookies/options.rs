//! Cookie attributes and assignment-string rendering.
//!
//! An assignment is the string a script writes to `document.cookie`:
//! `name=value;` followed by each present attribute in a fixed order
//! (domain, path, expires, secure, HttpOnly, SameSite), every segment
//! terminated by `;`.

use std::fmt;

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, UtcOffset};

/// RFC 1123 date as produced by `Date.prototype.toUTCString`.
const UTC_STRING: &[BorrowedFormatItem<'static>] =
    format_description!("[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT");

/// Expiry written by removals; any instant in the past works.
const EXPIRED: &str = "Thu, 01 Jan 1970 01:00:00 GMT";

/// Cookie lifetime: a relative number of days or an absolute instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expires {
    /// Days from the moment the cookie is written. Zero means a session cookie.
    Days(i64),
    /// Used verbatim.
    At(OffsetDateTime),
}

impl Expires {
    /// Resolve to an absolute instant. `None` for a zero-day expiry or one
    /// outside the representable date range.
    #[must_use]
    pub fn resolve(self, now: OffsetDateTime) -> Option<OffsetDateTime> {
        match self {
            Self::Days(0) => None,
            Self::Days(days) => days
                .checked_mul(86_400)
                .and_then(|secs| now.checked_add(Duration::seconds(secs))),
            Self::At(at) => Some(at),
        }
    }
}

/// Cross-site send policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    #[default]
    Strict,
    Lax,
    None,
}

impl SameSite {
    /// Parse a policy name, case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "lax" => Some(Self::Lax),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Strict => "strict",
            Self::Lax => "lax",
            Self::None => "none",
        })
    }
}

/// Attributes appended to a cookie assignment. Absent or empty fields are
/// skipped.
///
/// `http_only` is rendered when set, but a script cannot create an
/// HttpOnly cookie through `document.cookie`; browsers drop such writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieOptions {
    pub domain: Option<String>,
    pub path: Option<String>,
    pub expires: Option<Expires>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

impl CookieOptions {
    /// Append the attribute segments to `out`.
    pub(crate) fn write_to(&self, out: &mut String, now: OffsetDateTime) {
        if let Some(domain) = self.domain.as_deref().filter(|d| !d.is_empty()) {
            push_segment(out, &format!("domain={domain}"));
        }
        if let Some(path) = self.path.as_deref().filter(|p| !p.is_empty()) {
            push_segment(out, &format!("path={path}"));
        }
        if let Some(at) = self.expires.and_then(|e| e.resolve(now)) {
            match utc_string(at) {
                Ok(rendered) => push_segment(out, &format!("expires={rendered}")),
                Err(e) => tracing::warn!(error = %e, "cookie expiry not representable; writing session cookie"),
            }
        }
        if self.secure {
            push_segment(out, "secure");
        }
        if self.http_only {
            push_segment(out, "HttpOnly");
        }
        if let Some(same_site) = self.same_site {
            push_segment(out, &format!("SameSite={same_site}"));
        }
    }
}

fn push_segment(out: &mut String, segment: &str) {
    out.push_str(segment);
    out.push(';');
}

/// Render an instant as `Thu, 01 Jan 1970 00:00:00 GMT`.
pub(crate) fn utc_string(at: OffsetDateTime) -> Result<String, time::error::Format> {
    at.to_offset(UtcOffset::UTC).format(UTC_STRING)
}

/// Build a complete assignment for an already-encoded value.
pub(crate) fn assignment(name: &str, encoded_value: &str, options: &CookieOptions, now: OffsetDateTime) -> String {
    let mut out = format!("{name}={encoded_value};");
    options.write_to(&mut out, now);
    out
}

/// Assignment that expires `name` immediately.
pub(crate) fn removal(name: &str) -> String {
    format!("{name}=;expires={EXPIRED}; path=/;")
}

#[cfg(test)]
#[path = "options_test.rs"]
mod tests;
