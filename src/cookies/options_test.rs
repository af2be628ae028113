use super::*;
use time::macros::datetime;

const NOW: OffsetDateTime = datetime!(2024-03-01 12:00:00 UTC);

// =============================================================================
// assignment
// =============================================================================

#[test]
fn assignment_without_options_is_name_value_only() {
    let out = assignment("theme", "dark", &CookieOptions::default(), NOW);
    assert_eq!(out, "theme=dark;");
}

#[test]
fn assignment_renders_options_in_fixed_order() {
    let options = CookieOptions {
        domain: Some("example.com".into()),
        path: Some("/".into()),
        expires: Some(Expires::Days(3)),
        secure: true,
        http_only: true,
        same_site: Some(SameSite::Strict),
    };
    let out = assignment("auth_jwtToken", "JWT%20abc", &options, NOW);
    assert_eq!(
        out,
        "auth_jwtToken=JWT%20abc;domain=example.com;path=/;expires=Mon, 04 Mar 2024 12:00:00 GMT;secure;HttpOnly;SameSite=strict;"
    );
}

#[test]
fn assignment_skips_empty_domain_and_path() {
    let options = CookieOptions { domain: Some(String::new()), path: Some(String::new()), ..CookieOptions::default() };
    assert_eq!(assignment("a", "1", &options, NOW), "a=1;");
}

#[test]
fn assignment_skips_false_flags() {
    let options = CookieOptions { path: Some("/app".into()), same_site: Some(SameSite::Lax), ..CookieOptions::default() };
    assert_eq!(assignment("a", "1", &options, NOW), "a=1;path=/app;SameSite=lax;");
}

#[test]
fn assignment_uses_absolute_expiry_verbatim() {
    let options = CookieOptions {
        expires: Some(Expires::At(datetime!(2018-10-31 03:24:00 UTC))),
        ..CookieOptions::default()
    };
    assert_eq!(assignment("a", "1", &options, NOW), "a=1;expires=Wed, 31 Oct 2018 03:24:00 GMT;");
}

#[test]
fn assignment_converts_absolute_expiry_to_utc() {
    let options = CookieOptions {
        expires: Some(Expires::At(datetime!(2024-01-01 02:00:00 +2))),
        ..CookieOptions::default()
    };
    assert_eq!(assignment("a", "1", &options, NOW), "a=1;expires=Mon, 01 Jan 2024 00:00:00 GMT;");
}

#[test]
fn zero_day_expiry_writes_session_cookie() {
    let options = CookieOptions { expires: Some(Expires::Days(0)), ..CookieOptions::default() };
    assert_eq!(assignment("a", "1", &options, NOW), "a=1;");
}

// =============================================================================
// Expires
// =============================================================================

#[test]
fn negative_days_resolve_into_the_past() {
    let at = Expires::Days(-1).resolve(NOW).unwrap();
    assert_eq!(at, datetime!(2024-02-29 12:00:00 UTC));
}

#[test]
fn overflowing_days_resolve_to_none() {
    assert!(Expires::Days(i64::MAX).resolve(NOW).is_none());
}

// =============================================================================
// removal / SameSite
// =============================================================================

#[test]
fn removal_expires_in_the_past_on_root_path() {
    assert_eq!(removal("auth_loggedUser"), "auth_loggedUser=;expires=Thu, 01 Jan 1970 01:00:00 GMT; path=/;");
}

#[test]
fn same_site_parse_is_case_insensitive() {
    assert_eq!(SameSite::parse("Strict"), Some(SameSite::Strict));
    assert_eq!(SameSite::parse(" LAX "), Some(SameSite::Lax));
    assert_eq!(SameSite::parse("none"), Some(SameSite::None));
    assert_eq!(SameSite::parse("sometimes"), None);
}

#[test]
fn same_site_display_is_lowercase() {
    assert_eq!(SameSite::None.to_string(), "none");
}
