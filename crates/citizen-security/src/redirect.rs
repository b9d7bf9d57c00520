//! Redirect targets for the login flow

use citizen_shared::constants::{DASHBOARD_PATH, LOGIN_PATH, NEXT_PARAM};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped inside the `next` query value. `/` stays literal.
const NEXT_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'`');

/// `/auth/login?next=<path>` for an unauthenticated hit on `path`.
pub fn login_url_for(path: &str) -> String {
    format!(
        "{}?{}={}",
        LOGIN_PATH,
        NEXT_PARAM,
        utf8_percent_encode(path, NEXT_VALUE)
    )
}

/// Post-login destination. Anything that is not a same-origin absolute path,
/// or that could not be sent as a `Location` header, falls back to the
/// dashboard.
pub fn safe_next(next: Option<&str>) -> String {
    match next.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.starts_with(LOGIN_PATH)
                && !path.chars().any(char::is_control) =>
        {
            path.to_string()
        }
        _ => DASHBOARD_PATH.to_string(),
    }
}
