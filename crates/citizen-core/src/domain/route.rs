//! Request path classification for the session gate

use citizen_shared::constants::{AUTH_PREFIXES, PROTECTED_PREFIXES};

const STATIC_PREFIXES: [&str; 3] = ["/static/", "/assets/", "/_next/"];
const STATIC_EXTENSIONS: [&str; 7] = [".svg", ".png", ".jpg", ".jpeg", ".gif", ".webp", ".ico"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Needs a session before the handler runs.
    Protected,
    /// Sign-in / sign-up / reset pages, only for anonymous visitors.
    Auth,
    Public,
}

impl RouteClass {
    /// Exactly one class per path. The prefix sets are disjoint, so a path can
    /// never trigger both redirect rules.
    pub fn classify(path: &str) -> Self {
        if PROTECTED_PREFIXES.iter().any(|p| matches_prefix(path, p)) {
            RouteClass::Protected
        } else if AUTH_PREFIXES.iter().any(|p| matches_prefix(path, p)) {
            RouteClass::Auth
        } else {
            RouteClass::Public
        }
    }
}

/// Static files skip the session gate entirely. An image extension alone is
/// not enough under a protected prefix.
pub fn is_static_asset(path: &str) -> bool {
    if path == "/favicon.ico" || STATIC_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return true;
    }
    let lower = path.to_ascii_lowercase();
    STATIC_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
        && RouteClass::classify(path) != RouteClass::Protected
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}
