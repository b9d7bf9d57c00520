//! Session cookies

use citizen_shared::constants::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use time::Duration;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};

/// Raw token pair as carried by the request cookies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SessionTokens {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Reads and writes the session cookie pair on a request's cookie jar.
///
/// The jar is shared between the incoming request and the outgoing response,
/// so anything stored here is visible to later handlers in the same request
/// and is emitted as `Set-Cookie` on the response.
#[derive(Clone)]
pub struct SessionCookieJar {
    cookies: Cookies,
    secure: bool,
}

impl SessionCookieJar {
    pub fn new(cookies: Cookies, secure: bool) -> Self {
        Self { cookies, secure }
    }

    pub fn tokens(&self) -> SessionTokens {
        SessionTokens {
            access_token: self.read(ACCESS_TOKEN_COOKIE),
            refresh_token: self.read(REFRESH_TOKEN_COOKIE),
        }
    }

    /// `max_age_seconds` applies to the access token; the refresh token lives
    /// until the browser session ends or the backend rejects it.
    pub fn store(&self, access_token: &str, refresh_token: &str, max_age_seconds: i64) {
        self.cookies.add(self.build(
            ACCESS_TOKEN_COOKIE,
            access_token.to_string(),
            Some(Duration::seconds(max_age_seconds.max(0))),
        ));
        self.cookies
            .add(self.build(REFRESH_TOKEN_COOKIE, refresh_token.to_string(), None));
    }

    pub fn clear(&self) {
        for name in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
            if self.cookies.get(name).is_some() {
                self.cookies.remove(Cookie::build((name, "")).path("/").build());
            }
        }
    }

    fn read(&self, name: &str) -> Option<String> {
        self.cookies
            .get(name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }

    fn build(&self, name: &'static str, value: String, max_age: Option<Duration>) -> Cookie<'static> {
        let mut builder = Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure);
        if let Some(max_age) = max_age {
            builder = builder.max_age(max_age);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;
    use tower_cookies::CookieManagerLayer;

    async fn store_handler(cookies: Cookies) -> &'static str {
        let jar = SessionCookieJar::new(cookies, true);
        jar.store("access-1", "refresh-1", 3600);
        "ok"
    }

    async fn clear_handler(cookies: Cookies) -> String {
        let jar = SessionCookieJar::new(cookies, false);
        let before = jar.tokens();
        jar.clear();
        before.access_token.unwrap_or_default()
    }

    #[tokio::test]
    async fn test_store_sets_both_cookies() {
        let app = Router::new()
            .route("/", get(store_handler))
            .layer(CookieManagerLayer::new());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let set_cookies: Vec<String> = response
            .headers()
            .get_all("set-cookie")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(set_cookies.len(), 2);
        let access = set_cookies
            .iter()
            .find(|c| c.starts_with("cc-access-token=access-1"))
            .unwrap();
        assert!(access.contains("HttpOnly"));
        assert!(access.contains("Secure"));
        assert!(access.contains("Max-Age=3600"));
        assert!(set_cookies.iter().any(|c| c.starts_with("cc-refresh-token=refresh-1")));
    }

    #[tokio::test]
    async fn test_clear_expires_existing_cookies() {
        let app = Router::new()
            .route("/", get(clear_handler))
            .layer(CookieManagerLayer::new());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("cookie", "cc-access-token=old; cc-refresh-token=older")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let removals: Vec<String> = response
            .headers()
            .get_all("set-cookie")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(removals.len(), 2);
        assert!(removals.iter().all(|c| c.contains("Max-Age=0")));
    }

    #[test]
    fn test_empty_tokens() {
        assert!(SessionTokens::default().is_empty());
        let tokens = SessionTokens {
            access_token: None,
            refresh_token: Some("r".into()),
        };
        assert!(!tokens.is_empty());
    }
}
