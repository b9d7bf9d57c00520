use std::sync::Arc;

use citizen_core::services::SessionService;
use citizen_infrastructure::BackendFactory;
use citizen_security::SessionCookieJar;
use citizen_shared::config::AppConfig;
use tower_cookies::Cookies;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: Arc<BackendFactory>,
    pub sessions: Arc<SessionService>,
}

impl AppState {
    pub fn new(config: AppConfig, backend: BackendFactory) -> Self {
        Self {
            config: Arc::new(config),
            backend: Arc::new(backend),
            sessions: Arc::new(SessionService::default()),
        }
    }

    pub fn cookie_jar(&self, cookies: Cookies) -> SessionCookieJar {
        SessionCookieJar::new(cookies, self.config.session.secure_cookies)
    }

    /// Absolute URL on the public site, when one is configured.
    pub fn site_link(&self, path: &str) -> Option<String> {
        self.config
            .app
            .site_url
            .as_deref()
            .map(|origin| format!("{}{}", origin.trim_end_matches('/'), path))
    }
}
