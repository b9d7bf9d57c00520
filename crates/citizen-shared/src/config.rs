//! Configuration management

use config::{Config, Environment, File};
use serde::Deserialize;
use std::fmt;
use url::Url;

use crate::constants::{BACKEND_URL_PLACEHOLDER, DEFAULT_BACKEND_TIMEOUT_SECS};
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    /// Public origin used to build password-reset links.
    #[serde(default)]
    pub site_url: Option<String>,
}

/// Hosted backend (auth + tables + RPC) credentials.
#[derive(Deserialize, Clone)]
pub struct BackendSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub anon_key: Option<String>,
    #[serde(default = "default_backend_timeout")]
    pub timeout_seconds: u64,
    /// Serve sessions from the in-memory backend with the session gate active.
    #[serde(default)]
    pub in_memory: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionSettings {
    #[serde(default)]
    pub secure_cookies: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    /// `json` or `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Daily-rolling file sink, disabled when unset.
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            directory: None,
        }
    }
}

fn default_backend_timeout() -> u64 {
    DEFAULT_BACKEND_TIMEOUT_SECS
}

fn default_log_format() -> String {
    "json".to_string()
}

/// Outcome of checking the backend credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendConfigStatus {
    Valid,
    MissingCredentials,
    PlaceholderDetected,
    InsecureScheme,
}

impl BackendConfigStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, BackendConfigStatus::Valid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendConfigStatus::Valid => "valid",
            BackendConfigStatus::MissingCredentials => "missing_credentials",
            BackendConfigStatus::PlaceholderDetected => "placeholder_detected",
            BackendConfigStatus::InsecureScheme => "insecure_scheme",
        }
    }
}

impl fmt::Display for BackendConfigStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl BackendSettings {
    pub fn new(url: Option<&str>, anon_key: Option<&str>) -> Self {
        Self {
            url: url.map(str::to_string),
            anon_key: anon_key.map(str::to_string),
            timeout_seconds: DEFAULT_BACKEND_TIMEOUT_SECS,
            in_memory: false,
        }
    }

    /// Classifies the credentials. Checks run in order: missing, placeholder,
    /// scheme, so a blank key on a placeholder URL reports `MissingCredentials`.
    pub fn status(&self) -> BackendConfigStatus {
        let url = self.url.as_deref().map(str::trim).unwrap_or_default();
        let key = self.anon_key.as_deref().map(str::trim).unwrap_or_default();

        if url.is_empty() || key.is_empty() {
            return BackendConfigStatus::MissingCredentials;
        }
        if url.contains(BACKEND_URL_PLACEHOLDER) {
            return BackendConfigStatus::PlaceholderDetected;
        }
        match Url::parse(url) {
            Ok(parsed) if parsed.scheme() == "https" && parsed.host_str().is_some() => {
                BackendConfigStatus::Valid
            }
            _ => BackendConfigStatus::InsecureScheme,
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim)
    }

    pub fn anon_key(&self) -> Option<&str> {
        self.anon_key.as_deref().map(str::trim)
    }
}

// The key never reaches the logs.
impl fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendSettings")
            .field("url", &self.url)
            .field("anon_key", &self.anon_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_seconds", &self.timeout_seconds)
            .field("in_memory", &self.in_memory)
            .finish()
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", env.clone())?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 3000)?
            .set_default("app.name", "citizen-connect")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials() {
        assert_eq!(
            BackendSettings::new(None, None).status(),
            BackendConfigStatus::MissingCredentials
        );
        assert_eq!(
            BackendSettings::new(Some("https://abc.example.co"), None).status(),
            BackendConfigStatus::MissingCredentials
        );
        assert_eq!(
            BackendSettings::new(Some("   "), Some("key")).status(),
            BackendConfigStatus::MissingCredentials
        );
    }

    #[test]
    fn test_placeholder_detected() {
        let settings = BackendSettings::new(Some("https://your-project.supabase.co"), Some("key"));
        assert_eq!(settings.status(), BackendConfigStatus::PlaceholderDetected);
    }

    #[test]
    fn test_insecure_scheme() {
        for url in ["http://abc.example.co", "abc.example.co", "ftp://abc.example.co", "https://"] {
            let settings = BackendSettings::new(Some(url), Some("key"));
            assert_eq!(settings.status(), BackendConfigStatus::InsecureScheme, "{}", url);
        }
    }

    #[test]
    fn test_valid() {
        let settings = BackendSettings::new(Some("https://abc.example.co"), Some("anon-key"));
        assert!(settings.status().is_valid());
    }

    #[test]
    fn test_debug_redacts_key() {
        let settings = BackendSettings::new(Some("https://abc.example.co"), Some("secret-key"));
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
