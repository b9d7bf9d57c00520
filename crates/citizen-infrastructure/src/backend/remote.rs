// ============================================================================
// Citizen Infrastructure - Remote Backend Client
// File: crates/citizen-infrastructure/src/backend/remote.rs
// ============================================================================
//! Client for a Supabase-compatible backend: GoTrue auth under `/auth/v1`
//! and PostgREST data under `/rest/v1`.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

use citizen_core::domain::{AuthResponse, Session, User};
use citizen_core::error::BackendError;
use citizen_core::ports::{BackendClient, BackendKind, Filter, SelectQuery, SignUpRequest};

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

/// Request-scoped: clone the template and attach the caller's access token
/// with [`RemoteBackend::with_access_token`].
#[derive(Clone)]
pub struct RemoteBackend {
    http: Client,
    base_url: Url,
    anon_key: String,
    access_token: Option<String>,
}

impl RemoteBackend {
    pub fn new(http: Client, mut base_url: Url, anon_key: String) -> Self {
        // Url::join replaces the last segment unless the base ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            http,
            base_url,
            anon_key,
            access_token: None,
        }
    }

    pub fn build_http_client(timeout_seconds: u64) -> Result<Client, BackendError> {
        Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))
    }

    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token;
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::Transport(format!("invalid endpoint {}: {}", path, e)))
    }

    /// Attaches the anon key and a bearer: the caller's token when present.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.request_with_bearer(method, url, bearer)
    }

    fn request_with_bearer(&self, method: Method, url: Url, bearer: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, BackendError> {
        builder.send().await.map_err(|e| {
            error!("Backend request failed: {}", e);
            BackendError::Transport(e.to_string())
        })
    }

    async fn token_grant<T: Serialize>(
        &self,
        grant_type: &str,
        body: &T,
        rejection: BackendError,
    ) -> Result<Session, BackendError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);

        let response = self
            .send(self.request_with_bearer(Method::POST, url, &self.anon_key).json(body))
            .await?;
        match response.status() {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                let body = response.text().await.unwrap_or_default();
                debug!("Token grant {} rejected: {}", grant_type, error_message(&body));
                Err(rejection)
            }
            _ => parse_session(read_json(response).await?),
        }
    }
}

#[async_trait]
impl BackendClient for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthResponse, BackendError> {
        let mut url = self.endpoint("auth/v1/signup")?;
        if let Some(redirect) = &request.email_redirect_to {
            url.query_pairs_mut().append_pair("redirect_to", redirect);
        }
        let body = json!({
            "email": request.email,
            "password": request.password,
            "data": request.metadata,
        });

        let response = self
            .send(self.request_with_bearer(Method::POST, url, &self.anon_key).json(&body))
            .await?;
        let value = read_json(response).await?;

        // With email confirmation on, the backend answers with the bare user.
        if value.get("access_token").is_some() {
            let session = parse_session(value)?;
            Ok(AuthResponse {
                user: session.user.clone(),
                session: Some(session),
            })
        } else {
            let user = value.get("user").cloned().unwrap_or(value);
            Ok(AuthResponse {
                user: decode(user)?,
                session: None,
            })
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, BackendError> {
        let session = self
            .token_grant(
                "password",
                &PasswordGrant { email, password },
                BackendError::InvalidCredentials,
            )
            .await?;
        Ok(AuthResponse {
            user: session.user.clone(),
            session: Some(session),
        })
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: Option<String>,
    ) -> Result<(), BackendError> {
        let mut url = self.endpoint("auth/v1/recover")?;
        if let Some(redirect) = redirect_to {
            url.query_pairs_mut().append_pair("redirect_to", &redirect);
        }
        let response = self
            .send(
                self.request_with_bearer(Method::POST, url, &self.anon_key)
                    .json(&json!({ "email": email })),
            )
            .await?;
        check_status(response).await.map(|_| ())
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let Some(token) = self.access_token.as_deref() else {
            return Ok(());
        };
        let url = self.endpoint("auth/v1/logout")?;
        let response = self
            .send(self.request_with_bearer(Method::POST, url, token))
            .await?;
        check_status(response).await.map(|_| ())
    }

    async fn get_user(&self, access_token: &str) -> Result<User, BackendError> {
        let url = self.endpoint("auth/v1/user")?;
        let response = self
            .send(self.request_with_bearer(Method::GET, url, access_token))
            .await?;
        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(BackendError::InvalidSession);
        }
        decode(read_json(response).await?)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, BackendError> {
        self.token_grant(
            "refresh_token",
            &RefreshGrant { refresh_token },
            BackendError::InvalidSession,
        )
        .await
    }

    async fn select(&self, query: &SelectQuery) -> Result<Vec<Value>, BackendError> {
        let mut url = self.endpoint(&format!("rest/v1/{}", query.table))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", &query.columns);
            for filter in &query.filters {
                match filter {
                    Filter::Eq(column, value) => {
                        pairs.append_pair(column, &format!("eq.{}", value));
                    }
                    Filter::ILike(column, needle) => {
                        pairs.append_pair(column, &format!("ilike.*{}*", needle));
                    }
                }
            }
            if let Some(order) = &query.order {
                let direction = if order.ascending { "asc" } else { "desc" };
                pairs.append_pair("order", &format!("{}.{}", order.column, direction));
            }
            if let Some(limit) = query.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }

        let response = self.send(self.request(Method::GET, url)).await?;
        into_rows(read_json(response).await?)
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, BackendError> {
        let url = self.endpoint(&format!("rest/v1/{}", table))?;
        let response = self
            .send(
                self.request(Method::POST, url)
                    .header("Prefer", "return=representation")
                    .json(&rows),
            )
            .await?;
        into_rows(read_json(response).await?)
    }

    async fn rpc(&self, function: &str, params: Value) -> Result<Vec<Value>, BackendError> {
        let url = self.endpoint(&format!("rest/v1/rpc/{}", function))?;
        let response = self
            .send(self.request(Method::POST, url).json(&params))
            .await?;
        into_rows(read_json(response).await?)
    }
}

async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Unauthorized(message),
        _ => {
            if status.is_server_error() {
                error!("Backend error {}: {}", status, message);
            }
            BackendError::Upstream {
                status: status.as_u16(),
                message,
            }
        }
    })
}

async fn read_json(response: Response) -> Result<Value, BackendError> {
    let response = check_status(response).await?;
    let text = response
        .text()
        .await
        .map_err(|e| BackendError::Transport(e.to_string()))?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Pulls a human-readable message out of a GoTrue or PostgREST error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["msg", "message", "error_description", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, BackendError> {
    serde_json::from_value(value).map_err(|e| BackendError::Decode(e.to_string()))
}

fn parse_session(value: Value) -> Result<Session, BackendError> {
    let mut session: Session = decode(value)?;
    if session.expires_at == 0 {
        session.expires_at = Utc::now().timestamp() + session.expires_in;
    }
    Ok(session)
}

/// Functions may return a scalar, an object or a set; callers always get rows.
fn into_rows(value: Value) -> Result<Vec<Value>, BackendError> {
    Ok(match value {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        other => vec![other],
    })
}
