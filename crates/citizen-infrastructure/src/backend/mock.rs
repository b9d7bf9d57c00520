// ============================================================================
// Citizen Infrastructure - In-Memory Backend
// File: crates/citizen-infrastructure/src/backend/mock.rs
// ============================================================================
//! Stand-in for the hosted backend when it is not configured. Sign-up works,
//! sign-in only checks that the email exists, and data tables are empty.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use citizen_core::domain::{tables, AuthResponse, Session, User, UserMetadata};
use citizen_core::error::BackendError;
use citizen_core::ports::{BackendClient, BackendKind, SelectQuery, SignUpRequest};
use citizen_security::JwtService;
use citizen_shared::utils::mask_email;

/// Signs the mock's tokens. Development only; never accepted by a real backend.
pub const MOCK_JWT_SECRET: &str = "citizen-connect-development-only";
const MOCK_ACCESS_TTL_SECS: i64 = 60 * 60;
const MOCK_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct MockUser {
    pub id: Uuid,
    /// Rows inserted straight into `profiles` have no email.
    pub email: Option<String>,
    pub metadata: UserMetadata,
    pub created_at: DateTime<Utc>,
}

impl MockUser {
    fn to_user(&self) -> User {
        User {
            id: self.id,
            email: self.email.clone().unwrap_or_default(),
            metadata: self.metadata.clone(),
            created_at: Some(self.created_at),
        }
    }
}

/// Users known to the mock, shared by every mock client the factory hands out.
#[derive(Debug, Default)]
pub struct MockStore {
    users: Mutex<Vec<MockUser>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.lock().is_empty()
    }

    pub fn users(&self) -> Vec<MockUser> {
        self.users.lock().clone()
    }

    fn push(&self, user: MockUser) {
        self.users.lock().push(user);
    }

    fn find_by_email(&self, email: &str) -> Option<MockUser> {
        self.users
            .lock()
            .iter()
            .find(|u| {
                u.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email.trim()))
            })
            .cloned()
    }

    fn find_by_id(&self, id: &Uuid) -> Option<MockUser> {
        self.users.lock().iter().find(|u| &u.id == id).cloned()
    }
}

pub struct MockBackend {
    store: Arc<MockStore>,
    jwt: JwtService,
    access_token: Option<String>,
}

impl MockBackend {
    pub fn new(store: Arc<MockStore>) -> Self {
        Self {
            store,
            jwt: JwtService::new(
                MOCK_JWT_SECRET.to_string(),
                MOCK_ACCESS_TTL_SECS,
                MOCK_REFRESH_TTL_SECS,
            ),
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token;
        self
    }

    fn issue_session(&self, user: &MockUser) -> Result<Session, BackendError> {
        let email = user.email.as_deref().unwrap_or_default();
        let internal = |e: citizen_security::jwt::JwtError| BackendError::Upstream {
            status: 500,
            message: e.to_string(),
        };
        let access_token = self
            .jwt
            .generate_access_token(&user.id, email)
            .map_err(internal)?;
        let refresh_token = self
            .jwt
            .generate_refresh_token(&user.id, email)
            .map_err(internal)?;
        let expires_in = self.jwt.access_token_expiry();

        Ok(Session {
            access_token,
            refresh_token,
            expires_in,
            expires_at: Utc::now().timestamp() + expires_in,
            user: user.to_user(),
        })
    }

    fn resolve_token(&self, token: &str, token_type: &str) -> Result<MockUser, BackendError> {
        let claims = self
            .jwt
            .validate_token(token, token_type)
            .map_err(|e| {
                debug!("Mock rejected {} token: {}", token_type, e);
                BackendError::InvalidSession
            })?;
        Uuid::parse_str(&claims.sub)
            .ok()
            .and_then(|id| self.store.find_by_id(&id))
            .ok_or(BackendError::InvalidSession)
    }
}

#[async_trait]
impl BackendClient for MockBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Mock
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthResponse, BackendError> {
        let user = MockUser {
            id: Uuid::new_v4(),
            email: Some(request.email.trim().to_lowercase()),
            metadata: request.metadata.clone(),
            created_at: Utc::now(),
        };
        self.store.push(user.clone());
        info!("Mock sign-up for {}", mask_email(&request.email));

        let session = self.issue_session(&user)?;
        Ok(AuthResponse {
            user: user.to_user(),
            session: Some(session),
        })
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<AuthResponse, BackendError> {
        let user = self
            .store
            .find_by_email(email)
            .ok_or(BackendError::UserNotFound)?;
        let session = self.issue_session(&user)?;
        Ok(AuthResponse {
            user: user.to_user(),
            session: Some(session),
        })
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        _redirect_to: Option<String>,
    ) -> Result<(), BackendError> {
        debug!("Mock password reset for {}", mask_email(email));
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        if self.access_token.is_some() {
            debug!("Mock sign-out");
        }
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<User, BackendError> {
        self.resolve_token(access_token, "access")
            .map(|u| u.to_user())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, BackendError> {
        let user = self.resolve_token(refresh_token, "refresh")?;
        self.issue_session(&user)
    }

    async fn select(&self, query: &SelectQuery) -> Result<Vec<Value>, BackendError> {
        if query.table != tables::PROFILES {
            return Ok(Vec::new());
        }
        Ok(self
            .store
            .users()
            .iter()
            .map(|u| json!({ "id": u.id }))
            .collect())
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, BackendError> {
        if table != tables::PROFILES {
            return Ok(rows);
        }
        Ok(rows
            .into_iter()
            .map(|mut row| {
                let id = Uuid::new_v4();
                self.store.push(MockUser {
                    id,
                    email: row.get("email").and_then(Value::as_str).map(str::to_string),
                    metadata: UserMetadata::default(),
                    created_at: Utc::now(),
                });
                if let Value::Object(fields) = &mut row {
                    fields.insert("id".to_string(), json!(id));
                }
                row
            })
            .collect())
    }

    async fn rpc(&self, _function: &str, _params: Value) -> Result<Vec<Value>, BackendError> {
        Ok(vec![json!({ "now": Utc::now().to_rfc3339() })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    fn sign_up_request(email: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.to_string(),
            password: "whatever".into(),
            metadata: UserMetadata {
                full_name: Some("Rina".into()),
                ..Default::default()
            },
            email_redirect_to: None,
        }
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in_with_any_password() {
        let store = Arc::new(MockStore::new());
        let backend = MockBackend::new(store.clone());

        let signed_up = backend.sign_up(&sign_up_request("a@x.com")).await.unwrap();
        assert!(signed_up.session.is_some());
        assert_eq!(store.len(), 1);

        let signed_in = backend
            .sign_in_with_password("A@X.com", "not-the-password")
            .await
            .unwrap();
        assert_eq!(signed_in.user.id, signed_up.user.id);
        assert_eq!(signed_in.user.metadata.full_name.as_deref(), Some("Rina"));
    }

    #[tokio::test]
    async fn test_unknown_email_is_not_found() {
        let backend = MockBackend::new(Arc::new(MockStore::new()));
        let email: String = SafeEmail().fake();
        let err = backend
            .sign_in_with_password(&email, "pw")
            .await
            .unwrap_err();
        assert_eq!(err, BackendError::UserNotFound);
    }

    #[tokio::test]
    async fn test_issued_tokens_resolve() {
        let backend = MockBackend::new(Arc::new(MockStore::new()));
        let email: String = SafeEmail().fake();
        let session = backend
            .sign_up(&sign_up_request(&email))
            .await
            .unwrap()
            .session
            .unwrap();

        let user = backend.get_user(&session.access_token).await.unwrap();
        assert_eq!(user.email, email.to_lowercase());

        let refreshed = backend.refresh_session(&session.refresh_token).await.unwrap();
        assert_eq!(refreshed.user.id, user.id);
    }

    #[tokio::test]
    async fn test_foreign_tokens_are_invalid() {
        let backend = MockBackend::new(Arc::new(MockStore::new()));
        assert_eq!(
            backend.get_user("not-a-jwt").await.unwrap_err(),
            BackendError::InvalidSession
        );

        let foreign = JwtService::new("other-secret".into(), 3600, 3600)
            .generate_access_token(&Uuid::new_v4(), "x@y.com")
            .unwrap();
        assert_eq!(
            backend.get_user(&foreign).await.unwrap_err(),
            BackendError::InvalidSession
        );
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_an_access_token() {
        let backend = MockBackend::new(Arc::new(MockStore::new()));
        let session = backend
            .sign_up(&sign_up_request("a@x.com"))
            .await
            .unwrap()
            .session
            .unwrap();
        assert!(backend.get_user(&session.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn test_profiles_insert_grows_select() {
        let backend = MockBackend::new(Arc::new(MockStore::new()));
        let profiles = SelectQuery::from(tables::PROFILES);
        let before = backend.select(&profiles).await.unwrap().len();

        let inserted = backend
            .insert(tables::PROFILES, vec![json!({ "full_name": "Rina" })])
            .await
            .unwrap();
        assert!(inserted[0].get("id").is_some());
        assert_eq!(inserted[0]["full_name"], "Rina");

        let after = backend.select(&profiles).await.unwrap().len();
        assert_eq!(after, before + 1);
    }

    #[tokio::test]
    async fn test_other_tables_are_empty_and_echo() {
        let backend = MockBackend::new(Arc::new(MockStore::new()));
        let rows = vec![json!({ "name": "Ayu", "message": "Hello there, city hall" })];

        let echoed = backend
            .insert(tables::CONTACT_MESSAGES, rows.clone())
            .await
            .unwrap();
        assert_eq!(echoed, rows);
        assert!(backend
            .select(&SelectQuery::from(tables::CONTACT_MESSAGES))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_rpc_returns_server_time() {
        let backend = MockBackend::new(Arc::new(MockStore::new()));
        let rows = backend.rpc("anything", json!({})).await.unwrap();
        assert_eq!(rows.len(), 1);
        let now = rows[0]["now"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(now).is_ok());
    }

    #[tokio::test]
    async fn test_store_is_shared_between_clients() {
        let store = Arc::new(MockStore::new());
        MockBackend::new(store.clone())
            .sign_up(&sign_up_request("shared@example.com"))
            .await
            .unwrap();

        let other = MockBackend::new(store).with_access_token(Some("ignored".into()));
        assert!(other
            .sign_in_with_password("shared@example.com", "pw")
            .await
            .is_ok());
    }
}
