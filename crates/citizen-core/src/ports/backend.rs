//! Backend client trait (port)
//!
//! Calling code only ever sees this trait, so it never branches on whether
//! the hosted backend or the in-memory fallback is active.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::domain::{AuthResponse, Session, User, UserMetadata};
use crate::error::BackendError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Remote,
    Mock,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Remote => f.write_str("remote"),
            BackendKind::Mock => f.write_str("mock"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub metadata: UserMetadata,
    /// Where the confirmation email should send the user back to.
    pub email_redirect_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, String),
    /// Case-insensitive substring match.
    ILike(String, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Table-scoped select, built fluently:
/// `SelectQuery::from("guides").eq("category_slug", "identity").limit(20)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub table: String,
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl SelectQuery {
    pub fn from(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push(Filter::Eq(column.to_string(), value.to_string()));
        self
    }

    pub fn ilike(mut self, column: &str, needle: &str) -> Self {
        self.filters
            .push(Filter::ILike(column.to_string(), needle.to_string()));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackendClient: Send + Sync {
    fn kind(&self) -> BackendKind;

    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthResponse, BackendError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, BackendError>;

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: Option<String>,
    ) -> Result<(), BackendError>;

    /// Ends the session the client was created for.
    async fn sign_out(&self) -> Result<(), BackendError>;

    /// Session lookup: who does this access token belong to.
    async fn get_user(&self, access_token: &str) -> Result<User, BackendError>;

    /// Session refresh: trade a refresh token for a new session.
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, BackendError>;

    async fn select(&self, query: &SelectQuery) -> Result<Vec<Value>, BackendError>;

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, BackendError>;

    async fn rpc(&self, function: &str, params: Value) -> Result<Vec<Value>, BackendError>;
}
