//! JWT token handling

use chrono::{Duration, Utc};
use jsonwebtoken::{dangerous, decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
    #[error("Unexpected token type: {0}")]
    WrongTokenType(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Reads the claims of a JWT without checking its signature.
///
/// Only for deciding whether a token is worth sending upstream; the backend
/// remains the authority on validity.
pub fn peek_claims(token: &str) -> Option<TokenClaims> {
    dangerous::insecure_decode::<TokenClaims>(token)
        .map(|data| data.claims)
        .ok()
}

/// True when `exp` falls within `skew_seconds` from now. Unreadable tokens
/// are left for the backend to judge.
pub fn is_expired(token: &str, skew_seconds: i64) -> bool {
    match peek_claims(token) {
        Some(claims) => claims.exp <= Utc::now().timestamp() + skew_seconds,
        None => false,
    }
}

/// Issues and validates HS256 tokens. Used by the in-memory backend so its
/// sessions look like the hosted backend's.
pub struct JwtService {
    secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

impl JwtService {
    pub fn new(secret: String, access_expiry: i64, refresh_expiry: i64) -> Self {
        Self {
            secret,
            access_token_expiry: access_expiry,
            refresh_token_expiry: refresh_expiry,
        }
    }

    pub fn access_token_expiry(&self) -> i64 {
        self.access_token_expiry
    }

    pub fn generate_access_token(&self, user_id: &Uuid, email: &str) -> Result<String, JwtError> {
        self.generate_token(user_id, email, "access", self.access_token_expiry)
    }

    pub fn generate_refresh_token(&self, user_id: &Uuid, email: &str) -> Result<String, JwtError> {
        self.generate_token(user_id, email, "refresh", self.refresh_token_expiry)
    }

    fn generate_token(
        &self,
        user_id: &Uuid,
        email: &str,
        token_type: &str,
        expiry: i64,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            email: Some(email.to_string()),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expiry)).timestamp(),
            token_type: Some(token_type.to_string()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| JwtError::CreationError(e.to_string()))
    }

    pub fn validate_token(&self, token: &str, expected_type: &str) -> Result<TokenClaims, JwtError> {
        let claims = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| JwtError::ValidationError(e.to_string()))?;

        match claims.token_type.as_deref() {
            Some(t) if t == expected_type => Ok(claims),
            other => Err(JwtError::WrongTokenType(other.unwrap_or("none").to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret".to_string(), 3600, 86400)
    }

    #[test]
    fn test_issue_and_validate() {
        let id = Uuid::new_v4();
        let token = service().generate_access_token(&id, "a@x.com").unwrap();
        let claims = service().validate_token(&token, "access").unwrap();
        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.email.as_deref(), Some("a@x.com"));
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let token = service()
            .generate_refresh_token(&Uuid::new_v4(), "a@x.com")
            .unwrap();
        assert!(matches!(
            service().validate_token(&token, "access"),
            Err(JwtError::WrongTokenType(_))
        ));
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let other = JwtService::new("other".to_string(), 3600, 86400);
        let token = other.generate_access_token(&Uuid::new_v4(), "a@x.com").unwrap();
        assert!(service().validate_token(&token, "access").is_err());
    }

    #[test]
    fn test_peek_and_expiry() {
        let token = service().generate_access_token(&Uuid::new_v4(), "a@x.com").unwrap();
        let claims = peek_claims(&token).unwrap();
        assert_eq!(claims.token_type.as_deref(), Some("access"));
        assert!(!is_expired(&token, 30));
        assert!(is_expired(&token, 7200));

        let stale = JwtService::new("s".to_string(), -120, -120)
            .generate_access_token(&Uuid::new_v4(), "a@x.com")
            .unwrap();
        assert!(is_expired(&stale, 0));
    }

    #[test]
    fn test_opaque_tokens_are_not_judged() {
        assert!(peek_claims("opaque-token").is_none());
        assert!(!is_expired("opaque-token", 30));
    }

    #[test]
    fn test_peek_ignores_signature() {
        let id = Uuid::new_v4();
        let token = JwtService::new("someone-else".to_string(), 3600, 3600)
            .generate_refresh_token(&id, "b@x.com")
            .unwrap();
        let claims = peek_claims(&token).unwrap();
        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.token_type.as_deref(), Some("refresh"));
        assert!(peek_claims("a.b.c").is_none());
    }
}
