// ============================================================================
// Citizen Core - Authentication Service
// File: crates/citizen-core/src/services/auth_service.rs
// ============================================================================
//! Sign-in, sign-up, password reset and sign-out on top of a backend client

use citizen_shared::utils::mask_email;
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use crate::domain::{AuthResponse, UserMetadata, UserRole};
use crate::error::{BackendError, DomainError};
use crate::ports::{BackendClient, SignUpRequest};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignInForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUpForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[validate(length(min = 2, max = 120))]
    pub full_name: String,
    #[validate(length(min = 6, max = 20))]
    #[serde(default)]
    pub phone: Option<String>,
    #[validate(length(min = 2, max = 80))]
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordForm {
    #[validate(email)]
    pub email: String,
}

pub struct AuthService;

impl AuthService {
    pub async fn sign_in(
        client: &dyn BackendClient,
        form: &SignInForm,
    ) -> Result<AuthResponse, DomainError> {
        form.validate()?;
        let email = form.email.trim().to_lowercase();
        info!("Sign-in attempt for {}", mask_email(&email));

        match client.sign_in_with_password(&email, &form.password).await {
            Ok(response) => {
                info!("Sign-in successful for {}", mask_email(&email));
                Ok(response)
            }
            Err(e) => {
                warn!("Sign-in failed for {}: {}", mask_email(&email), e);
                Err(e.into())
            }
        }
    }

    /// Self-registration yields `citizen`, or `volunteer` when asked for. It
    /// never grants the admin role; admins are promoted in the backend directly.
    pub async fn sign_up(
        client: &dyn BackendClient,
        form: &SignUpForm,
        email_redirect_to: Option<String>,
    ) -> Result<AuthResponse, DomainError> {
        form.validate()?;
        let email = form.email.trim().to_lowercase();
        info!("Sign-up attempt for {}", mask_email(&email));

        let role = match form.role.as_deref().map(UserRole::parse) {
            Some(UserRole::Volunteer) => UserRole::Volunteer,
            _ => UserRole::Citizen,
        };

        let request = SignUpRequest {
            email: email.clone(),
            password: form.password.clone(),
            metadata: UserMetadata {
                full_name: Some(form.full_name.trim().to_string()),
                phone: form.phone.clone(),
                city: form.city.clone(),
                role: Some(role.as_str().to_string()),
            },
            email_redirect_to,
        };

        let response = client.sign_up(&request).await?;
        info!(
            "Sign-up successful for {} (session issued: {})",
            mask_email(&email),
            response.session.is_some()
        );
        Ok(response)
    }

    /// Unknown addresses are not reported back to the caller.
    pub async fn reset_password(
        client: &dyn BackendClient,
        form: &ResetPasswordForm,
        redirect_to: Option<String>,
    ) -> Result<(), DomainError> {
        form.validate()?;
        let email = form.email.trim().to_lowercase();
        match client.reset_password_for_email(&email, redirect_to).await {
            Ok(()) => Ok(()),
            Err(BackendError::UserNotFound) => {
                info!("Password reset requested for unknown {}", mask_email(&email));
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Local sign-out always succeeds; a backend failure only means the
    /// server-side session lingers until it expires.
    pub async fn sign_out(client: &dyn BackendClient) {
        if let Err(e) = client.sign_out().await {
            warn!("Backend sign-out failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::ports::MockBackendClient;
    use uuid::Uuid;

    fn sign_up_form(role: Option<&str>) -> SignUpForm {
        SignUpForm {
            email: "Citizen@Example.com".into(),
            password: "secret-pass".into(),
            full_name: "Dewi Lestari".into(),
            phone: Some("08123456789".into()),
            city: Some("Yogyakarta".into()),
            role: role.map(str::to_string),
        }
    }

    fn response_for(request: &SignUpRequest) -> AuthResponse {
        AuthResponse {
            user: User {
                id: Uuid::new_v4(),
                email: request.email.clone(),
                metadata: request.metadata.clone(),
                created_at: None,
            },
            session: None,
        }
    }

    #[tokio::test]
    async fn test_sign_up_normalises_email_and_role() {
        let mut client = MockBackendClient::new();
        client
            .expect_sign_up()
            .withf(|req| {
                req.email == "citizen@example.com"
                    && req.metadata.role.as_deref() == Some("citizen")
                    && req.metadata.full_name.as_deref() == Some("Dewi Lestari")
            })
            .times(1)
            .returning(|req| Ok(response_for(req)));

        let response = AuthService::sign_up(&client, &sign_up_form(Some("admin")), None)
            .await
            .unwrap();
        assert!(!response.user.is_admin());
    }

    #[tokio::test]
    async fn test_sign_up_keeps_volunteer_role() {
        let mut client = MockBackendClient::new();
        client
            .expect_sign_up()
            .withf(|req| req.metadata.role.as_deref() == Some("volunteer"))
            .returning(|req| Ok(response_for(req)));

        assert!(AuthService::sign_up(&client, &sign_up_form(Some("Volunteer")), None)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_short_password_never_reaches_backend() {
        let mut client = MockBackendClient::new();
        client.expect_sign_up().never();

        let mut form = sign_up_form(None);
        form.password = "abc".into();
        let err = AuthService::sign_up(&client, &form, None).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_sign_in_failure_is_descriptive() {
        let mut client = MockBackendClient::new();
        client
            .expect_sign_in_with_password()
            .returning(|_, _| Err(BackendError::UserNotFound));

        let form = SignInForm {
            email: "ghost@example.com".into(),
            password: "whatever".into(),
        };
        let err = AuthService::sign_in(&client, &form).await.unwrap_err();
        assert_eq!(err.to_string(), "User not found");
    }

    #[tokio::test]
    async fn test_reset_password_hides_unknown_email() {
        let mut client = MockBackendClient::new();
        client
            .expect_reset_password_for_email()
            .returning(|_, _| Err(BackendError::UserNotFound));

        let form = ResetPasswordForm {
            email: "ghost@example.com".into(),
        };
        assert!(AuthService::reset_password(&client, &form, None).await.is_ok());
    }
}
