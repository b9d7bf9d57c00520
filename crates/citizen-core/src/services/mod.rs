//! Domain services (business logic)

pub mod auth_service;
pub mod civic_service;
pub mod session_service;

pub use auth_service::{AuthService, ResetPasswordForm, SignInForm, SignUpForm};
pub use civic_service::CivicService;
pub use session_service::{CookieUpdate, SessionResolution, SessionService};
