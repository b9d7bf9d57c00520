//! # Citizen Security
//!
//! Token handling, session cookies, and redirect target checks.

pub mod jwt;
pub mod session;
pub mod redirect;

pub use jwt::{JwtService, TokenClaims};
pub use session::{SessionCookieJar, SessionTokens};
