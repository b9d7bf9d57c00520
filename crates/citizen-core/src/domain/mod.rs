//! # Citizen Core - Domain Module

pub mod user;
pub mod session;
pub mod route;
pub mod civic;

pub use user::{User, UserMetadata, UserRole};
pub use session::{AuthResponse, Session};
pub use route::RouteClass;
pub use civic::*;
