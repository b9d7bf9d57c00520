//! # Citizen API
//!
//! HTTP handlers, the session gate middleware, and router assembly.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
