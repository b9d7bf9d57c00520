//! # Citizen Core
//!
//! Domain entities, the backend client port, and the services built on it.

pub mod domain;
pub mod ports;
pub mod services;
pub mod error;

pub use domain::*;
pub use error::{BackendError, DomainError};
pub use ports::{BackendClient, BackendKind, SelectQuery};
