//! Ports to external collaborators

pub mod backend;

pub use backend::{BackendClient, BackendKind, Filter, SelectQuery, SignUpRequest};

#[cfg(test)]
pub use backend::MockBackendClient;
