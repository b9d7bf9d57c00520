//! # Citizen Infrastructure
//!
//! Backend client implementations (adapters) and the factory that picks one.

pub mod backend;

pub use backend::{BackendFactory, MockBackend, MockStore, RemoteBackend};
