//! # Citizen Shared
//!
//! Configuration, telemetry, constants and small helpers for the
//! CitizenConnect workspace.

pub mod constants;
pub mod utils;
pub mod telemetry;
pub mod config;
pub mod error;

pub use config::{AppConfig, BackendConfigStatus, BackendSettings};
pub use error::AppError;
