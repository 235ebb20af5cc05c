//! Backend SDK
//!
//! Typed access to the dashboard REST API. Team operations go through the
//! [`TeamService`] trait so the authorization layer can run against the HTTP
//! client or the in-memory [`MockTeamBackend`].

pub mod client;
pub mod config;
pub mod errors;
pub mod mock;
pub mod services;

// Re-exports for convenience
pub use client::ApiClient;
pub use config::{ClientConfig, ConfigBuilder, DEFAULT_BASE_URL};
pub use errors::{ApiError, ErrorClass, Result};
pub use mock::MockTeamBackend;
pub use services::TeamService;
