//! Core functionality for the console
//!
//! Data models shared with the backend, the user notification bus and form
//! validation.

pub mod alerts;
pub mod models;
pub mod validation;

pub use alerts::{Alert, AlertBus, AlertKind, AlertReceiver};
