//! Utility modules for the console
//!
//! - **error**: Crate-level error type
//! - **logging**: Subscriber setup

pub mod error;
pub mod logging;
