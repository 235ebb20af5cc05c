//! Core data models
//!
//! Records exchanged with the backend. They are display/input data: the
//! authorization layer only consumes the role and permission fields.

pub mod process;
pub mod resource;
pub mod server;
pub mod team;
pub mod user;

// Re-export commonly used types
pub use process::*;
pub use resource::*;
pub use server::*;
pub use team::*;
pub use user::*;
