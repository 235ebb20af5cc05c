//! Common test utilities for hosten-console
//!
//! - Test fixtures and data factories
//! - A gated team service for out-of-order responses
//! - A gated selection store for slow writes
//! - Polling helper for spawned tasks
//!
//! # Usage
//!
//! ```rust
//! use crate::common::{fixtures, gated::GatedTeamService};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let service = GatedTeamService::new();
//!     let details = fixtures::DetailsFactory::for_role("team-a", TeamRole::Admin);
//!     // ...
//! }
//! ```

#![allow(dead_code)]

pub mod gated;

// Re-export commonly used items
pub use fixtures::{DetailsFactory, TeamFactory};
pub use gated::{GatedSelectionStore, GatedTeamService};

/// Wait until `condition` holds, yielding to the runtime in between
pub async fn eventually<F: Fn() -> bool>(condition: F) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
