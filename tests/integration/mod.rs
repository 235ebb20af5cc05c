//! Integration tests for hosten-console
//!
//! These tests verify the interaction between the team context, its
//! backends and the persistence layer.

pub mod context_tests;
pub mod mock_backend_tests;
