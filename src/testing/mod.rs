//! Testing utilities and mock implementations
//!
//! This module provides mock implementations for testing the migration agent
//! without requiring a live LLM endpoint.

pub mod mocks;

pub use mocks::*;
