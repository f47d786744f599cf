//! LLM provider abstraction layer
//!
//! This module provides a provider-agnostic interface for the model calls
//! behind pathway generation.

pub mod provider;
pub mod providers;

pub use provider::*;
pub use providers::*;
