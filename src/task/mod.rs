//! Task lifecycle for the migration pathways agent
//!
//! A task is created in the `working` state when a `tasks/send` request
//! arrives and is moved exactly once more, to `completed` or `failed`.
//! The [`TaskStore`] owns every task; the [`TaskProcessor`] drives the
//! transitions.

pub mod processor;
pub mod store;
pub mod types;

pub use processor::{ProcessError, TaskProcessor};
pub use store::{StoreError, TaskStore};
pub use types::*;
