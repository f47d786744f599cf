//! In-memory task store
//!
//! Single source of truth for every task the process has seen. The map is
//! guarded by one reader/writer lock and every critical section is a single
//! map operation; callers must never hold a guard across an `.await`.
//!
//! Tasks are never evicted, so memory grows with the number of distinct
//! task ids submitted over the process lifetime.

use super::types::Task;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("task store lock poisoned")]
    Poisoned,
}

/// Thread-safe task map shared by handle
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Arc<RwLock<HashMap<String, Task>>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the task stored under `task.id`
    pub fn put(&self, task: Task) -> Result<(), StoreError> {
        let mut tasks = self.tasks.write().map_err(|_| StoreError::Poisoned)?;
        debug!(task_id = %task.id, state = %task.state(), "Storing task");
        tasks.insert(task.id.clone(), task);
        Ok(())
    }

    /// Snapshot of the task stored under `id`
    pub fn get(&self, id: &str) -> Result<Task, StoreError> {
        let tasks = self.tasks.read().map_err(|_| StoreError::Poisoned)?;
        tasks
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.tasks.read().map(|tasks| tasks.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
