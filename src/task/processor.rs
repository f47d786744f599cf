//! Task lifecycle driver
//!
//! Runs one request through `working -> completed | failed`: the task is
//! stored as `working` before the generator is called, and stored again
//! with its terminal state once the generator returns. The store lock is
//! never held while the generator runs.
//!
//! Each run is spawned onto the runtime and only awaited by the caller, so
//! dropping the caller (a client hanging up mid-request) never leaves a task
//! stuck in `working`.

use super::store::{StoreError, TaskStore};
use super::types::{Message, Task};
use crate::error::sanitize_error_message;
use crate::llm::provider::LlmError;
use crate::observability::metrics::metrics;
use crate::pathways::PathwayGenerator;
use crate::profile::extract_profile;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, warn, Instrument};

#[derive(Debug, Error)]
pub enum ProcessError {
    /// The generator failed; the task has been persisted as `failed`
    #[error("pathway generation failed: {source}")]
    Generation {
        task: Box<Task>,
        #[source]
        source: LlmError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The spawned run panicked or the runtime shut down under it
    #[error("task processing aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

impl ProcessError {
    /// The persisted failed task, when there is one
    pub fn failed_task(&self) -> Option<&Task> {
        match self {
            ProcessError::Generation { task, .. } => Some(&**task),
            ProcessError::Store(_) | ProcessError::Aborted(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct TaskProcessor {
    store: TaskStore,
    generator: Arc<dyn PathwayGenerator>,
}

impl TaskProcessor {
    pub fn new(store: TaskStore, generator: Arc<dyn PathwayGenerator>) -> Self {
        Self { store, generator }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn get_task(&self, task_id: &str) -> Result<Task, StoreError> {
        self.store.get(task_id)
    }

    /// Process one message under `task_id`
    ///
    /// Exactly two store writes happen on success or generator failure: the
    /// `working` entry and the terminal entry. Reusing an id overwrites the
    /// previous task.
    pub async fn process_task(&self, task_id: &str, message: &Message) -> Result<Task, ProcessError> {
        let span = crate::task_span!(task_id = %task_id);
        let processor = self.clone();
        let task_id = task_id.to_string();
        let message = message.clone();

        tokio::spawn(async move { processor.run(&task_id, &message).await }.instrument(span)).await?
    }

    async fn run(&self, task_id: &str, message: &Message) -> Result<Task, ProcessError> {
        let started = Instant::now();
        metrics().task_processing_started();

        let query = message.query_text();
        let task = Task::working(task_id);
        if let Err(e) = self.store.put(task.clone()) {
            metrics().task_processing_failed(started.elapsed());
            error!(error = %e, "Failed to store working task");
            return Err(e.into());
        }
        info!(state = %task.state(), query_length = query.len(), "Task accepted");

        let profile = extract_profile(&query);
        info!(
            profession = %profile.profession,
            origin = %profile.origin,
            destination = %profile.destination,
            budget = profile.budget,
            "Extracted user profile"
        );

        match self.generator.generate(&profile).await {
            Ok(text) => {
                let task = task.complete(&text);
                self.finish(&task, started)?;
                metrics().task_processing_completed(started.elapsed());
                info!(state = %task.state(), artifacts = task.artifacts.len(), "Task completed");
                Ok(task)
            }
            Err(source) => {
                let reason = format!(
                    "Failed to generate pathways: {}",
                    sanitize_error_message(&source.to_string())
                );
                let task = task.fail(&reason);
                self.finish(&task, started)?;
                metrics().task_processing_failed(started.elapsed());
                warn!(state = %task.state(), error = %reason, "Task failed");
                Err(ProcessError::Generation {
                    task: Box::new(task),
                    source,
                })
            }
        }
    }

    fn finish(&self, task: &Task, started: Instant) -> Result<(), ProcessError> {
        self.store.put(task.clone()).map_err(|e| {
            metrics().task_processing_failed(started.elapsed());
            error!(error = %e, state = %task.state(), "Failed to store terminal task");
            ProcessError::from(e)
        })
    }
}
