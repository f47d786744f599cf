//! Migration Pathways Agent
//!
//! An agent-to-agent (A2A) JSON-RPC service that turns a free-text
//! relocation question into a tracked task and answers it with a single
//! LLM-generated migration pathway.
//!
//! # Overview
//!
//! - [`task`]: task types, the in-memory [`TaskStore`] and the
//!   [`TaskProcessor`] that drives `working -> completed | failed`
//! - [`profile`]: keyword extraction of profession, origin, destination and
//!   budget from the query
//! - [`pathways`]: prompt construction and the [`PathwayGenerator`] seam
//! - [`llm`]: provider abstraction and the Gemini client
//! - [`protocol`]: JSON-RPC envelopes, method decoding, the [`Dispatcher`]
//!   and the agent card
//! - [`server`]: warp routes and graceful shutdown
//!
//! # Quick Start
//!
//! ```rust
//! use migration_agent::protocol::{Dispatcher, RpcRequest};
//! use migration_agent::task::{TaskProcessor, TaskStore};
//! use migration_agent::testing::MockPathwayGenerator;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let generator = Arc::new(MockPathwayGenerator::responding("# Best Migration Option: Express Entry"));
//! let processor = Arc::new(TaskProcessor::new(TaskStore::new(), generator));
//! let dispatcher = Dispatcher::new(processor);
//!
//! let request = RpcRequest::new(
//!     "tasks/send",
//!     json!({"message": {"role": "user", "parts": [{"type": "text", "text": "nurse from India to Canada"}]}}),
//!     1,
//! );
//! let response = dispatcher.handle_request(request).await;
//! assert_eq!(response.result.unwrap()["status"]["state"], "completed");
//! # });
//! ```

pub mod config;
pub mod error;
pub mod llm;
pub mod observability;
pub mod pathways;
pub mod profile;
pub mod protocol;
pub mod server;
pub mod task;
pub mod testing;

pub use config::{AgentConfig, ConfigError};
pub use error::{AgentError, AgentResult};
pub use pathways::{LlmPathwayGenerator, PathwayGenerator};
pub use profile::{extract_profile, UserProfile};
pub use protocol::Dispatcher;
pub use task::{Task, TaskProcessor, TaskState, TaskStore};
