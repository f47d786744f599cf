//! JSON-RPC dispatcher
//!
//! Decodes an envelope, routes it by method and always produces exactly one
//! response carrying the request's id. Protocol errors never reach the task
//! store; generator failures come back as a successful response holding the
//! failed task.

use super::jsonrpc::{RpcId, RpcRequest, RpcResponse};
use super::methods::{RpcMethod, SendParams};
use crate::error::AgentError;
use crate::observability::metrics::metrics;
use crate::task::{ProcessError, Task, TaskProcessor};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn, Instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct Dispatcher {
    processor: Arc<TaskProcessor>,
}

impl Dispatcher {
    pub fn new(processor: Arc<TaskProcessor>) -> Self {
        Self { processor }
    }

    pub fn processor(&self) -> &Arc<TaskProcessor> {
        &self.processor
    }

    /// Handle a raw request body
    pub async fn handle_body(&self, body: &[u8]) -> RpcResponse {
        match serde_json::from_slice::<RpcRequest>(body) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                let id = RpcId::salvage(body);
                metrics().rpc_request("<unparseable>");
                self.error_response(id, "<unparseable>", AgentError::parse_error(e.to_string()))
            }
        }
    }

    pub async fn handle_request(&self, request: RpcRequest) -> RpcResponse {
        let span = crate::rpc_span!(method = %request.method, id = ?request.id);

        async move {
            metrics().rpc_request(&request.method);
            let method = request.method.clone();
            let id = request.id.clone();

            match self.dispatch(request).await {
                Ok(result) => {
                    debug!("Request handled");
                    RpcResponse::success(id, result)
                }
                Err(e) => self.error_response(id, &method, e),
            }
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, request: RpcRequest) -> Result<Value, AgentError> {
        let task = match RpcMethod::decode(&request.method, request.params)? {
            RpcMethod::Send(params) => self.send(params).await?,
            RpcMethod::Get(params) => self.processor.get_task(&params.id)?,
        };

        serde_json::to_value(&task)
            .map_err(|e| AgentError::internal_error(format!("failed to encode task: {e}")))
    }

    async fn send(&self, params: SendParams) -> Result<Task, AgentError> {
        let task_id = params
            .task_id()
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        match self.processor.process_task(&task_id, &params.message).await {
            Ok(task) => Ok(task),
            // The failure is recorded on the task itself
            Err(ProcessError::Generation { task, .. }) => Ok(*task),
            Err(ProcessError::Store(e)) => Err(e.into()),
            Err(e @ ProcessError::Aborted(_)) => Err(AgentError::internal_error(e.to_string())),
        }
    }

    fn error_response(&self, id: RpcId, method: &str, error: AgentError) -> RpcResponse {
        let rpc_error = error.to_rpc_error();
        metrics().rpc_error(rpc_error.code);
        warn!(
            method = %method,
            code = rpc_error.code,
            error = %error,
            "JSON-RPC request failed"
        );
        RpcResponse::error(id, rpc_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::LlmError;
    use crate::task::{TaskState, TaskStore};
    use crate::testing::mocks::MockPathwayGenerator;
    use serde_json::json;

    fn dispatcher(generator: MockPathwayGenerator) -> Dispatcher {
        let processor = TaskProcessor::new(TaskStore::new(), Arc::new(generator));
        Dispatcher::new(Arc::new(processor))
    }

    fn send_body(id: Value, task_id: Option<&str>, text: &str) -> Vec<u8> {
        let mut params = json!({
            "message": {"role": "user", "parts": [{"type": "text", "text": text}]}
        });
        if let Some(task_id) = task_id {
            params["id"] = json!(task_id);
        }
        serde_json::to_vec(&json!({
            "jsonrpc": "2.0",
            "method": "tasks/send",
            "params": params,
            "id": id
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_send_returns_completed_task() {
        let dispatcher = dispatcher(MockPathwayGenerator::responding("# Best Migration Option"));

        let response = dispatcher
            .handle_body(&send_body(json!(1), Some("abc"), "nurse from India to UK"))
            .await;

        assert_eq!(response.id, RpcId::from(1));
        let result = response.result.unwrap();
        assert_eq!(result["id"], "abc");
        assert_eq!(result["status"]["state"], "completed");
        assert_eq!(
            result["artifacts"][0]["name"],
            "Migration Pathway Recommendation"
        );
    }

    #[tokio::test]
    async fn test_send_generates_id_when_absent() {
        let dispatcher = dispatcher(MockPathwayGenerator::echo());

        let response = dispatcher
            .handle_body(&send_body(json!("r"), None, "designer"))
            .await;

        let id = response.result.unwrap()["id"].as_str().unwrap().to_string();
        assert!(Uuid::parse_str(&id).is_ok());
        assert!(dispatcher.processor().get_task(&id).is_ok());
    }

    #[tokio::test]
    async fn test_generator_failure_is_not_an_rpc_error() {
        let dispatcher = dispatcher(MockPathwayGenerator::failing(LlmError::NotConfigured(
            "GEMINI_API_KEY environment variable not set".to_string(),
        )));

        let response = dispatcher
            .handle_body(&send_body(json!(9), Some("f"), "doctor"))
            .await;

        assert!(!response.is_error());
        let result = response.result.unwrap();
        assert_eq!(result["status"]["state"], "failed");
        assert!(result["status"]["message"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("Failed to generate pathways: "));
    }

    #[tokio::test]
    async fn test_parse_error_salvages_id() {
        let dispatcher = dispatcher(MockPathwayGenerator::echo());

        let response = dispatcher
            .handle_body(br#"{"jsonrpc":"2.0","method":42,"id":"keep-me"}"#)
            .await;
        let error = response.error.unwrap();
        assert_eq!(error.code, -32700);
        assert_eq!(response.id, RpcId::from("keep-me"));

        let response = dispatcher.handle_body(b"{{{").await;
        assert_eq!(response.error.unwrap().code, -32700);
        assert_eq!(response.id, RpcId::Null);
    }

    #[tokio::test]
    async fn test_unknown_method_leaves_store_untouched() {
        let dispatcher = dispatcher(MockPathwayGenerator::echo());
        let request = RpcRequest::new("tasks/cancel", json!({"id": "abc"}), 5);

        let response = dispatcher.handle_request(request).await;

        assert_eq!(response.error.unwrap().code, -32601);
        assert_eq!(response.id, RpcId::from(5));
        assert!(dispatcher.processor().store().is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_task() {
        let dispatcher = dispatcher(MockPathwayGenerator::echo());
        let request = RpcRequest::new("tasks/get", json!({"id": "missing"}), "g");

        let response = dispatcher.handle_request(request).await;
        let error = response.error.unwrap();

        assert_eq!(error.code, -32602);
        assert_eq!(error.data.as_deref(), Some("task not found: missing"));
    }

    #[tokio::test]
    async fn test_get_after_send() {
        let dispatcher = dispatcher(MockPathwayGenerator::echo());
        dispatcher
            .handle_body(&send_body(json!(1), Some("known"), "engineer to Germany"))
            .await;

        let response = dispatcher
            .handle_request(RpcRequest::new("tasks/get", json!({"id": "known"}), 2))
            .await;
        let task: Task = serde_json::from_value(response.result.unwrap()).unwrap();

        assert_eq!(task.state(), TaskState::Completed);
        assert_eq!(task.id, "known");
    }

    #[tokio::test]
    async fn test_invalid_params_do_not_create_tasks() {
        let dispatcher = dispatcher(MockPathwayGenerator::echo());
        let request = RpcRequest::new("tasks/send", json!({"id": "x", "message": {}}), 3);

        let response = dispatcher.handle_request(request).await;

        assert_eq!(response.error.unwrap().code, -32602);
        assert!(dispatcher.processor().store().is_empty());
    }
}
