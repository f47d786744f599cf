//! Method table and parameter decoding
//!
//! The method name is inspected first; only then are the params decoded
//! strictly into the shape that method expects.

use crate::error::AgentError;
use crate::task::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const METHOD_TASKS_SEND: &str = "tasks/send";
pub const METHOD_MESSAGE_SEND: &str = "message/send";
pub const METHOD_TASKS_GET: &str = "tasks/get";

/// Parameters of `tasks/send`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub message: Message,
}

impl SendParams {
    /// Caller-chosen task id: the explicit `id`, else the message's
    /// `taskId`; blank ids count as absent
    pub fn task_id(&self) -> Option<&str> {
        [self.id.as_deref(), self.message.task_id.as_deref()]
            .into_iter()
            .flatten()
            .find(|id| !id.trim().is_empty())
    }
}

/// Parameters of `message/send`: either the `{message, id}` wrapper or a
/// bare message
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MessageParams {
    Wrapped(SendParams),
    Bare(Message),
}

impl From<MessageParams> for SendParams {
    fn from(params: MessageParams) -> Self {
        match params {
            MessageParams::Wrapped(params) => params,
            MessageParams::Bare(message) => SendParams { id: None, message },
        }
    }
}

/// Parameters of `tasks/get`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetParams {
    pub id: String,
}

/// A request whose method is known and whose params decoded cleanly
#[derive(Debug, Clone, PartialEq)]
pub enum RpcMethod {
    Send(SendParams),
    Get(GetParams),
}

impl RpcMethod {
    pub fn decode(method: &str, params: Value) -> Result<Self, AgentError> {
        match method {
            METHOD_TASKS_SEND => {
                let params: SendParams = decode_params(params)?;
                validate_message(&params.message)?;
                Ok(RpcMethod::Send(params))
            }
            METHOD_MESSAGE_SEND => {
                let params: SendParams = decode_params::<MessageParams>(params)?.into();
                validate_message(&params.message)?;
                Ok(RpcMethod::Send(params))
            }
            METHOD_TASKS_GET => {
                let params: GetParams = decode_params(params)?;
                if params.id.trim().is_empty() {
                    return Err(AgentError::invalid_params("task id must not be empty"));
                }
                Ok(RpcMethod::Get(params))
            }
            other => Err(AgentError::method_not_found(other)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RpcMethod::Send(_) => METHOD_TASKS_SEND,
            RpcMethod::Get(_) => METHOD_TASKS_GET,
        }
    }
}

fn decode_params<T: serde::de::DeserializeOwned>(params: Value) -> Result<T, AgentError> {
    if !params.is_object() {
        return Err(AgentError::invalid_params("params must be an object"));
    }
    serde_json::from_value(params).map_err(|e| AgentError::invalid_params(e.to_string()))
}

fn validate_message(message: &Message) -> Result<(), AgentError> {
    if message.is_well_formed() {
        Ok(())
    } else {
        Err(AgentError::invalid_params(
            "message requires a role or at least one part",
        ))
    }
}
