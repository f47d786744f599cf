//! Agent-to-agent protocol surface: JSON-RPC envelopes, method decoding,
//! dispatch and the agent card

pub mod agent_card;
pub mod dispatcher;
pub mod jsonrpc;
pub mod methods;

pub use agent_card::{AgentCard, Capabilities, Skill, AGENT_CARD_PATH};
pub use dispatcher::Dispatcher;
pub use jsonrpc::{ErrorCode, RpcError, RpcId, RpcRequest, RpcResponse, JSONRPC_VERSION};
pub use methods::{
    GetParams, MessageParams, RpcMethod, SendParams, METHOD_MESSAGE_SEND, METHOD_TASKS_GET,
    METHOD_TASKS_SEND,
};
