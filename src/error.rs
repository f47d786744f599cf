//! Error types for the migration agent
//!
//! Maps internal errors to the fixed JSON-RPC error codes reported to
//! callers.

use crate::protocol::jsonrpc::{ErrorCode, RpcError};
use crate::task::StoreError;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

const MAX_ERROR_MESSAGE_LEN: usize = 500;
const TRUNCATE_SUFFIX: &str = "...[truncated]";

static SECRET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(password|token|key|secret)[=:]\s*\S+").expect("secret pattern is valid")
});

static SENSITIVE_PATH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/[a-zA-Z0-9._/-]+/(secrets?|\.ssh|\.aws|\.config)/[a-zA-Z0-9._/-]+")
        .expect("path pattern is valid")
});

/// Main error type for agent operations
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Invalid params: {message}")]
    InvalidParams { message: String },

    #[error("Method not found: {method}")]
    MethodNotFound { method: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl AgentError {
    /// Convert to the JSON-RPC error object sent back to the caller
    pub fn to_rpc_error(&self) -> RpcError {
        match self {
            AgentError::ParseError { message } => {
                RpcError::new(ErrorCode::ParseError, "Parse error").with_data(message)
            }
            AgentError::InvalidParams { message } => {
                RpcError::new(ErrorCode::InvalidParams, "Invalid params").with_data(message)
            }
            AgentError::MethodNotFound { method } => {
                RpcError::new(ErrorCode::MethodNotFound, "Method not found").with_data(method)
            }
            // Unknown ids are reported as invalid params carrying the lookup failure
            AgentError::Store(e @ StoreError::NotFound(_)) => {
                let message = e.to_string();
                RpcError::new(ErrorCode::InvalidParams, &message).with_data(&message)
            }
            AgentError::Store(e) => RpcError::new(ErrorCode::InternalError, "Internal error")
                .with_data(&sanitize_error_message(&e.to_string())),
            AgentError::InternalError { message } => {
                RpcError::new(ErrorCode::InternalError, "Internal error")
                    .with_data(&sanitize_error_message(message))
            }
        }
    }

    /// Create parse error
    pub fn parse_error<S: Into<String>>(message: S) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Create invalid params error
    pub fn invalid_params<S: Into<String>>(message: S) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// Create method not found error
    pub fn method_not_found<S: Into<String>>(method: S) -> Self {
        Self::MethodNotFound {
            method: method.into(),
        }
    }

    /// Create internal error
    pub fn internal_error<S: Into<String>>(message: S) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

/// Strip credentials and sensitive paths, then cap the length
///
/// Applied to every error text that leaves the process, including the
/// status message of failed tasks.
pub fn sanitize_error_message(message: &str) -> String {
    let sanitized = SECRET_PATTERN.replace_all(message, "${1}=***");
    let mut sanitized = SENSITIVE_PATH_PATTERN
        .replace_all(&sanitized, "/***REDACTED***/")
        .to_string();

    if sanitized.len() > MAX_ERROR_MESSAGE_LEN {
        let mut cut = MAX_ERROR_MESSAGE_LEN - TRUNCATE_SUFFIX.len();
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str(TRUNCATE_SUFFIX);
    }

    sanitized
}

/// Result type for agent operations
pub type AgentResult<T> = Result<T, AgentError>;
