//! Resolution types, JSON-RPC wire types and error definitions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Outcome of resolving a request URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The name maps to this destination.
    Resolved(Url),
    /// The name could not be resolved, for any reason.
    Unresolved,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

/// Turns a raw request URL into a destination.
///
/// Implementations never fail: every failure is reported as
/// [`Resolution::Unresolved`].
#[async_trait]
pub trait DomainResolver: Send + Sync {
    async fn resolve(&self, request_url: &str) -> Resolution;
}

/// Errors that can occur while resolving a name.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// Transport-level failure talking to the node.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The node answered with a non-success status.
    #[error("Network error: {0}")]
    Status(u16),

    /// The node returned a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The body was not a JSON-RPC response.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// No `result.stack[0].value` string in the response.
    #[error("Unexpected response format")]
    MissingValue,

    #[error("Invalid base64 record: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Record is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The record decoded to an empty string.
    #[error("No encoded value for domain")]
    EmptyRecord,

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),
}

/// Result type for resolver operations.
pub type ResolverResult<T> = Result<T, ResolverError>;

/// A typed contract invocation argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum ContractParameter {
    String(String),
    Integer(u32),
}

/// `invokefunction` JSON-RPC request body.
#[derive(Debug, Clone, Serialize)]
pub struct InvokeFunctionRequest {
    pub jsonrpc: &'static str,
    pub id: u32,
    pub method: &'static str,
    pub params: (String, String, Vec<ContractParameter>),
}

impl InvokeFunctionRequest {
    /// Build a call of `operation` on `contract_hash`.
    pub fn new(contract_hash: &str, operation: &str, args: Vec<ContractParameter>) -> Self {
        Self {
            jsonrpc: "2.0",
            id: 1,
            method: "invokefunction",
            params: (contract_hash.to_string(), operation.to_string(), args),
        }
    }
}

/// JSON-RPC response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<InvokeResult>,

    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// Result of a test invocation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvokeResult {
    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub exception: Option<String>,

    #[serde(default)]
    pub stack: Vec<StackItem>,
}

/// One VM stack entry.
#[derive(Debug, Clone, Deserialize)]
pub struct StackItem {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub value: Option<serde_json::Value>,
}
