//! Provider error types.

use thiserror::Error;

use crate::request::JsonRpcError;

/// Errors surfaced by the BlockVision client.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Fatal misuse of the API (e.g. closing a subscription that has no
    /// live connection). Detected before any I/O, never retried.
    #[error("usage error: {0}")]
    Usage(String),

    /// The network identifier has no entry in the endpoint table.
    /// Fatal to provider construction.
    #[error("unsupported network: {0}")]
    UnsupportedNetwork(String),

    /// JSON-RPC protocol-level error returned by the node, carried verbatim.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// HTTP request failed (connection refused, non-2xx status, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// WebSocket connection/send/receive error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// A structurally malformed argument (e.g. a 32-byte hash expected),
    /// reported before any network call.
    #[error("invalid {argument}: {value:?}")]
    Validation {
        argument: &'static str,
        value: String,
    },

    /// Response could not be deserialized.
    #[error("deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl ProviderError {
    /// The JSON-RPC error object, if this is a protocol-level error.
    pub fn as_rpc_error(&self) -> Option<&JsonRpcError> {
        match self {
            Self::Rpc(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_error_display_carries_code_and_message() {
        let err = ProviderError::Rpc(JsonRpcError {
            code: -32000,
            message: "boom".into(),
            data: None,
        });
        assert_eq!(err.to_string(), "RPC error -32000: boom");
        assert_eq!(err.as_rpc_error().unwrap().code, -32000);
    }

    #[test]
    fn validation_error_names_the_argument() {
        let err = ProviderError::Validation {
            argument: "transaction hash",
            value: "latest".into(),
        };
        assert!(err.to_string().contains("transaction hash"));
        assert!(err.as_rpc_error().is_none());
    }
}
