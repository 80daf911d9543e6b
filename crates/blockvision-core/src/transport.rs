//! The `RpcTransport` trait: the seam between the dispatcher and the wire.
//!
//! The provider is composed around an injected transport rather than built
//! on inheritance: anything that can exchange a request envelope for a
//! response envelope can back a provider, including test doubles.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};

/// The async trait every RPC transport must implement.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
///
/// # Object Safety
/// The trait is object-safe and is stored as `Arc<dyn RpcTransport>`.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// Send a single request envelope and return the parsed response.
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, ProviderError>;

    /// Return the transport's endpoint URL.
    fn url(&self) -> &str;
}
