//! Foundation traits and types for the BlockVision SDK.
//!
//! # Overview
//!
//! BlockVision exposes the standard Ethereum JSON-RPC surface plus an
//! indexing API (token transfers, balances, NFTs, DeFi positions, mempool
//! bundles) behind a single endpoint. The core crate defines:
//!
//! - [`RpcTransport`]: the async trait every transport implements
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`]: wire types for both the
//!   node-RPC (positional params) and extended-REST (object params)
//!   calling conventions
//! - [`ProviderError`]: structured error type
//! - [`Network`]: the supported network table and endpoint resolution
//! - [`hex`] module: hex-string and block-identifier classification

pub mod error;
pub mod hex;
pub mod network;
pub mod request;
pub mod transport;

pub use error::ProviderError;
pub use hex::BlockIdentifier;
pub use network::{Network, NetworkDescriptor, DEFAULT_API_KEY};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};
pub use transport::RpcTransport;
