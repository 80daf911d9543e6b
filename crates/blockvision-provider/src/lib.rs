//! The typed BlockVision method surface.
//!
//! # Overview
//!
//! [`BlockVisionProvider`] wraps a [`Dispatcher`] (request envelopes, id
//! counter, error unwrapping) around any `RpcTransport` and exposes every
//! BlockVision operation as a typed method: the standard Ethereum node RPC
//! (blocks, transactions, traces, filters) plus the indexing API (ERC20,
//! NFT, account portfolios, DeFi positions, mempool bundles).
//!
//! # Quick start
//! ```rust,no_run
//! use blockvision_provider::BlockVisionProvider;
//!
//! # async fn demo() -> Result<(), blockvision_core::ProviderError> {
//! let provider = BlockVisionProvider::new(None, None); // mainnet, community key
//! let chain_id = provider.get_chain_id().await?;
//! # Ok(())
//! # }
//! ```

pub mod dispatcher;
pub mod provider;
pub mod throttle;
pub mod types;

pub use dispatcher::Dispatcher;
pub use provider::BlockVisionProvider;
pub use throttle::ThrottleNotice;
