//! HTTP JSON-RPC transport backed by `reqwest`.
//!
//! A deliberately thin pass-through: no retry, no batching, no rate
//! limiting. Resilience beyond the subscription reconnect loop is the
//! caller's (or the hosting transport's) job.

pub mod client;

pub use client::{HttpRpcClient, ThrottleCallback};
