//! Request dispatch: envelope construction, id allocation, error unwrapping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use blockvision_core::error::ProviderError;
use blockvision_core::request::JsonRpcRequest;
use blockvision_core::transport::RpcTransport;

/// Builds request envelopes and unwraps responses over an injected
/// transport.
///
/// The id counter is the only cross-call mutable state: ids start at 1 and
/// strictly increase for the lifetime of the dispatcher, safe under
/// concurrent calls. No ordering or mutual exclusion is imposed across
/// calls beyond that.
pub struct Dispatcher {
    transport: Arc<dyn RpcTransport>,
    next_id: AtomicU64,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Node-RPC convention: positional parameter array.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, ProviderError> {
        let req = JsonRpcRequest::positional(self.next_id(), method, params);
        self.dispatch(req).await
    }

    /// Extended-REST convention: a single parameter object.
    pub async fn call_rest<T, P>(&self, method: &str, params: &P) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let params = serde_json::to_value(params)?;
        let req = JsonRpcRequest::object(self.next_id(), method, params);
        self.dispatch(req).await
    }

    /// The underlying transport.
    pub fn transport(&self) -> &Arc<dyn RpcTransport> {
        &self.transport
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        req: JsonRpcRequest,
    ) -> Result<T, ProviderError> {
        let resp = self.transport.send(req).await?;
        // A populated error field never reaches the caller as a response.
        let result = resp.into_result().map_err(ProviderError::Rpc)?;
        serde_json::from_value(result).map_err(ProviderError::Deserialization)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;
    use tokio::task::JoinSet;

    use blockvision_core::request::{JsonRpcResponse, RpcId};

    use super::*;

    /// Echoes a canned result and records every request it sees.
    struct RecordingTransport {
        requests: Mutex<Vec<JsonRpcRequest>>,
        result: Value,
    }

    impl RecordingTransport {
        fn new(result: Value) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                result,
            })
        }
    }

    #[async_trait]
    impl RpcTransport for RecordingTransport {
        async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, ProviderError> {
            let id = req.id.clone();
            self.requests.lock().unwrap().push(req);
            Ok(JsonRpcResponse {
                jsonrpc: "2.0".into(),
                id,
                result: Some(self.result.clone()),
                error: None,
            })
        }

        fn url(&self) -> &str {
            "mock://"
        }
    }

    #[tokio::test]
    async fn concurrent_calls_use_ids_one_through_n() {
        const N: usize = 64;
        let transport = RecordingTransport::new(json!("0x0"));
        let dispatcher = Arc::new(Dispatcher::new(transport.clone()));

        let mut tasks = JoinSet::new();
        for _ in 0..N {
            let dispatcher = dispatcher.clone();
            tasks.spawn(async move {
                let _: Value = dispatcher.call("eth_blockNumber", vec![]).await.unwrap();
            });
        }
        while let Some(res) = tasks.join_next().await {
            res.unwrap();
        }

        let ids: BTreeSet<u64> = transport
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|req| match &req.id {
                RpcId::Number(n) => *n,
                other => panic!("unexpected id {other:?}"),
            })
            .collect();
        let expected: BTreeSet<u64> = (1..=N as u64).collect();
        assert_eq!(ids, expected, "ids must be exactly 1..=N, no gaps or reuse");
    }

    #[tokio::test]
    async fn rest_call_sends_object_params() {
        let transport = RecordingTransport::new(json!({}));
        let dispatcher = Dispatcher::new(transport.clone());

        let _: Value = dispatcher
            .call_rest("erc20_balance", &json!({"contractAddress": "0xdac1"}))
            .await
            .unwrap();

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].method, "erc20_balance");
        assert!(requests[0].params.is_object());
        assert_eq!(requests[0].params["contractAddress"], "0xdac1");
        assert_eq!(requests[0].jsonrpc, "2.0");
    }

    #[tokio::test]
    async fn wire_error_becomes_rpc_error() {
        struct ErrorTransport;

        #[async_trait]
        impl RpcTransport for ErrorTransport {
            async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, ProviderError> {
                Ok(JsonRpcResponse {
                    jsonrpc: "2.0".into(),
                    id: req.id,
                    result: None,
                    error: Some(blockvision_core::request::JsonRpcError {
                        code: -32000,
                        message: "boom".into(),
                        data: Some(json!("details")),
                    }),
                })
            }

            fn url(&self) -> &str {
                "mock://"
            }
        }

        let dispatcher = Dispatcher::new(Arc::new(ErrorTransport));
        let err = dispatcher
            .call::<Value>("eth_chainId", vec![])
            .await
            .unwrap_err();
        let rpc = err.as_rpc_error().expect("expected an RPC error");
        assert_eq!(rpc.code, -32000);
        assert_eq!(rpc.message, "boom");
        assert_eq!(rpc.data, Some(json!("details")));
    }
}
