//! HTTP JSON-RPC client backed by `reqwest`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use blockvision_core::error::ProviderError;
use blockvision_core::request::{JsonRpcRequest, JsonRpcResponse};
use blockvision_core::transport::RpcTransport;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Invoked when the server signals rate limiting (HTTP 429), before the
/// error is returned to the caller. Used for the one-time community-key
/// notice; the request itself is never retried here.
pub type ThrottleCallback = Arc<dyn Fn() + Send + Sync>;

/// HTTP JSON-RPC client.
pub struct HttpRpcClient {
    url: String,
    http: reqwest::Client,
    on_throttle: Option<ThrottleCallback>,
}

impl HttpRpcClient {
    /// Create a new client for the given endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .expect("failed to build reqwest client");

        Self {
            url: url.into(),
            http,
            on_throttle: None,
        }
    }

    /// Register a throttle callback, fired on HTTP 429 responses.
    pub fn with_throttle_callback(mut self, callback: ThrottleCallback) -> Self {
        self.on_throttle = Some(callback);
        self
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, ProviderError> {
        tracing::trace!(method = %req.method, id = ?req.id, "sending request");

        let resp = self
            .http
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            if status == 429 {
                if let Some(cb) = &self.on_throttle {
                    cb();
                }
            }
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Http(format!("HTTP {status}: {body}")));
        }

        resp.json::<JsonRpcResponse>()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))
    }

    fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_reports_its_url() {
        let client = HttpRpcClient::new("https://eth-mainnet.blockvision.org/v1/key");
        assert_eq!(client.url(), "https://eth-mainnet.blockvision.org/v1/key");
    }
}
