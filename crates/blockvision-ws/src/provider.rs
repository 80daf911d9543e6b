//! WebSocket provider: endpoint resolution plus subscription creation.

use std::sync::Arc;

use blockvision_core::error::ProviderError;
use blockvision_core::network::{self, Network, DEFAULT_API_KEY};

use crate::connector::{TungsteniteConnector, WsConnector};
use crate::subscription::{self, Subscription, SubscriptionFilter, SubscriptionKind};

/// Client for BlockVision push subscriptions.
///
/// The endpoint is the HTTP endpoint with the scheme switched to `wss`.
/// Each [`subscribe`](Self::subscribe) call opens an independent channel
/// with its own socket and reconnect lifecycle.
pub struct BlockVisionWsProvider {
    network: Network,
    api_key: String,
    url: String,
    connector: Arc<dyn WsConnector>,
}

impl BlockVisionWsProvider {
    /// `None` network defaults to Ethereum mainnet; `None` key uses the
    /// shared community key.
    pub fn new(network: Option<Network>, api_key: Option<&str>) -> Self {
        Self::with_connector(network, api_key, Arc::new(TungsteniteConnector))
    }

    /// Build over a custom connector. This is the seam the tests use.
    pub fn with_connector(
        network: Option<Network>,
        api_key: Option<&str>,
        connector: Arc<dyn WsConnector>,
    ) -> Self {
        let network = network.unwrap_or(Network::EthMainnet);
        let api_key = api_key.unwrap_or(DEFAULT_API_KEY).to_string();
        let url = network::ws_url(network, &api_key);
        Self {
            network,
            api_key,
            url,
            connector,
        }
    }

    pub fn for_chain_id(chain_id: u64, api_key: Option<&str>) -> Result<Self, ProviderError> {
        Ok(Self::new(Some(Network::from_chain_id(chain_id)?), api_key))
    }

    pub fn for_name(name: &str, api_key: Option<&str>) -> Result<Self, ProviderError> {
        Ok(Self::new(Some(Network::from_name(name)?), api_key))
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_community_resource(&self) -> bool {
        self.api_key == DEFAULT_API_KEY
    }

    /// Open a subscription channel for `kind`.
    ///
    /// Filters are only valid on `logs` and `pendingTransactionsExtended`,
    /// and the filter shape must match the stream.
    pub fn subscribe(
        &self,
        kind: SubscriptionKind,
        filter: Option<SubscriptionFilter>,
    ) -> Result<Subscription, ProviderError> {
        match (&kind, &filter) {
            (_, None) => {}
            (SubscriptionKind::PendingTransactionsExtended, Some(SubscriptionFilter::PendingTx(_))) => {}
            (SubscriptionKind::Logs, Some(SubscriptionFilter::Log(_))) => {}
            _ => {
                return Err(ProviderError::Usage(format!(
                    "subscription {} does not accept this filter",
                    kind.as_tag()
                )))
            }
        }
        Ok(subscription::spawn(
            self.connector.clone(),
            self.url.clone(),
            kind,
            filter,
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::subscription::{LogFilter, PendingTxFilter};

    use super::*;

    #[test]
    fn ws_url_swaps_scheme_and_keeps_key_shape() {
        let community = BlockVisionWsProvider::new(None, None);
        assert_eq!(
            community.url(),
            format!("wss://eth-mainnet.blockvision.org/v1/em_{DEFAULT_API_KEY}")
        );
        assert!(community.is_community_resource());

        let paid = BlockVisionWsProvider::new(Some(Network::PolMainnet), Some("paid"));
        assert_eq!(paid.url(), "wss://pol-mainnet.blockvision.org/v1/paid");
        assert!(!paid.is_community_resource());
    }

    #[tokio::test]
    async fn filter_rules_are_enforced() {
        let provider = BlockVisionWsProvider::new(None, None);

        assert!(matches!(
            provider.subscribe(
                SubscriptionKind::NewHeads,
                Some(SubscriptionFilter::Log(LogFilter::default())),
            ),
            Err(ProviderError::Usage(_))
        ));
        assert!(matches!(
            provider.subscribe(
                SubscriptionKind::Logs,
                Some(SubscriptionFilter::PendingTx(PendingTxFilter::default())),
            ),
            Err(ProviderError::Usage(_))
        ));
        assert!(provider
            .subscribe(
                SubscriptionKind::Logs,
                Some(SubscriptionFilter::Log(LogFilter::default())),
            )
            .is_ok());
        assert!(provider
            .subscribe(SubscriptionKind::NewPendingTransactions, None)
            .is_ok());
    }
}
