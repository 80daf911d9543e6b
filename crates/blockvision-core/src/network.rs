//! Supported networks and endpoint resolution.
//!
//! Each logical network maps to a static BlockVision hostname plus the short
//! prefix that tags shared-key (community) traffic. Keys equal to
//! [`DEFAULT_API_KEY`] get the prefix prepended in the URL path, which is
//! how the server tells community traffic from paid traffic without an
//! extra header.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// The shared community API key. Highly throttled; fine for prototyping.
pub const DEFAULT_API_KEY: &str = "2D1t7BmW5EHTswWSlDxczYVAVC";

/// Logical networks with a BlockVision endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    EthMainnet,
    EthGoerli,
    BnbMainnet,
    BnbTestnet,
    OptMainnet,
    OptGoerli,
    ArbMainnet,
    ArbGoerli,
    PolMainnet,
    PolTestnet,
    SuiMainnet,
    SuiTestnet,
    SuiDevnet,
}

/// The resolved identity of a provider's network. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDescriptor {
    pub name: &'static str,
    pub chain_id: u64,
}

impl Network {
    /// All supported networks, for enumeration in tooling.
    pub const ALL: &'static [Network] = &[
        Network::EthMainnet,
        Network::EthGoerli,
        Network::BnbMainnet,
        Network::BnbTestnet,
        Network::OptMainnet,
        Network::OptGoerli,
        Network::ArbMainnet,
        Network::ArbGoerli,
        Network::PolMainnet,
        Network::PolTestnet,
        Network::SuiMainnet,
        Network::SuiTestnet,
        Network::SuiDevnet,
    ];

    /// The ethers-style network name.
    pub fn name(self) -> &'static str {
        match self {
            Self::EthMainnet => "homestead",
            Self::EthGoerli => "goerli",
            Self::BnbMainnet => "bnb",
            Self::BnbTestnet => "bnbt",
            Self::OptMainnet => "optimism",
            Self::OptGoerli => "optimism-goerli",
            Self::ArbMainnet => "arbitrum",
            Self::ArbGoerli => "arbitrum-goerli",
            Self::PolMainnet => "matic",
            Self::PolTestnet => "maticmum",
            Self::SuiMainnet => "sui-mainnet",
            Self::SuiTestnet => "sui-testnet",
            Self::SuiDevnet => "sui-devnet",
        }
    }

    /// The numeric chain id.
    pub fn chain_id(self) -> u64 {
        match self {
            Self::EthMainnet => 1,
            Self::EthGoerli => 5,
            Self::BnbMainnet => 56,
            Self::BnbTestnet => 97,
            Self::OptMainnet => 10,
            Self::OptGoerli => 420,
            Self::ArbMainnet => 42161,
            Self::ArbGoerli => 421613,
            Self::PolMainnet => 137,
            Self::PolTestnet => 80001,
            Self::SuiMainnet => 6000,
            Self::SuiTestnet => 601,
            Self::SuiDevnet => 600,
        }
    }

    /// The static endpoint hostname (with path root).
    pub fn host(self) -> &'static str {
        match self {
            Self::EthMainnet => "eth-mainnet.blockvision.org/v1/",
            Self::EthGoerli => "eth-goerli.blockvision.org/v1/",
            Self::BnbMainnet => "bsc-mainnet.blockvision.org/v1/",
            Self::BnbTestnet => "bsc-testnet.blockvision.org/v1/",
            Self::OptMainnet => "opt-mainnet.blockvision.org/v1/",
            Self::OptGoerli => "opt-goerli.blockvision.org/v1/",
            Self::ArbMainnet => "arb-mainnet.blockvision.org/v1/",
            Self::ArbGoerli => "arb-goerli.blockvision.org/v1/",
            Self::PolMainnet => "pol-mainnet.blockvision.org/v1/",
            Self::PolTestnet => "pol-testnet.blockvision.org/v1/",
            Self::SuiMainnet => "sui-mainnet.blockvision.org/v1/",
            Self::SuiTestnet => "sui-testnet.blockvision.org/v1/",
            Self::SuiDevnet => "sui-devnet.blockvision.org/v1/",
        }
    }

    /// The per-network prefix applied to the shared community key.
    pub fn default_key_prefix(self) -> &'static str {
        match self {
            Self::EthMainnet => "em_",
            Self::EthGoerli => "eg_",
            Self::BnbMainnet => "bm_",
            Self::BnbTestnet => "bt_",
            Self::OptMainnet => "om_",
            Self::OptGoerli => "og_",
            Self::ArbMainnet => "am_",
            Self::ArbGoerli => "ag_",
            Self::PolMainnet => "pm_",
            Self::PolTestnet => "pt_",
            Self::SuiMainnet => "sm_",
            Self::SuiTestnet => "st_",
            Self::SuiDevnet => "sd_",
        }
    }

    /// Resolve a network name. Fails with `UnsupportedNetwork` for anything
    /// outside the table.
    pub fn from_name(name: &str) -> Result<Self, ProviderError> {
        Self::ALL
            .iter()
            .copied()
            .find(|n| n.name() == name)
            .ok_or_else(|| ProviderError::UnsupportedNetwork(name.to_string()))
    }

    /// Resolve a raw chain id. Fails with `UnsupportedNetwork` for anything
    /// outside the table.
    pub fn from_chain_id(chain_id: u64) -> Result<Self, ProviderError> {
        Self::ALL
            .iter()
            .copied()
            .find(|n| n.chain_id() == chain_id)
            .ok_or_else(|| ProviderError::UnsupportedNetwork(chain_id.to_string()))
    }

    /// The statically known descriptor for this network.
    pub fn descriptor(self) -> NetworkDescriptor {
        NetworkDescriptor {
            name: self.name(),
            chain_id: self.chain_id(),
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// HTTP JSON-RPC endpoint URL for a network/key pair.
///
/// The community key carries the per-network prefix; paid keys go in as-is.
pub fn http_url(network: Network, api_key: &str) -> String {
    let prefix = if api_key == DEFAULT_API_KEY {
        network.default_key_prefix()
    } else {
        ""
    };
    format!("https://{}{prefix}{api_key}", network.host())
}

/// Streaming endpoint URL: same path, scheme upgraded to `wss`.
pub fn ws_url(network: Network, api_key: &str) -> String {
    http_url(network, api_key).replacen("https", "wss", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_url_default_key_gets_prefix() {
        let url = http_url(Network::EthMainnet, DEFAULT_API_KEY);
        assert_eq!(
            url,
            format!("https://eth-mainnet.blockvision.org/v1/em_{DEFAULT_API_KEY}")
        );
    }

    #[test]
    fn http_url_paid_key_is_unprefixed() {
        let url = http_url(Network::BnbMainnet, "my_paid_key");
        assert_eq!(url, "https://bsc-mainnet.blockvision.org/v1/my_paid_key");
    }

    #[test]
    fn ws_url_upgrades_scheme_only() {
        let url = ws_url(Network::ArbMainnet, "key");
        assert_eq!(url, "wss://arb-mainnet.blockvision.org/v1/key");
    }

    #[test]
    fn from_name_resolves_table_entries() {
        assert_eq!(Network::from_name("homestead").unwrap(), Network::EthMainnet);
        assert_eq!(Network::from_name("maticmum").unwrap(), Network::PolTestnet);
        assert!(matches!(
            Network::from_name("ropsten"),
            Err(ProviderError::UnsupportedNetwork(_))
        ));
    }

    #[test]
    fn from_chain_id_resolves_table_entries() {
        assert_eq!(Network::from_chain_id(42161).unwrap(), Network::ArbMainnet);
        assert!(matches!(
            Network::from_chain_id(1337),
            Err(ProviderError::UnsupportedNetwork(_))
        ));
    }

    #[test]
    fn prefixes_are_unique_per_network() {
        let mut prefixes: Vec<_> = Network::ALL.iter().map(|n| n.default_key_prefix()).collect();
        prefixes.sort_unstable();
        prefixes.dedup();
        assert_eq!(prefixes.len(), Network::ALL.len());
    }
}
