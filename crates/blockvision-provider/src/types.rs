//! Parameter objects for the extended-REST methods.
//!
//! These serialize to the exact wire shapes the indexing API expects:
//! camelCase keys, optional fields omitted when unset.

use serde::{Deserialize, Serialize};

/// Transfer/approval event query where every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransfersOptional {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

/// Transfer/approval event query scoped to one collection contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransfersRequired {
    pub contract_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

/// Native ETH transfer history query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthTransfers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

/// Mint/burn event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Mint,
    Burn,
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc20MintsBurns {
    pub contract_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc20Balance {
    pub contract_address: String,
    pub account_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc20BalanceChangedList {
    pub contract_address: String,
    pub account_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc20TotalSupply {
    pub contract_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc20TokenPrice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    pub token0: String,
    pub token1: String,
}

/// Query keyed by a contract address alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractQuery {
    pub contract_address: String,
}

/// Paginated query keyed by a contract address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractPageQuery {
    pub contract_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

/// Query keyed by a contract address and token id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenQuery {
    pub contract_address: String,
    pub token_id: String,
}

/// Paginated query keyed by a contract address and token id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPageQuery {
    pub contract_address: String,
    pub token_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftMints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftAccountPositions {
    pub account_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftAccountTokenIds {
    pub contract_address: String,
    pub account_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftBalance {
    pub contract_address: String,
    pub account_address: String,
    /// Optional for ERC721, required for ERC1155.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftCollectionHolders {
    pub contract_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftUri {
    pub contract_address: String,
    pub token_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftCirculations {
    pub token_id: String,
    pub contract_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftAccountStats {
    pub contract_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftContractStats {
    pub contract_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftCollectionNfts {
    pub contract_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_metadata: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

/// Ranked query where the collection contract is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftTopQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftAccountAuctionRecords {
    pub account_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeUnit {
    Daily,
    Monthly,
    Total,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftVolume {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<VolumeUnit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeDimension {
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "6h")]
    H6,
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "3d")]
    D3,
    #[serde(rename = "7d")]
    D7,
    #[serde(rename = "all")]
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftTopBuyerAndSeller {
    #[serde(rename = "type")]
    pub side: TradeSide,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_dimension: Option<TimeDimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftAccountRentTokenIds {
    pub account_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
}

/// Account-scoped paginated query (portfolios, owned/rented token ids).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPageQuery {
    pub account_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FtPortfolio {
    pub account_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    /// 1 includes tokens with low liquidity, 0 (default) excludes them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_all: Option<u8>,
}

/// DeFi protocols with position indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefiProtocol {
    #[serde(rename = "0x")]
    ZeroX,
    #[serde(rename = "1inch")]
    OneInch,
    #[serde(rename = "aavev2")]
    AaveV2,
    #[serde(rename = "aavev3")]
    AaveV3,
    #[serde(rename = "animalfarm")]
    AnimalFarm,
    #[serde(rename = "arrakis")]
    Arrakis,
    #[serde(rename = "aura")]
    Aura,
    #[serde(rename = "balancerv1")]
    BalancerV1,
    #[serde(rename = "balancerv2")]
    BalancerV2,
    #[serde(rename = "bancorv2")]
    BancorV2,
    #[serde(rename = "bancorv3")]
    BancorV3,
    #[serde(rename = "coinwind")]
    Coinwind,
    #[serde(rename = "compound")]
    Compound,
    #[serde(rename = "convex")]
    Convex,
    #[serde(rename = "curve")]
    Curve,
    #[serde(rename = "dydx")]
    Dydx,
    #[serde(rename = "ETH2")]
    Eth2,
    #[serde(rename = "frax")]
    Frax,
    #[serde(rename = "gmx")]
    Gmx,
    #[serde(rename = "graph")]
    Graph,
    #[serde(rename = "hex")]
    Hex,
    #[serde(rename = "instadapp")]
    Instadapp,
    #[serde(rename = "lido")]
    Lido,
    #[serde(rename = "liquity")]
    Liquity,
    #[serde(rename = "makerdao")]
    MakerDao,
    #[serde(rename = "maple")]
    Maple,
    #[serde(rename = "olympus")]
    Olympus,
    #[serde(rename = "pancake")]
    Pancake,
    #[serde(rename = "polygonStaking")]
    PolygonStaking,
    #[serde(rename = "rocketPool")]
    RocketPool,
    #[serde(rename = "shibaswap")]
    Shibaswap,
    #[serde(rename = "stakefish")]
    Stakefish,
    #[serde(rename = "stargate")]
    Stargate,
    #[serde(rename = "sushiswap")]
    Sushiswap,
    #[serde(rename = "synthetix")]
    Synthetix,
    #[serde(rename = "tornado")]
    Tornado,
    #[serde(rename = "unicrypt")]
    Unicrypt,
    #[serde(rename = "uniswapv2")]
    UniswapV2,
    #[serde(rename = "uniswapv3")]
    UniswapV3,
    #[serde(rename = "venus")]
    Venus,
    #[serde(rename = "wombat")]
    Wombat,
    #[serde(rename = "yearn")]
    Yearn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefiPortfolio {
    pub account_address: String,
    /// Omit to get positions across all supported protocols.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<DefiProtocol>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiAccountPortfolio {
    pub account: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsByAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

/// Raw transaction bundle for the mempool methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub txs_hex: Vec<String>,
    /// Block the bundle should be included in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleStat {
    pub bundle_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

/// Transaction shape accepted by the trace methods (`nonce` omitted,
/// `from` optional).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceType {
    #[serde(rename = "vmTrace")]
    VmTrace,
    #[serde(rename = "trace")]
    Trace,
    #[serde(rename = "stateDiff")]
    StateDiff,
}

/// Log filter options for `eth_newFilter`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Option<String>>>,
}
