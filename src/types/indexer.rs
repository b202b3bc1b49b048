//! Wire shapes of the algod and indexer v2 REST responses.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AssetBalancesResponse {
    #[serde(default)]
    pub balances: Vec<MiniAssetHolding>,
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MiniAssetHolding {
    pub address: String,
    pub amount: u64,
    #[serde(default)]
    pub deleted: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransactionsResponse {
    #[serde(default)]
    pub transactions: Vec<IndexerTransaction>,
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionResponse {
    pub transaction: IndexerTransaction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IndexerTransaction {
    pub id: String,
    pub sender: String,
    pub tx_type: String,
    /// Base64 of the raw note bytes.
    pub note: Option<String>,
    pub round_time: Option<i64>,
    pub confirmed_round: Option<u64>,
    pub asset_transfer_transaction: Option<IndexerAssetTransfer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IndexerAssetTransfer {
    pub amount: u64,
    pub asset_id: u64,
    pub receiver: String,
}

#[derive(Debug, Deserialize)]
pub struct AccountInformation {
    pub amount: u64,
    #[serde(default)]
    pub assets: Vec<AccountAsset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AccountAsset {
    pub asset_id: u64,
    pub amount: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NodeStatus {
    pub last_round: u64,
}
