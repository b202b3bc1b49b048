pub use self::{
    indexer::{
        AccountAsset, AccountInformation, AssetBalancesResponse,
        IndexerAssetTransfer, IndexerTransaction, MiniAssetHolding,
        NodeStatus, TransactionResponse, TransactionsResponse,
    },
    ledger::{AssetHolding, AssetTransfer, LedgerTransaction, Page, TxType},
};

mod indexer;
mod ledger;
