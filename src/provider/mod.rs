pub use self::{
    casino::CasinoDatabase,
    database::DatabasePool,
    http::{DepositStatusPayload, DepositWebhook, Notifier, HTTP},
    indexer::Indexer,
    ledger::{collect_pages, fetch_json, LedgerClient, LedgerQuery},
    node::Node,
    signature::{AuthRequest, Ed25519Verifier, SignatureVerifier},
};

mod casino;
mod database;
mod http;
mod indexer;
mod ledger;
mod node;
mod signature;
