use std::fmt;

use base64::{engine::general_purpose, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    types::{IndexerTransaction, MiniAssetHolding},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetHolding {
    pub address: String,
    pub amount: u64,
}

impl From<MiniAssetHolding> for AssetHolding {
    fn from(value: MiniAssetHolding) -> Self {
        AssetHolding {
            address: value.address,
            amount: value.amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxType {
    Payment,
    AssetTransfer,
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TxType::Payment => write!(f, "pay"),
            TxType::AssetTransfer => write!(f, "axfer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTransfer {
    pub asset_id: u64,
    pub amount: u64,
    pub receiver: String,
}

/// A confirmed ledger transaction as the jobs see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTransaction {
    pub id: String,
    pub sender: String,
    pub tx_type: String,
    pub note: Vec<u8>,
    pub confirmed_at: DateTime<Utc>,
    pub confirmed_round: u64,
    pub asset_transfer: Option<AssetTransfer>,
}

impl TryFrom<IndexerTransaction> for LedgerTransaction {
    type Error = Error;

    fn try_from(value: IndexerTransaction) -> Result<Self, Self::Error> {
        let note = match value.note {
            Some(note) => general_purpose::STANDARD.decode(note)?,
            None => vec![],
        };

        let round_time = value.round_time.ok_or_else(|| {
            Error::DecodeDateTimeError(format!(
                "transaction {} has no round time",
                value.id
            ))
        })?;

        let confirmed_at = DateTime::from_timestamp(round_time, 0)
            .ok_or_else(|| {
                Error::DecodeDateTimeError(format!(
                    "round time {} out of range",
                    round_time
                ))
            })?;

        Ok(LedgerTransaction {
            id: value.id,
            sender: value.sender,
            tx_type: value.tx_type,
            note,
            confirmed_at,
            confirmed_round: value.confirmed_round.unwrap_or_default(),
            asset_transfer: value.asset_transfer_transaction.map(|transfer| {
                AssetTransfer {
                    asset_id: transfer.asset_id,
                    amount: transfer.amount,
                    receiver: transfer.receiver,
                }
            }),
        })
    }
}

/// One page of a paginated indexer listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}
