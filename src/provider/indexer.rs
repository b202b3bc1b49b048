use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;

use crate::{
    configuration::Config,
    error::Error,
    provider::fetch_json,
    types::{
        AssetBalancesResponse, AssetHolding, LedgerTransaction, Page,
        TransactionResponse, TransactionsResponse, TxType,
    },
};

const TOKEN_HEADER: &str = "X-Indexer-API-Token";

/// Indexer v2 REST client. Listing calls return one page at a time; the
/// ledger client drives pagination.
#[derive(Debug)]
pub struct Indexer {
    pub config: Config,
    http: Client,
}

impl Indexer {
    pub fn new(config: Config, http: Client) -> Self {
        Indexer { config, http }
    }

    pub async fn asset_balances_page(
        &self,
        asset_id: u64,
        minimum_balance: u64,
        next: Option<String>,
    ) -> Result<Page<AssetHolding>, Error> {
        let mut url = self.config.get_asset_balances_url(asset_id)?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("include-all", "false");
            // the indexer filter is exclusive
            if minimum_balance > 0 {
                query.append_pair(
                    "currency-greater-than",
                    &(minimum_balance - 1).to_string(),
                );
            }
            if let Some(next) = &next {
                query.append_pair("next", next);
            }
        }

        let request = self
            .http
            .get(url)
            .header(TOKEN_HEADER, &self.config.indexer_token);
        let response: AssetBalancesResponse =
            fetch_json(request, &format!("asset {} balances", asset_id))
                .await?;

        let items = response
            .balances
            .into_iter()
            .filter(|holding| !holding.deleted.unwrap_or(false))
            .map(AssetHolding::from)
            .collect();

        Ok(Page {
            items,
            next_token: response.next_token,
        })
    }

    pub async fn account_transactions_page(
        &self,
        address: &str,
        asset_id: u64,
        tx_type: TxType,
        after: DateTime<Utc>,
        before: DateTime<Utc>,
        next: Option<String>,
    ) -> Result<Page<LedgerTransaction>, Error> {
        let mut url = self.config.get_account_transactions_url(address)?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("asset-id", &asset_id.to_string());
            query.append_pair("tx-type", &tx_type.to_string());
            query.append_pair(
                "after-time",
                &after.to_rfc3339_opts(SecondsFormat::Secs, true),
            );
            query.append_pair(
                "before-time",
                &before.to_rfc3339_opts(SecondsFormat::Secs, true),
            );
            if let Some(next) = &next {
                query.append_pair("next", next);
            }
        }

        let request = self
            .http
            .get(url)
            .header(TOKEN_HEADER, &self.config.indexer_token);
        let response: TransactionsResponse =
            fetch_json(request, &format!("transactions of {}", address))
                .await?;

        let mut items = Vec::with_capacity(response.transactions.len());
        for transaction in response.transactions {
            items.push(LedgerTransaction::try_from(transaction)?);
        }

        Ok(Page {
            items,
            next_token: response.next_token,
        })
    }

    pub async fn transaction(
        &self,
        id: &str,
    ) -> Result<LedgerTransaction, Error> {
        let url = self.config.get_transaction_url(id)?;
        let request = self
            .http
            .get(url)
            .header(TOKEN_HEADER, &self.config.indexer_token);
        let response: TransactionResponse =
            fetch_json(request, &format!("transaction {}", id)).await?;

        LedgerTransaction::try_from(response.transaction)
    }
}
