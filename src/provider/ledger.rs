use std::future::Future;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::{self, Duration};
use tracing::debug;

use crate::{
    configuration::Config,
    error::Error,
    provider::{Indexer, Node},
    types::{AssetHolding, LedgerTransaction, Page, TxType},
};

/// Read access to the ledger, consumed by every job.
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    /// Balance of `asset_id` held by `address`; asset 0 is the native coin.
    async fn account_balance(
        &self,
        address: &str,
        asset_id: u64,
    ) -> Result<u64, Error>;

    /// Every account holding at least `minimum_balance` of the asset.
    async fn accounts_holding_asset(
        &self,
        asset_id: u64,
        minimum_balance: u64,
    ) -> Result<Vec<AssetHolding>, Error>;

    async fn transactions_for_address(
        &self,
        address: &str,
        asset_id: u64,
        tx_type: TxType,
        after: DateTime<Utc>,
        before: DateTime<Utc>,
    ) -> Result<Vec<LedgerTransaction>, Error>;

    async fn transaction_by_id(
        &self,
        id: &str,
    ) -> Result<LedgerTransaction, Error>;

    /// Waits until the node has produced `round`.
    async fn round_available(&self, round: u64) -> Result<(), Error>;
}

/// Follows continuation tokens until the listing is exhausted, sleeping
/// `delay` between requests. Any failed page fails the whole listing.
pub async fn collect_pages<T, F, Fut>(
    delay: Duration,
    mut fetch: F,
) -> Result<Vec<T>, Error>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, Error>>,
{
    let mut items = vec![];
    let mut next_token: Option<String> = None;
    let mut pages = 0;

    loop {
        let page = fetch(next_token.take()).await?;
        pages += 1;
        items.extend(page.items);

        match page.next_token.filter(|token| !token.is_empty()) {
            Some(token) => {
                next_token = Some(token);
                if !delay.is_zero() {
                    time::sleep(delay).await;
                }
            },
            None => break,
        }
    }

    debug!("Collected {} items over {} pages", items.len(), pages);

    Ok(items)
}

/// Sends `request` and decodes a JSON body, mapping transport and status
/// failures onto the error taxonomy.
pub async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    resource: &str,
) -> Result<T, Error> {
    let response = request.send().await.map_err(|error| {
        Error::UpstreamUnavailable(format!("{}: {}", resource, error))
    })?;

    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound(resource.to_owned()));
    }

    if !status.is_success() {
        return Err(Error::UpstreamUnavailable(format!(
            "{} returned {}",
            resource, status
        )));
    }

    response.json::<T>().await.map_err(|error| {
        Error::UpstreamUnavailable(format!("{}: {}", resource, error))
    })
}

#[derive(Debug)]
pub struct LedgerClient {
    pub node: Node,
    pub indexer: Indexer,
    page_delay: Duration,
}

impl LedgerClient {
    pub fn new(config: &Config) -> Result<LedgerClient, Error> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(LedgerClient {
            node: Node::new(config.clone(), http.clone()),
            indexer: Indexer::new(config.clone(), http),
            page_delay: Duration::from_millis(config.indexer_page_delay),
        })
    }
}

#[async_trait]
impl LedgerQuery for LedgerClient {
    async fn account_balance(
        &self,
        address: &str,
        asset_id: u64,
    ) -> Result<u64, Error> {
        let info = self.node.account_information(address).await?;

        if asset_id == 0 {
            return Ok(info.amount);
        }

        info.assets
            .iter()
            .find(|asset| asset.asset_id == asset_id)
            .map(|asset| asset.amount)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "asset {} not held by {}",
                    asset_id, address
                ))
            })
    }

    async fn accounts_holding_asset(
        &self,
        asset_id: u64,
        minimum_balance: u64,
    ) -> Result<Vec<AssetHolding>, Error> {
        let indexer = &self.indexer;

        collect_pages(self.page_delay, move |next| {
            indexer.asset_balances_page(asset_id, minimum_balance, next)
        })
        .await
    }

    async fn transactions_for_address(
        &self,
        address: &str,
        asset_id: u64,
        tx_type: TxType,
        after: DateTime<Utc>,
        before: DateTime<Utc>,
    ) -> Result<Vec<LedgerTransaction>, Error> {
        let indexer = &self.indexer;

        collect_pages(self.page_delay, move |next| {
            indexer.account_transactions_page(
                address, asset_id, tx_type, after, before, next,
            )
        })
        .await
    }

    async fn transaction_by_id(
        &self,
        id: &str,
    ) -> Result<LedgerTransaction, Error> {
        self.indexer.transaction(id).await
    }

    async fn round_available(&self, round: u64) -> Result<(), Error> {
        let status = self.node.wait_for_block_after(round).await?;

        if status.last_round < round {
            return Err(Error::RoundNotAvailable(round));
        }

        Ok(())
    }
}
