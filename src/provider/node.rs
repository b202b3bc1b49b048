use reqwest::Client;
use tracing::debug;

use crate::{
    configuration::Config,
    error::Error,
    provider::fetch_json,
    types::{AccountInformation, NodeStatus},
};

const TOKEN_HEADER: &str = "X-Algo-API-Token";

/// algod v2 REST client.
#[derive(Debug)]
pub struct Node {
    pub config: Config,
    http: Client,
}

impl Node {
    pub fn new(config: Config, http: Client) -> Self {
        Node { config, http }
    }

    pub async fn account_information(
        &self,
        address: &str,
    ) -> Result<AccountInformation, Error> {
        let url = self.config.get_account_information_url(address)?;
        let request = self
            .http
            .get(url)
            .header(TOKEN_HEADER, &self.config.algod_token);

        fetch_json(request, &format!("account {}", address)).await
    }

    /// Blocks on the node until a block after `round` exists, or the node's
    /// own wait limit passes.
    pub async fn wait_for_block_after(
        &self,
        round: u64,
    ) -> Result<NodeStatus, Error> {
        let url = self.config.get_wait_for_block_url(round)?;
        let request = self
            .http
            .get(url)
            .header(TOKEN_HEADER, &self.config.algod_token);

        let status: NodeStatus =
            fetch_json(request, &format!("round {}", round)).await?;
        debug!("Waited for round {}, last round {}", round, status.last_round);

        Ok(status)
    }
}
