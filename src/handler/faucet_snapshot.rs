use tracing::info;

use crate::{
    configuration::{AppState, State},
    error::Error,
    model::{Faucet_Snapshot, Snapshot_Account},
    provider::{LedgerQuery, Notifier},
    types::AssetHolding,
};

pub fn filter_denylisted(
    holders: Vec<AssetHolding>,
    denylist: &[String],
) -> Vec<Snapshot_Account> {
    holders
        .into_iter()
        .filter(|holding| !denylist.contains(&holding.address))
        .map(|holding| Snapshot_Account {
            address: holding.address,
            balance: holding.amount,
        })
        .collect()
}

/// Holders of `asset_id` with at least `minimum_balance`, minus the
/// denylisted addresses.
pub async fn collect_snapshot(
    ledger: &dyn LedgerQuery,
    asset_id: u64,
    minimum_balance: u64,
    denylist: &[String],
) -> Result<Vec<Snapshot_Account>, Error> {
    let holders = ledger
        .accounts_holding_asset(asset_id, minimum_balance)
        .await?;

    Ok(filter_denylisted(holders, denylist))
}

/// One snapshot per configured asset. A failing asset is reported and the
/// remaining assets are still taken.
pub async fn take_snapshots(
    app_state: AppState<State>,
) -> Result<Vec<Faucet_Snapshot>, Error> {
    let config = &app_state.config;
    let mut snapshots = vec![];

    for asset_id in &config.snapshot_assets {
        let accounts = collect_snapshot(
            &app_state.ledger,
            *asset_id,
            config.snapshot_minimum_balance,
            &config.snapshot_denylist,
        )
        .await;

        let result = match accounts {
            Ok(accounts) => {
                app_state
                    .database
                    .faucet_snapshot
                    .insert(*asset_id, accounts)
                    .await
            },
            Err(e) => Err(e),
        };

        match result {
            Ok(snapshot) => {
                info!(
                    "Snapshot {} of asset {}: {} holders",
                    snapshot.id,
                    snapshot.asset_id,
                    snapshot.accounts.len()
                );
                snapshots.push(snapshot);
            },
            Err(e) => {
                app_state
                    .http
                    .notify(&format!(
                        "Snapshot of asset {} failed: {}",
                        asset_id, e
                    ))
                    .await;
            },
        }
    }

    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{address, FakeLedger};

    #[test]
    fn test_filter_denylisted() {
        let holders = vec![
            AssetHolding {
                address: address(1),
                amount: 5,
            },
            AssetHolding {
                address: address(2),
                amount: 7,
            },
        ];

        let accounts = filter_denylisted(holders, &[address(2)]);

        assert_eq!(
            accounts,
            vec![Snapshot_Account {
                address: address(1),
                balance: 5,
            }]
        );
    }

    #[tokio::test]
    async fn test_collect_snapshot_minimum_is_inclusive() {
        let ledger = FakeLedger::default().with_holders(
            10,
            &[
                (&address(1), 999_999),
                (&address(2), 1_000_000),
                (&address(3), 2_000_000),
            ],
        );

        let accounts =
            collect_snapshot(&ledger, 10, 1_000_000, &[address(3)])
                .await
                .unwrap();

        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].address, address(2));
    }

    #[tokio::test]
    async fn test_collect_snapshot_propagates_ledger_failure() {
        let ledger = FakeLedger::default().failing(10);
        let result = collect_snapshot(&ledger, 10, 0, &[]).await;
        assert!(matches!(result, Err(Error::UpstreamUnavailable(_))));
    }
}
