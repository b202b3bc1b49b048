use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use tracing::{debug, error, info};

use crate::{
    error::Error,
    handler::{payment, Services},
    model::Payment,
    types::{LedgerTransaction, TxType},
};

/// A transfer counts for a payment only when confirmed within this many
/// seconds after the payment was created.
pub const MATCH_WINDOW_IN_SEC: i64 = 60;

#[derive(Debug, Clone, Copy)]
pub struct ReconcileSettings {
    pub min_age: Duration,
    pub max_age: Duration,
    pub auto_approve_limit: u64,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub platform_id: i32,
    pub pending: usize,
    pub completed: Vec<i32>,
    pub manual_review: Vec<i32>,
    pub failed: Vec<i32>,
}

/// Amount, sender, note and confirmation time must all agree.
pub fn transaction_matches_payment(
    txn: &LedgerTransaction,
    payment: &Payment,
) -> bool {
    let Some(transfer) = &txn.asset_transfer else {
        return false;
    };

    let window_end = payment.created_at + Duration::seconds(MATCH_WINDOW_IN_SEC);

    transfer.amount == payment.amount
        && txn.sender == payment.sender
        && txn.note == payment.external_id.to_string().as_bytes()
        && txn.confirmed_at >= payment.created_at
        && txn.confirmed_at < window_end
}

/// Reconciles every platform to the end. A failing platform is logged and
/// notified once and leaves no report; the others are unaffected.
pub async fn reconcile_payments(
    services: &Services<'_>,
    platforms: &[i32],
    settings: &ReconcileSettings,
    now: DateTime<Utc>,
) -> Vec<ReconcileReport> {
    let results = join_all(platforms.iter().map(|platform_id| {
        reconcile_platform(services, *platform_id, settings, now)
    }))
    .await;

    let mut reports = vec![];

    for (platform_id, result) in platforms.iter().zip(results) {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!("Payment check for platform {} failed: {}", platform_id, e);
                services
                    .notifier
                    .notify(&format!(
                        "Payment check for platform {} failed: {}",
                        platform_id, e
                    ))
                    .await;
            },
        }
    }

    reports
}

pub async fn reconcile_platform(
    services: &Services<'_>,
    platform_id: i32,
    settings: &ReconcileSettings,
    now: DateTime<Utc>,
) -> Result<ReconcileReport, Error> {
    let mut report = ReconcileReport {
        platform_id,
        ..Default::default()
    };

    let platform = services
        .platforms
        .get(platform_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("platform {}", platform_id)))?;

    if !platform.active {
        debug!("Platform {} is inactive, skipping", platform_id);
        return Ok(report);
    }

    let after = now - settings.max_age;
    let payments = services
        .payments
        .get_pending(platform.id, after, now - settings.min_age)
        .await?;
    report.pending = payments.len();

    if payments.is_empty() {
        return Ok(report);
    }

    let mut assets: Vec<u64> =
        payments.iter().map(|payment| payment.asset_id).collect();
    assets.sort_unstable();
    assets.dedup();

    let mut transactions = vec![];
    for asset_id in assets {
        let data = services
            .ledger
            .transactions_for_address(
                &platform.address,
                asset_id,
                TxType::AssetTransfer,
                after,
                now,
            )
            .await?;

        transactions.extend(data.into_iter().filter(|txn| {
            txn.asset_transfer.as_ref().is_some_and(|transfer| {
                transfer.receiver == platform.address
                    && transfer.asset_id == asset_id
            })
        }));
    }

    // transactions that settled a payment in an earlier run stay claimed
    let mut claimed: HashSet<String> = HashSet::new();
    if !transactions.is_empty() {
        let ids: Vec<String> =
            transactions.iter().map(|txn| txn.id.to_owned()).collect();
        claimed.extend(
            services
                .payments
                .get_by_transaction_ids(&ids)
                .await?
                .into_iter()
                .filter_map(|payment| payment.transaction_id),
        );
    }

    for item in payments {
        let matched = transactions.iter().find(|txn| {
            !claimed.contains(&txn.id)
                && txn
                    .asset_transfer
                    .as_ref()
                    .is_some_and(|transfer| transfer.asset_id == item.asset_id)
                && transaction_matches_payment(txn, &item)
        });

        let Some(txn) = matched else {
            continue;
        };
        claimed.insert(txn.id.to_owned());

        if item.amount > settings.auto_approve_limit {
            services
                .notifier
                .notify(&format!(
                    "Payment {} of {} (asset {}) from {} matched transaction {} and requires manual approval",
                    item.id, item.amount, item.asset_id, item.sender, txn.id
                ))
                .await;
            report.manual_review.push(item.id);
            continue;
        }

        match payment::complete_payment(services, &platform, item.id, &txn.id)
            .await
        {
            Ok(_) => report.completed.push(item.id),
            Err(Error::InvalidState(message) | Error::Conflict(message)) => {
                debug!("Payment {} not completed: {}", item.id, message);
            },
            Err(e) => {
                services
                    .notifier
                    .notify(&format!(
                        "Failed to complete payment {} with transaction {}: {}",
                        item.id, txn.id, e
                    ))
                    .await;
                report.failed.push(item.id);
            },
        }
    }

    info!(
        "Platform {}: {} pending, {} completed, {} for review, {} failed",
        platform_id,
        report.pending,
        report.completed.len(),
        report.manual_review.len(),
        report.failed.len()
    );

    Ok(report)
}
