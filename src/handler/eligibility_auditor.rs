//! Checks the pledges of a staking period against live holder lists.
//!
//! Tiers are walked in configured order. An address leaves the working set
//! once it is revoked, fully verified, or has nothing left to verify; whoever
//! pledged a tier but is missing from its holder list is revoked as
//! fraudulent at the end of the run.

use std::{
    collections::{BTreeMap, HashSet},
    fmt,
};

use tracing::{info, warn};

use crate::{
    error::Error,
    handler::Services,
    model::{Pledge_Tier, Pledges, Staking_Commitment, Staking_Period},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    pub kind: Pledge_Tier,
    pub asset_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revocation {
    Shortfall {
        tier: Pledge_Tier,
        pledged: u64,
        balance: u64,
    },
    Fraudulent(Pledges),
}

impl fmt::Display for Revocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Revocation::Shortfall {
                tier,
                pledged,
                balance,
            } => write!(
                f,
                "shortfall: pledged {} {} but holds {}",
                pledged, tier, balance
            ),
            Revocation::Fraudulent(pledges) => write!(
                f,
                "fraudulent: pledged {} but was absent from the holder lists",
                pledges
            ),
        }
    }
}

#[derive(Debug, Default)]
pub struct AuditReport {
    pub staking_period_id: i32,
    pub total: usize,
    pub checked: usize,
    pub revoked: Vec<(String, Revocation)>,
    pub failed: Vec<String>,
}

/// True when none of `tiers` asks anything of `pledges`.
fn nothing_left(tiers: &[Tier], pledges: &Pledges) -> bool {
    tiers.iter().all(|tier| tier.kind.pledge(pledges) == 0)
}

async fn revoke(
    services: &Services<'_>,
    commitment: &Staking_Commitment,
    reason: Revocation,
    report: &mut AuditReport,
) {
    let address = commitment.algorand_address.to_owned();

    match services
        .commitments
        .update_eligibility(commitment.id, false)
        .await
    {
        Ok(_) => {
            let message = format!(
                "{} removed from eligibility for period {}, {}",
                address, commitment.staking_period_id, reason
            );
            warn!("{}", message);
            services.notifier.notify(&message).await;
            report.revoked.push((address, reason));
        },
        Err(e) => {
            services
                .notifier
                .notify(&format!(
                    "Failed to remove {} from eligibility for period {}: {}",
                    address, commitment.staking_period_id, e
                ))
                .await;
            report.failed.push(address);
        },
    }
}

/// Ledger failures abort the run; revocations already written stay.
pub async fn audit_period(
    services: &Services<'_>,
    period: &Staking_Period,
    tiers: &[Tier],
) -> Result<AuditReport, Error> {
    let commitments = services.commitments.get_by_period(period.id).await?;

    let mut report = AuditReport {
        staking_period_id: period.id,
        total: commitments.len(),
        ..Default::default()
    };

    let mut working: BTreeMap<String, Staking_Commitment> = commitments
        .into_iter()
        .filter(|commitment| commitment.eligible)
        .map(|commitment| (commitment.algorand_address.to_owned(), commitment))
        .collect();
    report.checked = working.len();

    let mut fraudulent: Vec<Staking_Commitment> = vec![];

    for (index, tier) in tiers.iter().enumerate() {
        if working.is_empty() {
            break;
        }

        let later = &tiers[index + 1..];
        let holders = services
            .ledger
            .accounts_holding_asset(tier.asset_id, 0)
            .await?;
        info!(
            "Period {}: {} holders of {} ({})",
            period.id,
            holders.len(),
            tier.kind,
            tier.asset_id
        );

        let mut seen: HashSet<String> = HashSet::new();

        for holding in holders {
            let Some(commitment) = working.get(&holding.address) else {
                continue;
            };

            let pledged = tier.kind.pledge(&commitment.pledges);
            let verified = nothing_left(later, &commitment.pledges);
            seen.insert(holding.address.to_owned());

            if holding.amount < pledged {
                if let Some(commitment) = working.remove(&holding.address) {
                    let reason = Revocation::Shortfall {
                        tier: tier.kind,
                        pledged,
                        balance: holding.amount,
                    };
                    revoke(services, &commitment, reason, &mut report).await;
                }
            } else if verified {
                working.remove(&holding.address);
            }
        }

        let absent: Vec<String> = working
            .iter()
            .filter(|(address, commitment)| {
                !seen.contains(*address)
                    && tier.kind.pledge(&commitment.pledges) > 0
            })
            .map(|(address, _)| address.to_owned())
            .collect();

        for address in absent {
            if let Some(commitment) = working.remove(&address) {
                fraudulent.push(commitment);
            }
        }

        let remaining = &tiers[index..];
        working
            .retain(|_, commitment| !nothing_left(remaining, &commitment.pledges));
    }

    fraudulent.extend(working.into_values());
    fraudulent.sort_by_key(|commitment| commitment.id);

    for commitment in fraudulent {
        let reason = Revocation::Fraudulent(commitment.pledges);
        revoke(services, &commitment, reason, &mut report).await;
    }

    services
        .notifier
        .notify(&format!(
            "Completed staking eligibility check for period {}: {} of {} eligible commitments revoked ({} total)",
            period.id,
            report.revoked.len(),
            report.checked,
            report.total
        ))
        .await;

    Ok(report)
}
