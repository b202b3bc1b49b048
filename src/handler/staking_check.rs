use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::{
        eligibility_auditor::{self, AuditReport, Tier},
        reward_apportioner, stake_profit_snapshot, Services,
    },
    model::Staking_Period,
    provider::Notifier,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period_Phase {
    Upcoming,
    Commitment,
    Ended,
}

pub fn period_phase(period: &Staking_Period, now: DateTime<Utc>) -> Period_Phase {
    if period.in_commitment(now) {
        Period_Phase::Commitment
    } else if now >= period.commitment_end {
        Period_Phase::Ended
    } else {
        Period_Phase::Upcoming
    }
}

/// Audits every period whose commitment window contains `now`.
pub async fn audit_active_periods(
    services: &Services<'_>,
    periods: &[Staking_Period],
    tiers: &[Tier],
    now: DateTime<Utc>,
) -> Result<Vec<AuditReport>, Error> {
    let mut reports = vec![];

    for period in periods {
        if period_phase(period, now) != Period_Phase::Commitment {
            continue;
        }

        let report =
            eligibility_auditor::audit_period(services, period, tiers).await?;
        reports.push(report);
    }

    Ok(reports)
}

/// Creates the result of an ended period from its last profit snapshot.
async fn settle_period(
    app_state: &AppState<State>,
    services: &Services<'_>,
    period: &Staking_Period,
) -> Result<(), Error> {
    if !services.results.get_by_period(period.id).await?.is_empty() {
        return Ok(());
    }

    let table = &app_state.database.stake_profit_snapshot;
    let Some(snapshot) = table.get_last_by_period(period.id).await? else {
        debug!("Period {} ended without a profit snapshot", period.id);
        return Ok(());
    };

    let profit = stake_profit_snapshot::profit_to_units(snapshot.profit);
    let result =
        reward_apportioner::create_result(services, period, profit).await?;
    info!(
        "Result {} created for period {} with profit {}",
        result.id, period.id, profit
    );

    Ok(())
}

pub async fn staking_check_task(
    app_state: AppState<State>,
) -> Result<(), Error> {
    let now = Utc::now();
    let services = app_state.services();
    let periods = services.periods.get_all().await?;

    for period in &periods {
        match period_phase(period, now) {
            Period_Phase::Commitment => {
                let Some(casino) = &app_state.casino else {
                    continue;
                };

                if let Err(e) = stake_profit_snapshot::take_snapshot(
                    casino,
                    &app_state.database.stake_profit_snapshot,
                    period,
                )
                .await
                {
                    app_state
                        .http
                        .notify(&format!(
                            "Profit snapshot for period {} failed: {}",
                            period.id, e
                        ))
                        .await;
                }
            },
            Period_Phase::Ended => {
                if let Err(e) = settle_period(&app_state, &services, period).await
                {
                    app_state
                        .http
                        .notify(&format!(
                            "Result for period {} failed: {}",
                            period.id, e
                        ))
                        .await;
                }
            },
            Period_Phase::Upcoming => {},
        }
    }

    audit_active_periods(&services, &periods, &app_state.config.staking_tiers, now)
        .await?;

    Ok(())
}
