use tracing::info;

use crate::{
    error::Error,
    model::{Stake_Profit_Snapshot, Staking_Period, Table},
    provider::CasinoDatabase,
};

/// Records the casino's gross profit from registration begin to commitment
/// end of `period`.
pub async fn take_snapshot(
    casino: &CasinoDatabase,
    table: &Table<Stake_Profit_Snapshot>,
    period: &Staking_Period,
) -> Result<Stake_Profit_Snapshot, Error> {
    let profit = casino
        .gross_profit(period.registration_begin, period.commitment_end)
        .await?;

    let snapshot = table.insert(period.id, profit).await?;
    info!(
        "Profit snapshot {} for period {}: {}",
        snapshot.id, period.id, snapshot.profit
    );

    Ok(snapshot)
}

pub async fn last_known_profit(
    table: &Table<Stake_Profit_Snapshot>,
    staking_period_id: i32,
) -> Result<Stake_Profit_Snapshot, Error> {
    table
        .get_last_by_period(staking_period_id)
        .await?
        .ok_or_else(|| {
            Error::NotFound(format!(
                "profit snapshot for staking period {}",
                staking_period_id
            ))
        })
}

/// Whole units of a recorded profit; losses count as zero.
pub fn profit_to_units(profit: f64) -> u64 {
    if !profit.is_finite() || profit <= 0.0 {
        return 0;
    }

    profit.floor() as u64
}
