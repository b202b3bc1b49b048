use tracing::info;

use crate::{
    error::Error,
    handler::Services,
    model::{
        Pledges, Staking_Commitment, Staking_Period, Staking_Result,
        Staking_Result_Item,
    },
};

const LIQUIDITY_SCALE: f64 = 1_000_000.0;

/// Score of a pledge in chip units. Chip pledges count a tenth, integer
/// divided; every liquidity pledge is scaled by the period's chip ratio.
pub fn chip_equivalent(pledges: &Pledges, chip_ratio: f64) -> f64 {
    let lp = pledges.liquidity.saturating_add(pledges.liquidity_v2);
    let liquid_staking = pledges
        .c_algo
        .saturating_add(pledges.t_algo)
        .saturating_add(pledges.m_algo)
        .saturating_add(pledges.x_algo);

    lp as f64 * chip_ratio / LIQUIDITY_SCALE
        + liquid_staking as f64 * chip_ratio / LIQUIDITY_SCALE
        + (pledges.chip / 10) as f64
}

/// Splits `profit` over the eligible commitments by score. Rewards are
/// floored, so their sum may fall short of `profit`.
pub fn apportion(
    period: &Staking_Period,
    commitments: &[Staking_Commitment],
    profit: u64,
) -> Vec<Staking_Result_Item> {
    let mut eligible: Vec<&Staking_Commitment> = commitments
        .iter()
        .filter(|commitment| {
            commitment.eligible && commitment.staking_period_id == period.id
        })
        .collect();
    eligible.sort_by_key(|commitment| commitment.id);

    let scores: Vec<(&Staking_Commitment, f64)> = eligible
        .into_iter()
        .map(|commitment| {
            (
                commitment,
                chip_equivalent(&commitment.pledges, period.chip_ratio),
            )
        })
        .collect();

    let total: f64 = scores.iter().map(|(_, score)| score).sum();

    if total <= 0.0 {
        return vec![];
    }

    scores
        .into_iter()
        .map(|(commitment, score)| {
            let share = score / total;

            Staking_Result_Item {
                algorand_address: commitment.algorand_address.to_owned(),
                percent: share * 100.0,
                reward: (profit as f64 * share).floor() as u64,
            }
        })
        .collect()
}

/// Apportions `profit` for a period and stores the result. A period has
/// at most one result.
pub async fn create_result(
    services: &Services<'_>,
    period: &Staking_Period,
    profit: u64,
) -> Result<Staking_Result, Error> {
    if !services.results.get_by_period(period.id).await?.is_empty() {
        return Err(Error::Conflict(format!(
            "staking period {} already has a result",
            period.id
        )));
    }

    let commitments = services.commitments.get_by_period(period.id).await?;
    let items = apportion(period, &commitments, profit);

    let distributed: u64 = items.iter().map(|item| item.reward).sum();
    info!(
        "Period {}: {} of {} distributed over {} commitments, {} undistributed",
        period.id,
        distributed,
        profit,
        items.len(),
        profit.saturating_sub(distributed)
    );

    services.results.insert(period.id, profit, items).await
}
