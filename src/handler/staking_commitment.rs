use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    error::Error,
    handler::Services,
    helpers::is_valid_address,
    model::{
        Pledges, Staking_Commitment, Staking_Commitment_Request,
        Staking_Period,
    },
    provider::AuthRequest,
};

/// Commitments may only change while `now` is in `[begin, end)`.
pub fn check_registration_window(
    period: &Staking_Period,
    now: DateTime<Utc>,
) -> Result<(), Error> {
    if now < period.registration_begin {
        return Err(Error::RegistrationNotOpen);
    }

    if now >= period.registration_end {
        return Err(Error::RegistrationClosed);
    }

    Ok(())
}

async fn get_period(
    services: &Services<'_>,
    id: i32,
) -> Result<Staking_Period, Error> {
    services
        .periods
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("staking period {}", id)))
}

pub async fn create_commitment(
    services: &Services<'_>,
    data: &Staking_Commitment_Request,
    auth: &AuthRequest,
    now: DateTime<Utc>,
) -> Result<Staking_Commitment, Error> {
    if !is_valid_address(&data.algorand_address) {
        return Err(Error::ValidationFailure(format!(
            "invalid address {}",
            data.algorand_address
        )));
    }

    services.verifier.verify(&data.algorand_address, auth)?;

    let period = get_period(services, data.staking_period_id).await?;
    check_registration_window(&period, now)?;

    let commitment = services
        .commitments
        .insert(period.id, &data.algorand_address, &data.pledges)
        .await?;

    info!(
        "Commitment {} registered by {} for period {}",
        commitment.id, commitment.algorand_address, period.id
    );

    Ok(commitment)
}

/// Replaces every pledge of an existing commitment.
pub async fn update_commitment(
    services: &Services<'_>,
    id: i32,
    pledges: &Pledges,
    auth: &AuthRequest,
    now: DateTime<Utc>,
) -> Result<Staking_Commitment, Error> {
    let commitment = find_by_id(services, id).await?;

    services.verifier.verify(&commitment.algorand_address, auth)?;

    let period = get_period(services, commitment.staking_period_id).await?;
    check_registration_window(&period, now)?;

    let updated = services
        .commitments
        .update_pledges(id, pledges)
        .await?
        .ok_or_else(|| Error::NotFound(format!("staking commitment {}", id)))?;

    services
        .notifier
        .notify(&format!(
            "{} updated commitment {} from ({}) to ({})",
            commitment.algorand_address, id, commitment.pledges, updated.pledges
        ))
        .await;

    Ok(updated)
}

pub async fn update_eligibility(
    services: &Services<'_>,
    id: i32,
    eligible: bool,
) -> Result<Staking_Commitment, Error> {
    services
        .commitments
        .update_eligibility(id, eligible)
        .await?
        .ok_or_else(|| Error::NotFound(format!("staking commitment {}", id)))
}

pub async fn find_by_period(
    services: &Services<'_>,
    staking_period_id: i32,
) -> Result<Vec<Staking_Commitment>, Error> {
    services.commitments.get_by_period(staking_period_id).await
}

pub async fn find_by_id(
    services: &Services<'_>,
    id: i32,
) -> Result<Staking_Commitment, Error> {
    services
        .commitments
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("staking commitment {}", id)))
}
