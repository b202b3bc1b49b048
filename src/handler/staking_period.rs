use tracing::info;

use crate::{
    error::Error,
    handler::Services,
    model::{Staking_Period, Staking_Period_Request},
};

pub fn validate_request(data: &Staking_Period_Request) -> Result<(), Error> {
    if data.registration_begin >= data.registration_end {
        return Err(Error::ValidationFailure(String::from(
            "registration must begin before it ends",
        )));
    }

    if data.commitment_begin >= data.commitment_end {
        return Err(Error::ValidationFailure(String::from(
            "commitment must begin before it ends",
        )));
    }

    if data.registration_begin > data.commitment_begin {
        return Err(Error::ValidationFailure(String::from(
            "registration cannot begin after commitment",
        )));
    }

    if !data.chip_ratio.is_finite() || data.chip_ratio <= 0.0 {
        return Err(Error::ValidationFailure(format!(
            "invalid chip ratio {}",
            data.chip_ratio
        )));
    }

    Ok(())
}

pub async fn create_period(
    services: &Services<'_>,
    data: &Staking_Period_Request,
) -> Result<Staking_Period, Error> {
    validate_request(data)?;

    let period = services.periods.insert(data).await?;
    info!(
        "Staking period {} created, commitment {} to {}",
        period.id, period.commitment_begin, period.commitment_end
    );

    Ok(period)
}

pub async fn find_by_id(
    services: &Services<'_>,
    id: i32,
) -> Result<Staking_Period, Error> {
    services
        .periods
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("staking period {}", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ts, FakeLedger, Fixture};

    fn request() -> Staking_Period_Request {
        Staking_Period_Request {
            registration_begin: ts(1, 0, 0),
            registration_end: ts(2, 0, 0),
            commitment_begin: ts(2, 0, 0),
            commitment_end: ts(20, 0, 0),
            chip_ratio: 1.5,
        }
    }

    #[test]
    fn test_validate_request() {
        assert!(validate_request(&request()).is_ok());

        let mut data = request();
        data.registration_end = data.registration_begin;
        assert!(validate_request(&data).is_err());

        let mut data = request();
        data.commitment_begin = ts(0, 30, 0);
        assert!(validate_request(&data).is_err());

        let mut data = request();
        data.chip_ratio = 0.0;
        assert!(validate_request(&data).is_err());

        let mut data = request();
        data.chip_ratio = f64::NAN;
        assert!(validate_request(&data).is_err());
    }

    #[tokio::test]
    async fn test_create_and_find_period() {
        let fixture = Fixture::new(FakeLedger::default());
        let services = fixture.services();

        let period = create_period(&services, &request()).await.unwrap();
        assert_eq!(find_by_id(&services, period.id).await.unwrap().chip_ratio, 1.5);
        assert!(matches!(
            find_by_id(&services, 42).await,
            Err(Error::NotFound(_))
        ));
    }
}
