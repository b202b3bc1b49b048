use tracing::info;

use crate::{
    error::Error,
    handler::{payment_reconciler::transaction_matches_payment, Services},
    helpers::is_valid_address,
    model::{Payment, Payment_Request, Platform},
    types::{LedgerTransaction, TxType},
};

const TRANSACTION_ID_LENGTH: usize = 52;

pub fn validate_request(data: &Payment_Request) -> Result<(), Error> {
    if data.platform_id <= 0 {
        return Err(Error::ValidationFailure(String::from(
            "platformId must be positive",
        )));
    }

    if data.asset_id == 0 || data.amount == 0 {
        return Err(Error::ValidationFailure(String::from(
            "assetId and amount must be positive",
        )));
    }

    if !is_valid_address(&data.sender) {
        return Err(Error::ValidationFailure(format!(
            "invalid sender address {}",
            data.sender
        )));
    }

    if data.external_id <= 0 {
        return Err(Error::ValidationFailure(String::from(
            "externalId must be positive",
        )));
    }

    Ok(())
}

/// Loads a platform that may still settle payments.
async fn active_platform(
    services: &Services<'_>,
    platform_id: i32,
) -> Result<Platform, Error> {
    let platform = services
        .platforms
        .get(platform_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("platform {}", platform_id)))?;

    if !platform.active {
        return Err(Error::InvalidState(format!(
            "platform {} is not active",
            platform_id
        )));
    }

    Ok(platform)
}

async fn pending_payment(
    services: &Services<'_>,
    id: i32,
) -> Result<Payment, Error> {
    let payment = services
        .payments
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("payment {}", id)))?;

    if !payment.is_pending() {
        return Err(Error::InvalidState(format!(
            "payment {} is {}",
            id, payment.status
        )));
    }

    Ok(payment)
}

pub async fn create_payment(
    services: &Services<'_>,
    data: &Payment_Request,
) -> Result<Payment, Error> {
    validate_request(data)?;
    active_platform(services, data.platform_id).await?;

    let payment = services.payments.insert(data).await?;
    info!(
        "Payment {} created for platform {} (external id {})",
        payment.id, payment.platform_id, payment.external_id
    );

    Ok(payment)
}

/// The transfer must be an asset transfer of the payment's asset to the
/// platform address that also satisfies the match predicate.
pub fn verify_transaction(
    txn: &LedgerTransaction,
    platform: &Platform,
    payment: &Payment,
) -> Result<(), Error> {
    if txn.tx_type != TxType::AssetTransfer.to_string() {
        return Err(Error::ValidationFailure(format!(
            "transaction {} is {}, not an asset transfer",
            txn.id, txn.tx_type
        )));
    }

    let Some(transfer) = &txn.asset_transfer else {
        return Err(Error::ValidationFailure(format!(
            "transaction {} carries no asset transfer",
            txn.id
        )));
    };

    if transfer.asset_id != payment.asset_id
        || transfer.receiver != platform.address
    {
        return Err(Error::ValidationFailure(format!(
            "transaction {} does not pay asset {} to the platform",
            txn.id, payment.asset_id
        )));
    }

    if !transaction_matches_payment(txn, payment) {
        return Err(Error::ValidationFailure(format!(
            "transaction {} does not match payment {}",
            txn.id, payment.id
        )));
    }

    Ok(())
}

/// Completes a payment from a transaction id supplied by the payer,
/// optionally waiting for the round that confirmed it.
pub async fn check_and_complete_payment(
    services: &Services<'_>,
    id: i32,
    transaction_id: &str,
    round: Option<u64>,
) -> Result<Payment, Error> {
    if transaction_id.len() != TRANSACTION_ID_LENGTH {
        return Err(Error::ValidationFailure(format!(
            "invalid transaction id {}",
            transaction_id
        )));
    }

    let payment = pending_payment(services, id).await?;
    let platform = active_platform(services, payment.platform_id).await?;

    if let Some(round) = round {
        services.ledger.round_available(round).await?;
    }

    let txn = services.ledger.transaction_by_id(transaction_id).await?;
    verify_transaction(&txn, &platform, &payment)?;

    complete_payment(services, &platform, id, transaction_id).await
}

/// Conditional `Created -> Completed`; fails with `InvalidState` and leaves
/// the row untouched when the payment is no longer pending.
pub async fn complete_payment(
    services: &Services<'_>,
    platform: &Platform,
    id: i32,
    transaction_id: &str,
) -> Result<Payment, Error> {
    let payment = services
        .payments
        .complete_pending(id, transaction_id)
        .await?
        .ok_or_else(|| {
            Error::InvalidState(format!("payment {} is not pending", id))
        })?;

    services
        .notifier
        .notify(&format!(
            "Payment {} of {} (asset {}) from {} completed with transaction {}",
            payment.id,
            payment.amount,
            payment.asset_id,
            payment.sender,
            transaction_id
        ))
        .await;
    services.webhook.deposit_status(platform, &payment).await;

    Ok(payment)
}

pub async fn cancel_payment(
    services: &Services<'_>,
    id: i32,
) -> Result<Payment, Error> {
    let payment = pending_payment(services, id).await?;
    let platform = active_platform(services, payment.platform_id).await?;

    let payment = services.payments.cancel_pending(id).await?.ok_or_else(
        || Error::InvalidState(format!("payment {} is not pending", id)),
    )?;

    info!("Payment {} cancelled", payment.id);
    services.webhook.deposit_status(&platform, &payment).await;

    Ok(payment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::Payment_Status,
        testing::{address, axfer, payment, platform, ts, FakeLedger, Fixture, CHIP},
    };

    const TXID: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

    fn fixture(ledger: FakeLedger) -> Fixture {
        let fixture = Fixture::new(ledger);
        fixture
            .store
            .platforms
            .lock()
            .unwrap()
            .push(platform(1, &address(9)));
        fixture
            .store
            .payments
            .lock()
            .unwrap()
            .push(payment(1, &address(1), 1_000, 42, ts(10, 0, 0)));
        fixture
    }

    fn request() -> Payment_Request {
        Payment_Request {
            platform_id: 1,
            sender: address(1),
            asset_id: CHIP,
            amount: 1_000,
            external_id: 7,
        }
    }

    #[test]
    fn test_validate_request() {
        assert!(validate_request(&request()).is_ok());

        let mut data = request();
        data.amount = 0;
        assert!(matches!(
            validate_request(&data),
            Err(Error::ValidationFailure(_))
        ));

        let mut data = request();
        data.sender = String::from("NOT-AN-ADDRESS");
        assert!(validate_request(&data).is_err());

        let mut data = request();
        data.external_id = 0;
        assert!(validate_request(&data).is_err());

        let mut data = request();
        data.platform_id = -1;
        assert!(validate_request(&data).is_err());
    }

    #[tokio::test]
    async fn test_create_payment_requires_active_platform() {
        let fixture = fixture(FakeLedger::default());
        let created =
            create_payment(&fixture.services(), &request()).await.unwrap();
        assert_eq!(created.status, Payment_Status::Created);

        fixture.store.platforms.lock().unwrap()[0].active = false;
        assert!(matches!(
            create_payment(&fixture.services(), &request()).await,
            Err(Error::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_check_and_complete_payment() {
        let mut txn =
            axfer(TXID, &address(1), &address(9), 1_000, "42", ts(10, 0, 30));
        txn.confirmed_round = 90;
        let mut ledger = FakeLedger::default().with_transaction(txn);
        ledger.last_round = 100;
        let fixture = fixture(ledger);

        let result =
            check_and_complete_payment(&fixture.services(), 1, TXID, Some(120))
                .await;
        assert!(matches!(result, Err(Error::RoundNotAvailable(120))));

        let completed =
            check_and_complete_payment(&fixture.services(), 1, TXID, Some(90))
                .await
                .unwrap();
        assert_eq!(completed.status, Payment_Status::Completed);
        assert_eq!(completed.transaction_id.as_deref(), Some(TXID));
        assert_eq!(fixture.webhook.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_check_rejects_transaction_settling_another_payment() {
        let ledger = FakeLedger::default().with_transaction(axfer(
            TXID,
            &address(1),
            &address(9),
            1_000,
            "42",
            ts(10, 0, 30),
        ));
        let fixture = fixture(ledger);
        fixture
            .store
            .payments
            .lock()
            .unwrap()
            .push(payment(2, &address(1), 1_000, 42, ts(10, 0, 10)));
        let services = fixture.services();

        check_and_complete_payment(&services, 1, TXID, None)
            .await
            .unwrap();
        let reused = check_and_complete_payment(&services, 2, TXID, None).await;

        assert!(matches!(reused, Err(Error::Conflict(_))));
        let second = fixture.store.payment(2).unwrap();
        assert_eq!(second.status, Payment_Status::Created);
        assert_eq!(second.transaction_id, None);
        assert_eq!(fixture.webhook.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_check_rejects_transfer_to_other_receiver() {
        let ledger = FakeLedger::default().with_transaction(axfer(
            TXID,
            &address(1),
            &address(8),
            1_000,
            "42",
            ts(10, 0, 30),
        ));
        let fixture = fixture(ledger);

        let result =
            check_and_complete_payment(&fixture.services(), 1, TXID, None).await;

        assert!(matches!(result, Err(Error::ValidationFailure(_))));
        assert_eq!(
            fixture.store.payment(1).unwrap().status,
            Payment_Status::Created
        );
    }

    #[tokio::test]
    async fn test_complete_is_not_repeatable() {
        let fixture = fixture(FakeLedger::default());
        let services = fixture.services();
        let platform = platform(1, &address(9));

        complete_payment(&services, &platform, 1, "T1").await.unwrap();
        let before = fixture.store.payment(1).unwrap();

        let again = complete_payment(&services, &platform, 1, "T2").await;
        assert!(matches!(again, Err(Error::InvalidState(_))));

        let after = fixture.store.payment(1).unwrap();
        assert_eq!(after.transaction_id.as_deref(), Some("T1"));
        assert_eq!(after.completed_at, before.completed_at);
        assert_eq!(fixture.notifier.messages().len(), 1);
        assert_eq!(fixture.webhook.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_payment() {
        let fixture = fixture(FakeLedger::default());

        let cancelled = cancel_payment(&fixture.services(), 1).await.unwrap();
        assert_eq!(cancelled.status, Payment_Status::Cancelled);
        assert_eq!(
            fixture.webhook.calls(),
            vec![(1, 1, Payment_Status::Cancelled)]
        );

        assert!(matches!(
            cancel_payment(&fixture.services(), 1).await,
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            cancel_payment(&fixture.services(), 5).await,
            Err(Error::NotFound(_))
        ));
    }
}
