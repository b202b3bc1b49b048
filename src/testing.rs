//! In-memory stand-ins for the ledger, storage and notification seams.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::types::Json;

use crate::{
    dao::{
        PaymentRepository, PlatformRepository, StakingCommitmentRepository,
        StakingPeriodRepository, StakingResultRepository,
    },
    error::Error,
    handler::Services,
    helpers::encode_address,
    model::{
        Payment, Payment_Request, Payment_Status, Platform, Platform_Request,
        Pledges, Staking_Commitment, Staking_Period, Staking_Period_Request,
        Staking_Result, Staking_Result_Item,
    },
    provider::{
        AuthRequest, DepositWebhook, LedgerQuery, Notifier, SignatureVerifier,
    },
    types::{AssetHolding, AssetTransfer, LedgerTransaction, TxType},
};

pub const CHIP: u64 = 388_592_191;

pub fn ts(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, hour, minute, second)
        .single()
        .unwrap_or_default()
}

pub fn address(seed: u8) -> String {
    encode_address(&[seed; 32])
}

pub fn platform(id: i32, receiver: &str) -> Platform {
    Platform {
        id,
        name: format!("platform-{}", id),
        active: true,
        address: receiver.to_owned(),
        webhook_url: Some(format!("https://platform-{}.test/hook", id)),
    }
}

pub fn payment(
    id: i32,
    sender: &str,
    amount: u64,
    external_id: i64,
    created_at: DateTime<Utc>,
) -> Payment {
    Payment {
        id,
        platform_id: 1,
        status: Payment_Status::Created,
        created_at,
        cancelled_at: None,
        completed_at: None,
        sender: sender.to_owned(),
        asset_id: CHIP,
        amount,
        transaction_id: None,
        external_id,
    }
}

pub fn axfer(
    id: &str,
    sender: &str,
    receiver: &str,
    amount: u64,
    note: &str,
    confirmed_at: DateTime<Utc>,
) -> LedgerTransaction {
    LedgerTransaction {
        id: id.to_owned(),
        sender: sender.to_owned(),
        tx_type: TxType::AssetTransfer.to_string(),
        note: note.as_bytes().to_vec(),
        confirmed_at,
        confirmed_round: 1_000,
        asset_transfer: Some(AssetTransfer {
            asset_id: CHIP,
            amount,
            receiver: receiver.to_owned(),
        }),
    }
}

pub fn period(id: i32) -> Staking_Period {
    Staking_Period {
        id,
        registration_begin: ts(1, 0, 0),
        registration_end: ts(2, 0, 0),
        commitment_begin: ts(2, 0, 0),
        commitment_end: ts(20, 0, 0),
        chip_ratio: 1.0,
    }
}

pub fn commitment(
    id: i32,
    staking_period_id: i32,
    algorand_address: &str,
    pledges: Pledges,
) -> Staking_Commitment {
    Staking_Commitment {
        id,
        staking_period_id,
        algorand_address: algorand_address.to_owned(),
        created_at: ts(1, 30, 0),
        updated_at: None,
        pledges,
        eligible: true,
    }
}

#[derive(Default)]
pub struct FakeLedger {
    pub holders: HashMap<u64, Vec<AssetHolding>>,
    pub failing_assets: HashSet<u64>,
    pub transactions: Vec<LedgerTransaction>,
    pub last_round: u64,
    pub holder_queries: Mutex<Vec<u64>>,
    pub transaction_queries: Mutex<usize>,
}

impl FakeLedger {
    pub fn with_holders(mut self, asset_id: u64, holders: &[(&str, u64)]) -> Self {
        self.holders.insert(
            asset_id,
            holders
                .iter()
                .map(|(address, amount)| AssetHolding {
                    address: (*address).to_owned(),
                    amount: *amount,
                })
                .collect(),
        );
        self
    }

    pub fn with_transaction(mut self, transaction: LedgerTransaction) -> Self {
        self.transactions.push(transaction);
        self
    }

    pub fn failing(mut self, asset_id: u64) -> Self {
        self.failing_assets.insert(asset_id);
        self
    }

    pub fn holder_queries(&self) -> Vec<u64> {
        self.holder_queries.lock().unwrap().clone()
    }

    pub fn transaction_queries(&self) -> usize {
        *self.transaction_queries.lock().unwrap()
    }
}

#[async_trait]
impl LedgerQuery for FakeLedger {
    async fn account_balance(
        &self,
        address: &str,
        asset_id: u64,
    ) -> Result<u64, Error> {
        self.holders
            .get(&asset_id)
            .and_then(|holders| {
                holders.iter().find(|holding| holding.address == address)
            })
            .map(|holding| holding.amount)
            .ok_or_else(|| Error::NotFound(address.to_owned()))
    }

    async fn accounts_holding_asset(
        &self,
        asset_id: u64,
        minimum_balance: u64,
    ) -> Result<Vec<AssetHolding>, Error> {
        self.holder_queries.lock().unwrap().push(asset_id);

        if self.failing_assets.contains(&asset_id) {
            return Err(Error::UpstreamUnavailable(format!(
                "asset {} balances",
                asset_id
            )));
        }

        Ok(self
            .holders
            .get(&asset_id)
            .map(|holders| {
                holders
                    .iter()
                    .filter(|holding| holding.amount >= minimum_balance)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn transactions_for_address(
        &self,
        address: &str,
        asset_id: u64,
        _tx_type: TxType,
        after: DateTime<Utc>,
        before: DateTime<Utc>,
    ) -> Result<Vec<LedgerTransaction>, Error> {
        *self.transaction_queries.lock().unwrap() += 1;

        if self.failing_assets.contains(&asset_id) {
            return Err(Error::UpstreamUnavailable(format!(
                "transactions of {}",
                address
            )));
        }

        Ok(self
            .transactions
            .iter()
            .filter(|txn| {
                txn.asset_transfer.as_ref().is_some_and(|transfer| {
                    transfer.asset_id == asset_id
                        && (transfer.receiver == address
                            || txn.sender == address)
                })
            })
            .filter(|txn| txn.confirmed_at >= after && txn.confirmed_at <= before)
            .cloned()
            .collect())
    }

    async fn transaction_by_id(
        &self,
        id: &str,
    ) -> Result<LedgerTransaction, Error> {
        self.transactions
            .iter()
            .find(|txn| txn.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))
    }

    async fn round_available(&self, round: u64) -> Result<(), Error> {
        if round <= self.last_round {
            Ok(())
        } else {
            Err(Error::RoundNotAvailable(round))
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_owned());
    }
}

#[derive(Default)]
pub struct RecordingWebhook {
    pub calls: Mutex<Vec<(i32, i32, Payment_Status)>>,
}

impl RecordingWebhook {
    pub fn calls(&self) -> Vec<(i32, i32, Payment_Status)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DepositWebhook for RecordingWebhook {
    async fn deposit_status(&self, platform: &Platform, payment: &Payment) {
        self.calls
            .lock()
            .unwrap()
            .push((platform.id, payment.id, payment.status));
    }
}

/// Accepts any request whose address matches and whose signature is "valid".
#[derive(Default)]
pub struct StaticVerifier;

impl SignatureVerifier for StaticVerifier {
    fn verify(&self, address: &str, auth: &AuthRequest) -> Result<(), Error> {
        if auth.address == address && auth.signature == "valid" {
            Ok(())
        } else {
            Err(Error::Unauthorized(String::from("bad signature")))
        }
    }
}

pub fn auth_for(address: &str) -> AuthRequest {
    AuthRequest {
        address: address.to_owned(),
        message: String::new(),
        signature: String::from("valid"),
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub payments: Mutex<Vec<Payment>>,
    pub platforms: Mutex<Vec<Platform>>,
    pub periods: Mutex<Vec<Staking_Period>>,
    pub commitments: Mutex<Vec<Staking_Commitment>>,
    pub results: Mutex<Vec<Staking_Result>>,
    pub failing_commitments: Mutex<HashSet<i32>>,
}

impl MemoryStore {
    pub fn payment(&self, id: i32) -> Option<Payment> {
        self.payments
            .lock()
            .unwrap()
            .iter()
            .find(|payment| payment.id == id)
            .cloned()
    }

    pub fn commitment(&self, id: i32) -> Option<Staking_Commitment> {
        self.commitments
            .lock()
            .unwrap()
            .iter()
            .find(|commitment| commitment.id == id)
            .cloned()
    }
}

#[async_trait]
impl PaymentRepository for MemoryStore {
    async fn get(&self, id: i32) -> Result<Option<Payment>, Error> {
        Ok(self.payment(id))
    }

    async fn get_pending(
        &self,
        platform_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Payment>, Error> {
        let mut data: Vec<Payment> = self
            .payments
            .lock()
            .unwrap()
            .iter()
            .filter(|payment| {
                payment.platform_id == platform_id
                    && payment.is_pending()
                    && payment.created_at >= from
                    && payment.created_at <= to
            })
            .cloned()
            .collect();
        data.sort_by_key(|payment| (payment.created_at, payment.id));
        Ok(data)
    }

    async fn get_by_transaction_ids(
        &self,
        transaction_ids: &[String],
    ) -> Result<Vec<Payment>, Error> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .iter()
            .filter(|payment| {
                payment
                    .transaction_id
                    .as_ref()
                    .is_some_and(|id| transaction_ids.contains(id))
            })
            .cloned()
            .collect())
    }

    async fn insert(&self, data: &Payment_Request) -> Result<Payment, Error> {
        let mut payments = self.payments.lock().unwrap();
        let payment = Payment {
            id: payments.len() as i32 + 1,
            platform_id: data.platform_id,
            status: Payment_Status::Created,
            created_at: Utc::now(),
            cancelled_at: None,
            completed_at: None,
            sender: data.sender.to_owned(),
            asset_id: data.asset_id,
            amount: data.amount,
            transaction_id: None,
            external_id: data.external_id,
        };
        payments.push(payment.clone());
        Ok(payment)
    }

    async fn complete_pending(
        &self,
        id: i32,
        transaction_id: &str,
    ) -> Result<Option<Payment>, Error> {
        let mut payments = self.payments.lock().unwrap();
        let Some(index) = payments
            .iter()
            .position(|payment| payment.id == id && payment.is_pending())
        else {
            return Ok(None);
        };

        if payments.iter().any(|payment| {
            payment.transaction_id.as_deref() == Some(transaction_id)
        }) {
            return Err(Error::Conflict(format!(
                "transaction {} already settled a payment",
                transaction_id
            )));
        }

        let payment = &mut payments[index];
        payment.status = Payment_Status::Completed;
        payment.completed_at = Some(Utc::now());
        payment.transaction_id = Some(transaction_id.to_owned());
        Ok(Some(payment.clone()))
    }

    async fn cancel_pending(&self, id: i32) -> Result<Option<Payment>, Error> {
        let mut payments = self.payments.lock().unwrap();
        let Some(payment) = payments
            .iter_mut()
            .find(|payment| payment.id == id && payment.is_pending())
        else {
            return Ok(None);
        };

        payment.status = Payment_Status::Cancelled;
        payment.cancelled_at = Some(Utc::now());
        Ok(Some(payment.clone()))
    }
}

#[async_trait]
impl PlatformRepository for MemoryStore {
    async fn get(&self, id: i32) -> Result<Option<Platform>, Error> {
        Ok(self
            .platforms
            .lock()
            .unwrap()
            .iter()
            .find(|platform| platform.id == id)
            .cloned())
    }

    async fn insert(&self, data: &Platform_Request) -> Result<Platform, Error> {
        let mut platforms = self.platforms.lock().unwrap();
        let platform = Platform {
            id: platforms.len() as i32 + 1,
            name: data.name.to_owned(),
            active: true,
            address: data.address.to_owned(),
            webhook_url: data.webhook_url.to_owned(),
        };
        platforms.push(platform.clone());
        Ok(platform)
    }
}

#[async_trait]
impl StakingPeriodRepository for MemoryStore {
    async fn get(&self, id: i32) -> Result<Option<Staking_Period>, Error> {
        Ok(self
            .periods
            .lock()
            .unwrap()
            .iter()
            .find(|period| period.id == id)
            .cloned())
    }

    async fn get_all(&self) -> Result<Vec<Staking_Period>, Error> {
        Ok(self.periods.lock().unwrap().clone())
    }

    async fn insert(
        &self,
        data: &Staking_Period_Request,
    ) -> Result<Staking_Period, Error> {
        let mut periods = self.periods.lock().unwrap();
        let period = Staking_Period {
            id: periods.len() as i32 + 1,
            registration_begin: data.registration_begin,
            registration_end: data.registration_end,
            commitment_begin: data.commitment_begin,
            commitment_end: data.commitment_end,
            chip_ratio: data.chip_ratio,
        };
        periods.push(period.clone());
        Ok(period)
    }
}

#[async_trait]
impl StakingCommitmentRepository for MemoryStore {
    async fn get(&self, id: i32) -> Result<Option<Staking_Commitment>, Error> {
        Ok(self.commitment(id))
    }

    async fn get_by_period(
        &self,
        staking_period_id: i32,
    ) -> Result<Vec<Staking_Commitment>, Error> {
        let mut data: Vec<Staking_Commitment> = self
            .commitments
            .lock()
            .unwrap()
            .iter()
            .filter(|commitment| {
                commitment.staking_period_id == staking_period_id
            })
            .cloned()
            .collect();
        data.sort_by_key(|commitment| commitment.id);
        Ok(data)
    }

    async fn insert(
        &self,
        staking_period_id: i32,
        algorand_address: &str,
        pledges: &Pledges,
    ) -> Result<Staking_Commitment, Error> {
        let mut commitments = self.commitments.lock().unwrap();

        if commitments.iter().any(|commitment| {
            commitment.staking_period_id == staking_period_id
                && commitment.algorand_address == algorand_address
        }) {
            return Err(Error::Conflict(String::from("already registered")));
        }

        let commitment = Staking_Commitment {
            id: commitments.len() as i32 + 1,
            staking_period_id,
            algorand_address: algorand_address.to_owned(),
            created_at: Utc::now(),
            updated_at: None,
            pledges: *pledges,
            eligible: true,
        };
        commitments.push(commitment.clone());
        Ok(commitment)
    }

    async fn update_pledges(
        &self,
        id: i32,
        pledges: &Pledges,
    ) -> Result<Option<Staking_Commitment>, Error> {
        let mut commitments = self.commitments.lock().unwrap();
        let Some(commitment) =
            commitments.iter_mut().find(|commitment| commitment.id == id)
        else {
            return Ok(None);
        };

        commitment.pledges = *pledges;
        commitment.updated_at = Some(Utc::now());
        Ok(Some(commitment.clone()))
    }

    async fn update_eligibility(
        &self,
        id: i32,
        eligible: bool,
    ) -> Result<Option<Staking_Commitment>, Error> {
        if self.failing_commitments.lock().unwrap().contains(&id) {
            return Err(Error::TaskError(format!(
                "storage rejected commitment {}",
                id
            )));
        }

        let mut commitments = self.commitments.lock().unwrap();
        let Some(commitment) =
            commitments.iter_mut().find(|commitment| commitment.id == id)
        else {
            return Ok(None);
        };

        commitment.eligible = eligible;
        commitment.updated_at = Some(Utc::now());
        Ok(Some(commitment.clone()))
    }
}

#[async_trait]
impl StakingResultRepository for MemoryStore {
    async fn insert(
        &self,
        staking_period_id: i32,
        profit: u64,
        results: Vec<Staking_Result_Item>,
    ) -> Result<Staking_Result, Error> {
        let mut data = self.results.lock().unwrap();
        let result = Staking_Result {
            id: data.len() as i32 + 1,
            staking_period_id,
            profit,
            created_at: Utc::now(),
            results: Json(results),
        };
        data.push(result.clone());
        Ok(result)
    }

    async fn get_by_period(
        &self,
        staking_period_id: i32,
    ) -> Result<Vec<Staking_Result>, Error> {
        Ok(self
            .results
            .lock()
            .unwrap()
            .iter()
            .filter(|result| result.staking_period_id == staking_period_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct Fixture {
    pub ledger: FakeLedger,
    pub notifier: RecordingNotifier,
    pub webhook: RecordingWebhook,
    pub verifier: StaticVerifier,
    pub store: MemoryStore,
}

impl Fixture {
    pub fn new(ledger: FakeLedger) -> Self {
        Fixture {
            ledger,
            ..Default::default()
        }
    }

    pub fn services(&self) -> Services<'_> {
        Services {
            ledger: &self.ledger,
            notifier: &self.notifier,
            webhook: &self.webhook,
            verifier: &self.verifier,
            payments: &self.store,
            platforms: &self.store,
            periods: &self.store,
            commitments: &self.store,
            results: &self.store,
        }
    }
}
