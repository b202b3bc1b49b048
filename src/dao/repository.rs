//! Storage seams consumed by the jobs and services.
//!
//! Each trait is implemented for the matching `Table<T>` in `dao::postgre`;
//! tests substitute in-memory stores.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::Error,
    model::{
        Payment, Payment_Request, Platform, Platform_Request, Pledges,
        Staking_Commitment, Staking_Period, Staking_Period_Request,
        Staking_Result, Staking_Result_Item,
    },
};

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn get(&self, id: i32) -> Result<Option<Payment>, Error>;

    /// Created payments of a platform with `created_at` in `[from, to]`,
    /// oldest first.
    async fn get_pending(
        &self,
        platform_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Payment>, Error>;

    /// Payments already settled by any of `transaction_ids`.
    async fn get_by_transaction_ids(
        &self,
        transaction_ids: &[String],
    ) -> Result<Vec<Payment>, Error>;

    async fn insert(&self, data: &Payment_Request) -> Result<Payment, Error>;

    /// Moves a Created payment to Completed. `None` when the row is absent
    /// or no longer Created; `Conflict` when the transaction already
    /// settled another payment.
    async fn complete_pending(
        &self,
        id: i32,
        transaction_id: &str,
    ) -> Result<Option<Payment>, Error>;

    /// Moves a Created payment to Cancelled. `None` when the row is absent
    /// or no longer Created.
    async fn cancel_pending(&self, id: i32) -> Result<Option<Payment>, Error>;
}

#[async_trait]
pub trait PlatformRepository: Send + Sync {
    async fn get(&self, id: i32) -> Result<Option<Platform>, Error>;

    async fn insert(&self, data: &Platform_Request) -> Result<Platform, Error>;
}

#[async_trait]
pub trait StakingPeriodRepository: Send + Sync {
    async fn get(&self, id: i32) -> Result<Option<Staking_Period>, Error>;

    async fn get_all(&self) -> Result<Vec<Staking_Period>, Error>;

    async fn insert(
        &self,
        data: &Staking_Period_Request,
    ) -> Result<Staking_Period, Error>;
}

#[async_trait]
pub trait StakingCommitmentRepository: Send + Sync {
    async fn get(&self, id: i32) -> Result<Option<Staking_Commitment>, Error>;

    /// All commitments of a period ordered by id.
    async fn get_by_period(
        &self,
        staking_period_id: i32,
    ) -> Result<Vec<Staking_Commitment>, Error>;

    /// Fails with `Conflict` when the address already pledged in the period.
    async fn insert(
        &self,
        staking_period_id: i32,
        algorand_address: &str,
        pledges: &Pledges,
    ) -> Result<Staking_Commitment, Error>;

    async fn update_pledges(
        &self,
        id: i32,
        pledges: &Pledges,
    ) -> Result<Option<Staking_Commitment>, Error>;

    async fn update_eligibility(
        &self,
        id: i32,
        eligible: bool,
    ) -> Result<Option<Staking_Commitment>, Error>;
}

#[async_trait]
pub trait StakingResultRepository: Send + Sync {
    async fn insert(
        &self,
        staking_period_id: i32,
        profit: u64,
        results: Vec<Staking_Result_Item>,
    ) -> Result<Staking_Result, Error>;

    async fn get_by_period(
        &self,
        staking_period_id: i32,
    ) -> Result<Vec<Staking_Result>, Error>;
}
