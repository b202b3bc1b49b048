//! Jobs and services over the ledger and storage seams.

use crate::{
    dao::{
        PaymentRepository, PlatformRepository, StakingCommitmentRepository,
        StakingPeriodRepository, StakingResultRepository,
    },
    provider::{DepositWebhook, LedgerQuery, Notifier, SignatureVerifier},
};

pub mod eligibility_auditor;
pub mod faucet_snapshot;
pub mod leaderboard;
pub mod payment;
pub mod payment_reconciler;
pub mod reward_apportioner;
pub mod scheduler;
pub mod stake_profit_snapshot;
pub mod staking_check;
pub mod staking_commitment;
pub mod staking_period;

/// Every collaborator a job or service may touch, borrowed from `State` in
/// production and from in-memory fakes in tests.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub ledger: &'a dyn LedgerQuery,
    pub notifier: &'a dyn Notifier,
    pub webhook: &'a dyn DepositWebhook,
    pub verifier: &'a dyn SignatureVerifier,
    pub payments: &'a dyn PaymentRepository,
    pub platforms: &'a dyn PlatformRepository,
    pub periods: &'a dyn StakingPeriodRepository,
    pub commitments: &'a dyn StakingCommitmentRepository,
    pub results: &'a dyn StakingResultRepository,
}
