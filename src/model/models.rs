use std::{fmt, io, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};

// =============================================================================
// Payments
// =============================================================================

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[repr(i16)]
#[serde(rename_all = "lowercase")]
pub enum Payment_Status {
    Created = 0,
    Cancelled = 1,
    Completed = 2,
}

impl fmt::Display for Payment_Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Payment_Status::Created => write!(f, "created"),
            Payment_Status::Cancelled => write!(f, "cancelled"),
            Payment_Status::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i32,
    pub platform_id: i32,
    pub status: Payment_Status,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub sender: String,
    #[sqlx(try_from = "i64")]
    pub asset_id: u64,
    #[sqlx(try_from = "i64")]
    pub amount: u64,
    pub transaction_id: Option<String>,
    pub external_id: i64,
}

impl Payment {
    pub fn is_pending(&self) -> bool {
        self.status == Payment_Status::Created
    }
}

/// Fields accepted when a platform opens a new deposit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment_Request {
    pub platform_id: i32,
    pub sender: String,
    pub asset_id: u64,
    pub amount: u64,
    pub external_id: i64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub id: i32,
    pub name: String,
    pub active: bool,
    pub address: String,
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform_Request {
    pub name: String,
    pub address: String,
    pub webhook_url: Option<String>,
}

// =============================================================================
// Staking
// =============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staking_Period {
    pub id: i32,
    pub registration_begin: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub commitment_begin: DateTime<Utc>,
    pub commitment_end: DateTime<Utc>,
    pub chip_ratio: f64,
}

impl Staking_Period {
    pub fn in_commitment(&self, now: DateTime<Utc>) -> bool {
        now >= self.commitment_begin && now < self.commitment_end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staking_Period_Request {
    pub registration_begin: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub commitment_begin: DateTime<Utc>,
    pub commitment_end: DateTime<Utc>,
    pub chip_ratio: f64,
}

/// The seven pledged quantities of a commitment, in base units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromRow, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct Pledges {
    #[sqlx(try_from = "i64")]
    pub chip: u64,
    #[sqlx(try_from = "i64")]
    pub liquidity: u64,
    #[sqlx(try_from = "i64")]
    pub liquidity_v2: u64,
    #[sqlx(try_from = "i64")]
    pub c_algo: u64,
    #[sqlx(try_from = "i64")]
    pub t_algo: u64,
    #[sqlx(try_from = "i64")]
    pub m_algo: u64,
    #[sqlx(try_from = "i64")]
    pub x_algo: u64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staking_Commitment {
    pub id: i32,
    pub staking_period_id: i32,
    pub algorand_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub pledges: Pledges,
    pub eligible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staking_Commitment_Request {
    pub staking_period_id: i32,
    pub algorand_address: String,
    #[serde(flatten)]
    pub pledges: Pledges,
}

impl fmt::Display for Pledges {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, tier) in Pledge_Tier::ALL.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", tier, tier.pledge(self))?;
        }
        Ok(())
    }
}

/// Pledge tiers in the order they are audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pledge_Tier {
    Chip,
    Liquidity,
    LiquidityV2,
    CAlgo,
    TAlgo,
    MAlgo,
    XAlgo,
}

impl Pledge_Tier {
    pub const ALL: [Pledge_Tier; 7] = [
        Pledge_Tier::Chip,
        Pledge_Tier::Liquidity,
        Pledge_Tier::LiquidityV2,
        Pledge_Tier::CAlgo,
        Pledge_Tier::TAlgo,
        Pledge_Tier::MAlgo,
        Pledge_Tier::XAlgo,
    ];

    pub fn pledge(&self, pledges: &Pledges) -> u64 {
        match self {
            Pledge_Tier::Chip => pledges.chip,
            Pledge_Tier::Liquidity => pledges.liquidity,
            Pledge_Tier::LiquidityV2 => pledges.liquidity_v2,
            Pledge_Tier::CAlgo => pledges.c_algo,
            Pledge_Tier::TAlgo => pledges.t_algo,
            Pledge_Tier::MAlgo => pledges.m_algo,
            Pledge_Tier::XAlgo => pledges.x_algo,
        }
    }
}

impl fmt::Display for Pledge_Tier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Pledge_Tier::Chip => write!(f, "chip"),
            Pledge_Tier::Liquidity => write!(f, "lp_v1"),
            Pledge_Tier::LiquidityV2 => write!(f, "lp_v2"),
            Pledge_Tier::CAlgo => write!(f, "c_algo"),
            Pledge_Tier::TAlgo => write!(f, "t_algo"),
            Pledge_Tier::MAlgo => write!(f, "m_algo"),
            Pledge_Tier::XAlgo => write!(f, "x_algo"),
        }
    }
}

impl FromStr for Pledge_Tier {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<Pledge_Tier, Self::Err> {
        match value {
            "chip" => Ok(Pledge_Tier::Chip),
            "lp_v1" => Ok(Pledge_Tier::Liquidity),
            "lp_v2" => Ok(Pledge_Tier::LiquidityV2),
            "c_algo" => Ok(Pledge_Tier::CAlgo),
            "t_algo" => Ok(Pledge_Tier::TAlgo),
            "m_algo" => Ok(Pledge_Tier::MAlgo),
            "x_algo" => Ok(Pledge_Tier::XAlgo),
            _ => Err(io::Error::new(
                io::ErrorKind::Other,
                "Pledge tier not supported",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staking_Result_Item {
    pub algorand_address: String,
    pub percent: f64,
    pub reward: u64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staking_Result {
    pub id: i32,
    pub staking_period_id: i32,
    #[sqlx(try_from = "i64")]
    pub profit: u64,
    pub created_at: DateTime<Utc>,
    pub results: Json<Vec<Staking_Result_Item>>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stake_Profit_Snapshot {
    pub id: i32,
    pub staking_period_id: i32,
    pub created_at: DateTime<Utc>,
    pub profit: f64,
}

// =============================================================================
// Snapshots
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot_Account {
    pub address: String,
    pub balance: u64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faucet_Snapshot {
    pub id: i32,
    #[sqlx(try_from = "i64")]
    pub asset_id: u64,
    pub created_at: DateTime<Utc>,
    pub accounts: Json<Vec<Snapshot_Account>>,
}

// =============================================================================
// Casino
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard_Entry {
    pub rank: u32,
    pub user_id: u64,
    pub name: String,
    pub bet_count: i64,
    pub bet_total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub last_updated_at: DateTime<Utc>,
    pub entries: Vec<Leaderboard_Entry>,
}

// =============================================================================
// Action history
// =============================================================================

#[derive(Debug, FromRow)]
pub struct Action_History {
    pub action_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::Type, Debug, Clone, Copy)]
pub enum Actions {
    PaymentCheckAction,
    StakingCheckAction,
    SnapshotAction,
}

impl fmt::Display for Actions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Actions::PaymentCheckAction => write!(f, "0"),
            Actions::StakingCheckAction => write!(f, "1"),
            Actions::SnapshotAction => write!(f, "2"),
        }
    }
}

impl From<Actions> for String {
    fn from(value: Actions) -> Self {
        value.to_string()
    }
}

impl FromStr for Actions {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<Actions, Self::Err> {
        match value {
            "0" => Ok(Actions::PaymentCheckAction),
            "1" => Ok(Actions::StakingCheckAction),
            "2" => Ok(Actions::SnapshotAction),
            _ => Err(io::Error::new(
                io::ErrorKind::Other,
                "Action Type not supported",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pledge_tier_accessors() {
        let pledges = Pledges {
            chip: 1,
            liquidity: 2,
            liquidity_v2: 3,
            c_algo: 4,
            t_algo: 5,
            m_algo: 6,
            x_algo: 7,
        };

        let values: Vec<u64> = Pledge_Tier::ALL
            .iter()
            .map(|tier| tier.pledge(&pledges))
            .collect();

        assert_eq!(values, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(
            pledges.to_string(),
            "chip 1, lp_v1 2, lp_v2 3, c_algo 4, t_algo 5, m_algo 6, x_algo 7"
        );
    }

    #[test]
    fn test_pledge_tier_names() {
        for tier in Pledge_Tier::ALL {
            let parsed = Pledge_Tier::from_str(&tier.to_string()).unwrap();
            assert_eq!(parsed, tier);
        }
        assert!(Pledge_Tier::from_str("gold").is_err());
    }

    #[test]
    fn test_commitment_json_flattens_pledges() {
        let json = serde_json::json!({
            "id": 3,
            "stakingPeriodId": 1,
            "algorandAddress": "ADDR",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": null,
            "chip": 100,
            "liquidity": 0,
            "liquidityV2": 0,
            "cAlgo": 5,
            "tAlgo": 0,
            "mAlgo": 0,
            "xAlgo": 0,
            "eligible": true
        });

        let commitment: Staking_Commitment =
            serde_json::from_value(json).unwrap();

        assert_eq!(commitment.pledges.chip, 100);
        assert_eq!(commitment.pledges.c_algo, 5);
        assert!(commitment.eligible);
    }
}
