pub use self::{
    path::get_path,
    types::{PoolOption, PoolType, DUPLICATE_ERROR},
};
mod action_history;
mod faucet_snapshot;
mod path;
mod payment;
mod platform;
mod stake_profit_snapshot;
mod staking_commitment;
mod staking_period;
mod staking_result;
mod types;
