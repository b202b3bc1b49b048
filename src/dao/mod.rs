mod postgre;
mod repository;

pub use postgre::{get_path, PoolOption, PoolType, DUPLICATE_ERROR};
pub use repository::{
    PaymentRepository, PlatformRepository, StakingCommitmentRepository,
    StakingPeriodRepository, StakingResultRepository,
};
