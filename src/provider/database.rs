use sqlx::Executor;

use crate::{
    configuration::Config,
    dao::{PoolOption, PoolType},
    error::Error,
    model::{
        Action_History, Faucet_Snapshot, Payment, Platform,
        Stake_Profit_Snapshot, Staking_Commitment, Staking_Period,
        Staking_Result, Table,
    },
};

#[derive(Debug)]
pub struct DatabasePool {
    pub payment: Table<Payment>,
    pub platform: Table<Platform>,
    pub staking_period: Table<Staking_Period>,
    pub staking_commitment: Table<Staking_Commitment>,
    pub staking_result: Table<Staking_Result>,
    pub stake_profit_snapshot: Table<Stake_Profit_Snapshot>,
    pub faucet_snapshot: Table<Faucet_Snapshot>,
    pub action_history: Table<Action_History>,
    pub pool: PoolType,
}

impl DatabasePool {
    pub async fn new(config: &Config) -> Result<DatabasePool, Error> {
        let statement_timeout =
            format!("SET statement_timeout = '{}s'", config.statement_timeout);

        let pool = PoolOption::new()
            .after_connect(move |conn, _meta| {
                let statement_timeout = statement_timeout.clone();
                Box::pin(async move {
                    conn.execute(statement_timeout.as_str()).await?;
                    Ok(())
                })
            })
            .max_connections(20)
            .connect(config.database_url.as_str())
            .await?;

        Ok(DatabasePool {
            pool: pool.clone(),
            payment: Table::new(pool.clone()),
            platform: Table::new(pool.clone()),
            staking_period: Table::new(pool.clone()),
            staking_commitment: Table::new(pool.clone()),
            staking_result: Table::new(pool.clone()),
            stake_profit_snapshot: Table::new(pool.clone()),
            faucet_snapshot: Table::new(pool.clone()),
            action_history: Table::new(pool),
        })
    }
}
