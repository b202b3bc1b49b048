use chrono::Utc;
use sqlx::Error;

use crate::model::{Stake_Profit_Snapshot, Table};

impl Table<Stake_Profit_Snapshot> {
    pub async fn insert(
        &self,
        staking_period_id: i32,
        profit: f64,
    ) -> Result<Stake_Profit_Snapshot, Error> {
        const SQL: &str = r#"
        INSERT INTO "stake_profit_snapshots" (
            "staking_period_id",
            "created_at",
            "profit"
        )
        VALUES ($1, $2, $3)
        RETURNING *
        "#;

        sqlx::query_as(SQL)
            .bind(staking_period_id)
            .bind(Utc::now())
            .bind(profit)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn get_last_by_period(
        &self,
        staking_period_id: i32,
    ) -> Result<Option<Stake_Profit_Snapshot>, Error> {
        const SQL: &str = r#"
        SELECT *
        FROM "stake_profit_snapshots"
        WHERE "staking_period_id" = $1
        ORDER BY "created_at" DESC
        LIMIT 1
        "#;

        sqlx::query_as(SQL)
            .bind(staking_period_id)
            .fetch_optional(&self.pool)
            .await
    }
}
