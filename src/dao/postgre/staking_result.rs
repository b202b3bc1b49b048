use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;

use crate::{
    dao::StakingResultRepository,
    error::Error,
    model::{Staking_Result, Staking_Result_Item, Table},
};

#[async_trait]
impl StakingResultRepository for Table<Staking_Result> {
    async fn insert(
        &self,
        staking_period_id: i32,
        profit: u64,
        results: Vec<Staking_Result_Item>,
    ) -> Result<Staking_Result, Error> {
        const SQL: &str = r#"
        INSERT INTO "staking_results" (
            "staking_period_id",
            "profit",
            "created_at",
            "results"
        )
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#;

        let data = sqlx::query_as(SQL)
            .bind(staking_period_id)
            .bind(i64::try_from(profit)?)
            .bind(Utc::now())
            .bind(Json(results))
            .fetch_one(&self.pool)
            .await?;

        Ok(data)
    }

    async fn get_by_period(
        &self,
        staking_period_id: i32,
    ) -> Result<Vec<Staking_Result>, Error> {
        const SQL: &str = r#"
        SELECT *
        FROM "staking_results"
        WHERE "staking_period_id" = $1
        ORDER BY "created_at" DESC
        "#;

        let data = sqlx::query_as(SQL)
            .bind(staking_period_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(data)
    }
}
