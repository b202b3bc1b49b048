use async_trait::async_trait;

use crate::{
    dao::StakingPeriodRepository,
    error::Error,
    model::{Staking_Period, Staking_Period_Request, Table},
};

#[async_trait]
impl StakingPeriodRepository for Table<Staking_Period> {
    async fn get(&self, id: i32) -> Result<Option<Staking_Period>, Error> {
        const SQL: &str = r#"
        SELECT *
        FROM "staking_periods"
        WHERE "id" = $1
        "#;

        let data = sqlx::query_as(SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(data)
    }

    async fn get_all(&self) -> Result<Vec<Staking_Period>, Error> {
        const SQL: &str = r#"
        SELECT *
        FROM "staking_periods"
        ORDER BY "registration_begin" DESC
        "#;

        let data = sqlx::query_as(SQL).fetch_all(&self.pool).await?;

        Ok(data)
    }

    async fn insert(
        &self,
        data: &Staking_Period_Request,
    ) -> Result<Staking_Period, Error> {
        const SQL: &str = r#"
        INSERT INTO "staking_periods" (
            "registration_begin",
            "registration_end",
            "commitment_begin",
            "commitment_end",
            "chip_ratio"
        )
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#;

        let period = sqlx::query_as(SQL)
            .bind(data.registration_begin)
            .bind(data.registration_end)
            .bind(data.commitment_begin)
            .bind(data.commitment_end)
            .bind(data.chip_ratio)
            .fetch_one(&self.pool)
            .await?;

        Ok(period)
    }
}
